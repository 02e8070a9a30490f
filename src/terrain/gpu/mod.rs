pub mod allocator;
pub mod chunk;
pub mod device;

pub use allocator::{AllocError, HostAllocator, HostMesh, MeshAllocator};
pub use chunk::{GpuMesh, WgpuAllocator};
pub use device::init_headless;
