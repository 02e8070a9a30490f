// ============================================
// Terrain Module - Бесконечный heightmap terrain
// ============================================

pub mod generation;
pub mod mesh;
pub mod cache;
pub mod gpu;
pub mod manager;

// Re-exports
pub use cache::ChunkKey;
pub use generation::{HeightField, NoiseParams, SimplexNoise, SurfaceBlend, SurfaceWeights};
pub use mesh::{build_chunk, Aabb, ChunkGeometry, ChunkLayout, ChunkMesh, WaterConfig};
pub use gpu::{AllocError, GpuMesh, HostAllocator, MeshAllocator, WgpuAllocator};
pub use manager::{Chunk, ChunkManager, LoadShape, UpdateStats};
