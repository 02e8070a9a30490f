pub mod chunk_mesh;
pub mod builder;
pub mod water;

pub use chunk_mesh::{Aabb, ChunkMesh, MeshError};
pub use builder::{build_chunk, grid_indices, ChunkGeometry, ChunkLayout, MAX_QUADS_PER_SIDE};
pub use water::{build_water_plane, WaterConfig};
