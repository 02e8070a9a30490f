// ============================================
// Horizon - Бесконечный terrain с подгрузкой чанков
// ============================================
// Детерминированная карта высот (seed + simplex fBm), чанки вокруг
// зрителя, отсечение по frustum. GPU ресурсы за узким интерфейсом
// MeshAllocator, поэтому ядро работает и без графики.

pub mod terrain;
pub mod render;
pub mod core;

pub use crate::core::{ConfigError, CullStats, EngineConfig, SurfaceProbe, TerrainEngine};
pub use crate::render::Frustum;
pub use crate::terrain::{ChunkKey, HeightField, HostAllocator, MeshAllocator, NoiseParams, WgpuAllocator};
