// ============================================
// Core Module - Конфигурация и движок
// ============================================

pub mod config;
pub mod engine;

pub use config::{ConfigError, EngineConfig, DEFAULT_RENDER_DISTANCE, MAX_RENDER_DISTANCE};
pub use engine::{CullStats, SurfaceProbe, TerrainEngine, MAX_RANDOM_SEED};
