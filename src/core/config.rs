// ============================================
// Config - Параметры движка и их проверка
// ============================================
// Один JSON файл; отсутствующие поля берут значения по умолчанию.
// Ошибочные значения отклоняются целиком, ничего не обрезается.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::terrain::generation::{NoiseParams, SurfaceBlend};
use crate::terrain::manager::LoadShape;
use crate::terrain::mesh::{ChunkLayout, WaterConfig};

/// Радиус по умолчанию (в чанках)
pub const DEFAULT_RENDER_DISTANCE: i32 = 20;
/// Больше - (2R+1)^2 чанков уже не помещаются ни в какой бюджет
pub const MAX_RENDER_DISTANCE: i32 = 256;

/// Ошибки конфигурации
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    InvalidChunkSize(u32),
    InvalidQuadSize(f64),
    InvalidUvScale(f64),
    InvalidNormalEpsilon(f64),
    InvalidRenderDistance(i32),
    InvalidOctaves(u32),
    InvalidScale(f64),
    InvalidAmplitude(f64),
    InvalidPersistence(f64),
    InvalidFlatness(f64),
    InvalidWaterPlane(f64),
    InvalidWaterSegments(u32),
    /// NaN или бесконечность в поле
    NonFinite(&'static str),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config io error: {}", e),
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::InvalidChunkSize(n) => write!(f, "chunk size must be 1..=1024 quads, got {}", n),
            ConfigError::InvalidQuadSize(v) => write!(f, "quad size must be positive, got {}", v),
            ConfigError::InvalidUvScale(v) => write!(f, "uv scale must be positive, got {}", v),
            ConfigError::InvalidNormalEpsilon(v) => write!(f, "normal epsilon must be positive, got {}", v),
            ConfigError::InvalidRenderDistance(r) => {
                write!(f, "render distance must be 0..={}, got {}", MAX_RENDER_DISTANCE, r)
            }
            ConfigError::InvalidOctaves(n) => write!(f, "octaves must be 1..=16, got {}", n),
            ConfigError::InvalidScale(v) => write!(f, "noise scale must be positive, got {}", v),
            ConfigError::InvalidAmplitude(v) => write!(f, "amplitude must be non-negative, got {}", v),
            ConfigError::InvalidPersistence(v) => write!(f, "persistence must be non-negative, got {}", v),
            ConfigError::InvalidFlatness(v) => write!(f, "flatness must be in [0, 1], got {}", v),
            ConfigError::InvalidWaterPlane(v) => write!(f, "water plane size must be positive, got {}", v),
            ConfigError::InvalidWaterSegments(n) => write!(f, "water segments must be 1..=1024, got {}", n),
            ConfigError::NonFinite(field) => write!(f, "{} must be finite", field),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Полная конфигурация движка
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: f64,
    pub noise: NoiseParams,
    pub chunk: ChunkLayout,
    pub render_distance: i32,
    pub load_shape: LoadShape,
    /// Собирать недостающие чанки через rayon
    pub parallel_build: bool,
    pub water: WaterConfig,
    pub blend: SurfaceBlend,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0.0,
            noise: NoiseParams::default(),
            chunk: ChunkLayout::default(),
            render_distance: DEFAULT_RENDER_DISTANCE,
            load_shape: LoadShape::Square,
            parallel_build: false,
            water: WaterConfig::default(),
            blend: SurfaceBlend::default(),
        }
    }
}

pub fn validate_seed(seed: f64) -> Result<(), ConfigError> {
    if seed.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite("seed"))
    }
}

pub fn validate_render_distance(render_distance: i32) -> Result<(), ConfigError> {
    if (0..=MAX_RENDER_DISTANCE).contains(&render_distance) {
        Ok(())
    } else {
        Err(ConfigError::InvalidRenderDistance(render_distance))
    }
}

impl EngineConfig {
    /// Загрузить из JSON строки
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Загрузить из файла
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded engine config from {:?}", path.as_ref());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_seed(self.seed)?;
        self.noise.validate()?;
        self.chunk.validate()?;
        validate_render_distance(self.render_distance)?;
        self.water.validate()?;
        Ok(())
    }
}
