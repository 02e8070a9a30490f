// ============================================
// Height Map - Фрактальная карта высот (fBm)
// ============================================

use serde::{Deserialize, Serialize};

use crate::core::config::ConfigError;
use super::noise::SimplexNoise;

pub const MAX_OCTAVES: u32 = 16;

/// Параметры шума; любое изменение требует полной перезагрузки чанков
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Частота октавы 0
    pub scale: f64,
    pub octaves: u32,
    pub amplitude: f64,
    /// Затухание амплитуды на каждую октаву
    pub persistence: f64,
    /// 0..1, показатель степенной кривой
    pub flatness: f64,
    pub offset: f64,
    /// Постоянный подъём после кривой
    pub base_lift: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 0.05,
            octaves: 4,
            amplitude: 1.8,
            persistence: 0.45,
            flatness: 0.6,
            offset: 0.0,
            base_lift: 0.2,
        }
    }
}

impl NoiseParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::InvalidScale(self.scale));
        }
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return Err(ConfigError::InvalidOctaves(self.octaves));
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(ConfigError::InvalidAmplitude(self.amplitude));
        }
        if !self.persistence.is_finite() || self.persistence < 0.0 {
            return Err(ConfigError::InvalidPersistence(self.persistence));
        }
        if !(0.0..=1.0).contains(&self.flatness) {
            return Err(ConfigError::InvalidFlatness(self.flatness));
        }
        if !self.offset.is_finite() {
            return Err(ConfigError::NonFinite("noise.offset"));
        }
        if !self.base_lift.is_finite() {
            return Err(ConfigError::NonFinite("noise.base_lift"));
        }
        Ok(())
    }

    /// Суммарный вертикальный сдвиг, добавляемый после кривой
    #[inline]
    pub fn vertical_shift(&self) -> f64 {
        self.base_lift + self.offset
    }
}

/// Знакосохраняющая степенная кривая; flatness = 0 оставляет высоту как есть
#[inline]
pub fn apply_flatness(height: f64, flatness: f64) -> f64 {
    if flatness <= 0.0 {
        return height;
    }
    let exponent = 1.0 / (1.0 + 2.0 * flatness);
    height.signum() * height.abs().powf(exponent)
}

/// Функция высоты H(x, z): seed + параметры, без побочных эффектов
#[derive(Clone)]
pub struct HeightField {
    seed: f64,
    params: NoiseParams,
    noise: SimplexNoise,
}

impl HeightField {
    pub fn new(seed: f64, params: NoiseParams) -> Self {
        Self {
            seed,
            params,
            noise: SimplexNoise::new(seed),
        }
    }

    pub fn seed(&self) -> f64 {
        self.seed
    }

    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Сумма октав без кривой и сдвига
    pub fn fbm(&self, x: f64, z: f64) -> f64 {
        let mut height = 0.0;
        let mut amplitude = self.params.amplitude;
        let mut frequency = self.params.scale;

        for _ in 0..self.params.octaves {
            height += self.noise.sample(x * frequency, z * frequency) * amplitude;
            amplitude *= self.params.persistence;
            frequency *= 2.0;
        }
        height
    }

    #[inline]
    pub fn height(&self, x: f64, z: f64) -> f64 {
        apply_flatness(self.fbm(x, z), self.params.flatness) + self.params.vertical_shift()
    }

    /// Нормаль прямой разностью: normalize(-dh/dx, 1, -dh/dz)
    pub fn normal(&self, x: f64, z: f64, height: f64, epsilon: f64) -> [f64; 3] {
        let dhdx = (self.height(x + epsilon, z) - height) / epsilon;
        let dhdz = (self.height(x, z + epsilon) - height) / epsilon;
        let (nx, ny, nz) = (-dhdx, 1.0, -dhdz);
        let len = (nx * nx + ny * ny + nz * nz).sqrt();
        [nx / len, ny / len, nz / len]
    }
}
