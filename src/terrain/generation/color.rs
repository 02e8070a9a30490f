// ============================================
// Surface Blend - Веса материалов поверхности
// ============================================
// Пороги смешивания трава/камень/снег. Это настраиваемые значения
// по умолчанию, а не выведенные константы.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceBlend {
    pub grass_rock_height: f32,
    pub grass_rock_sharpness: f32,
    pub rock_snow_height: f32,
    pub rock_snow_sharpness: f32,
    /// Уклон (1 - normal.y), с которого начинает проступать камень
    pub slope_rock_threshold: f32,
    pub slope_rock_sharpness: f32,
}

impl Default for SurfaceBlend {
    fn default() -> Self {
        Self {
            grass_rock_height: 0.5,
            grass_rock_sharpness: 0.5,
            rock_snow_height: 1.7,
            rock_snow_sharpness: 0.6,
            slope_rock_threshold: 0.4,
            slope_rock_sharpness: 0.3,
        }
    }
}

/// Доли материалов, в сумме 1.0
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceWeights {
    pub grass: f32,
    pub rock: f32,
    pub snow: f32,
}

#[inline(always)]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

impl SurfaceBlend {
    pub fn weights(&self, height: f32, normal_y: f32) -> SurfaceWeights {
        let slope = 1.0 - normal_y.max(0.0);

        let rock_by_height = smoothstep(
            self.grass_rock_height - self.grass_rock_sharpness,
            self.grass_rock_height + self.grass_rock_sharpness,
            height,
        );
        let mut grass = 1.0 - rock_by_height;
        let mut rock = rock_by_height;

        // Камень на склонах только там, где высота его ещё не дала
        let rock_by_slope = smoothstep(
            self.slope_rock_threshold - self.slope_rock_sharpness,
            self.slope_rock_threshold + self.slope_rock_sharpness,
            slope,
        ) * (1.0 - rock_by_height);
        grass *= 1.0 - rock_by_slope;
        rock = rock * (1.0 - rock_by_slope) + rock_by_slope;

        let snow = smoothstep(
            self.rock_snow_height - self.rock_snow_sharpness,
            self.rock_snow_height + self.rock_snow_sharpness,
            height,
        );

        SurfaceWeights {
            grass: grass * (1.0 - snow),
            rock: rock * (1.0 - snow),
            snow,
        }
    }
}
