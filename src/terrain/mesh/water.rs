// ============================================
// Water Plane - Плоская сетка воды
// ============================================

use serde::{Deserialize, Serialize};

use crate::core::config::ConfigError;
use super::builder::grid_indices;
use super::chunk_mesh::ChunkMesh;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    /// Высота уровня воды
    pub level: f64,
    /// Сторона квадрата воды с центром в начале координат
    pub plane_size: f64,
    pub segments: u32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            level: -0.6,
            plane_size: 200.0,
            segments: 20,
        }
    }
}

impl WaterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.level.is_finite() {
            return Err(ConfigError::NonFinite("water.level"));
        }
        if !self.plane_size.is_finite() || self.plane_size <= 0.0 {
            return Err(ConfigError::InvalidWaterPlane(self.plane_size));
        }
        if self.segments == 0 || self.segments > super::builder::MAX_QUADS_PER_SIDE {
            return Err(ConfigError::InvalidWaterSegments(self.segments));
        }
        Ok(())
    }
}

/// Сетка segments x segments, все нормали вверх, UV 0..1 по плоскости
pub fn build_water_plane(config: &WaterConfig) -> ChunkMesh {
    let segments = config.segments;
    let step = config.plane_size / segments as f64;
    let half = config.plane_size / 2.0;
    let side = (segments + 1) as usize;

    let mut positions = Vec::with_capacity(side * side);
    let mut tex_coords = Vec::with_capacity(side * side);
    for z in 0..=segments {
        for x in 0..=segments {
            let px = x as f64 * step - half;
            let pz = z as f64 * step - half;
            positions.push([px as f32, config.level as f32, pz as f32]);
            tex_coords.push([
                x as f32 / segments as f32,
                z as f32 / segments as f32,
            ]);
        }
    }
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];

    ChunkMesh::from_parts_unchecked(positions, normals, tex_coords, grid_indices(segments))
}
