// ============================================
// Chunk Builder - Генерация геометрии чанка
// ============================================
// (N+1)x(N+1) сэмплов высоты -> позиции, нормали, UV, индексы, AABB.
// Мировая координата считается от глобального индекса сетки, поэтому
// соседние чанки сэмплируют общий край в побитово одинаковых точках.

use serde::{Deserialize, Serialize};
use ultraviolet::Vec3;

use crate::core::config::ConfigError;
use crate::terrain::cache::ChunkKey;
use crate::terrain::generation::HeightField;
use super::chunk_mesh::{Aabb, ChunkMesh};

pub const MAX_QUADS_PER_SIDE: u32 = 1024;

/// Размеры сетки чанка
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkLayout {
    /// N квадов по стороне
    pub quads_per_side: u32,
    /// Физический размер одного квада
    pub quad_size: f64,
    /// UV = world / uv_scale
    pub uv_scale: f64,
    /// Шаг конечной разности для нормалей
    pub normal_epsilon: f64,
}

impl Default for ChunkLayout {
    fn default() -> Self {
        Self {
            quads_per_side: 20,
            quad_size: 0.3,
            uv_scale: 4.0,
            normal_epsilon: 0.01,
        }
    }
}

impl ChunkLayout {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quads_per_side == 0 || self.quads_per_side > MAX_QUADS_PER_SIDE {
            return Err(ConfigError::InvalidChunkSize(self.quads_per_side));
        }
        if !self.quad_size.is_finite() || self.quad_size <= 0.0 {
            return Err(ConfigError::InvalidQuadSize(self.quad_size));
        }
        if !self.uv_scale.is_finite() || self.uv_scale <= 0.0 {
            return Err(ConfigError::InvalidUvScale(self.uv_scale));
        }
        if !self.normal_epsilon.is_finite() || self.normal_epsilon <= 0.0 {
            return Err(ConfigError::InvalidNormalEpsilon(self.normal_epsilon));
        }
        Ok(())
    }

    #[inline]
    pub fn chunk_world_size(&self) -> f64 {
        self.quads_per_side as f64 * self.quad_size
    }

    #[inline]
    pub fn vertices_per_side(&self) -> u32 {
        self.quads_per_side + 1
    }

    pub fn vertex_count(&self) -> usize {
        let side = self.vertices_per_side() as usize;
        side * side
    }

    pub fn index_count(&self) -> usize {
        let n = self.quads_per_side as usize;
        n * n * 6
    }

    /// Мировая координата глобального узла сетки
    #[inline]
    fn grid_coord(&self, chunk: i32, local: u32) -> f64 {
        (chunk as i64 * self.quads_per_side as i64 + local as i64) as f64 * self.quad_size
    }
}

/// Готовая геометрия чанка (ещё без GPU буферов)
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkGeometry {
    pub key: ChunkKey,
    pub mesh: ChunkMesh,
    pub bounds: Aabb,
}

/// Строит чанк: чистая функция ключа, поля высот и раскладки
pub fn build_chunk(key: ChunkKey, field: &HeightField, layout: &ChunkLayout) -> ChunkGeometry {
    let side = layout.vertices_per_side();
    let mut positions = Vec::with_capacity(layout.vertex_count());
    let mut normals = Vec::with_capacity(layout.vertex_count());
    let mut tex_coords = Vec::with_capacity(layout.vertex_count());
    let mut bounds = Aabb::empty();

    for row in 0..side {
        let world_z = layout.grid_coord(key.z, row);
        for col in 0..side {
            let world_x = layout.grid_coord(key.x, col);
            let height = field.height(world_x, world_z);
            let normal = field.normal(world_x, world_z, height, layout.normal_epsilon);

            let position = [world_x as f32, height as f32, world_z as f32];
            bounds.include(Vec3::new(position[0], position[1], position[2]));
            positions.push(position);
            normals.push([normal[0] as f32, normal[1] as f32, normal[2] as f32]);
            tex_coords.push([
                (world_x / layout.uv_scale) as f32,
                (world_z / layout.uv_scale) as f32,
            ]);
        }
    }

    let indices = grid_indices(layout.quads_per_side);

    // Длины согласованы по построению
    let mesh = ChunkMesh::from_parts_unchecked(positions, normals, tex_coords, indices);

    ChunkGeometry { key, mesh, bounds }
}

/// Два треугольника на квад, шаг строки N+1
pub fn grid_indices(quads_per_side: u32) -> Vec<u32> {
    let stride = quads_per_side + 1;
    let mut indices = Vec::with_capacity((quads_per_side * quads_per_side * 6) as usize);
    for row in 0..quads_per_side {
        for col in 0..quads_per_side {
            let i1 = col + row * stride;
            let i2 = (col + 1) + row * stride;
            let i3 = col + (row + 1) * stride;
            let i4 = (col + 1) + (row + 1) * stride;
            indices.extend_from_slice(&[i1, i3, i2, i2, i3, i4]);
        }
    }
    indices
}
