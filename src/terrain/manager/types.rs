use serde::{Deserialize, Serialize};

use crate::terrain::cache::ChunkKey;
use crate::terrain::mesh::{Aabb, ChunkMesh};

/// Форма окрестности загрузки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadShape {
    /// Квадрат (2R+1)x(2R+1)
    #[default]
    Square,
    /// dx^2 + dz^2 <= R^2
    Circle,
}

impl LoadShape {
    /// Входит ли key в окрестность радиуса radius вокруг center
    #[inline]
    pub fn contains(self, center: ChunkKey, key: ChunkKey, radius: i32) -> bool {
        let radius = radius as i64;
        match self {
            LoadShape::Square => key.distance(center) <= radius,
            LoadShape::Circle => key.distance_sq(center) <= radius * radius,
        }
    }
}

/// Резидентный чанк: меш, AABB и GPU буферы
pub struct Chunk<H> {
    key: ChunkKey,
    mesh: ChunkMesh,
    bounds: Aabb,
    buffers: H,
}

impl<H> Chunk<H> {
    pub(super) fn new(key: ChunkKey, mesh: ChunkMesh, bounds: Aabb, buffers: H) -> Self {
        Self { key, mesh, bounds, buffers }
    }

    pub(super) fn into_buffers(self) -> H {
        self.buffers
    }

    pub fn key(&self) -> ChunkKey {
        self.key
    }

    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn buffers(&self) -> &H {
        &self.buffers
    }

    pub fn index_count(&self) -> u32 {
        self.mesh.index_count() as u32
    }
}

/// Итог одного update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateStats {
    pub loaded: usize,
    pub evicted: usize,
    /// Чанки, для которых не удалось создать буферы; повтор на следующем update
    pub failed: usize,
    pub resident: usize,
}

impl UpdateStats {
    pub fn changed(&self) -> bool {
        self.loaded > 0 || self.evicted > 0
    }
}
