// ============================================
// Chunk Manager - Загрузка/выгрузка чанков вокруг зрителя
// ============================================
// Каждый кадр: нужный набор ключей -> выгрузка лишних -> сборка и
// загрузка недостающих. Всё синхронно, в потоке рендера.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use ultraviolet::Vec3;

use crate::terrain::cache::ChunkKey;
use crate::terrain::generation::HeightField;
use crate::terrain::gpu::MeshAllocator;
use crate::terrain::mesh::{build_chunk, ChunkGeometry, ChunkLayout};
use super::types::{Chunk, LoadShape, UpdateStats};

/// Владеет резидентными чанками и их GPU буферами
pub struct ChunkManager<A: MeshAllocator> {
    chunks: HashMap<ChunkKey, Chunk<A::Handle>>,
    allocator: A,
    layout: ChunkLayout,
    render_distance: i32,
    shape: LoadShape,
    parallel: bool,
    center: Option<ChunkKey>,
}

impl<A: MeshAllocator> ChunkManager<A> {
    pub fn new(allocator: A, layout: ChunkLayout, render_distance: i32, shape: LoadShape) -> Self {
        let side = (2 * render_distance.max(0) + 1) as usize;
        Self {
            chunks: HashMap::with_capacity(side * side),
            allocator,
            layout,
            render_distance,
            shape,
            parallel: false,
            center: None,
        }
    }

    /// Собирать недостающие чанки через rayon внутри того же update
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    pub fn shape(&self) -> LoadShape {
        self.shape
    }

    /// Чанк зрителя на последнем update
    pub fn center(&self) -> Option<ChunkKey> {
        self.center
    }

    /// Новая раскладка меняет геометрию, поэтому выгружаем всё
    pub fn set_layout(&mut self, layout: ChunkLayout) {
        self.clear();
        self.layout = layout;
    }

    /// Геометрия не меняется; лишние чанки уйдут на следующем update
    pub fn set_render_distance(&mut self, render_distance: i32) {
        self.render_distance = render_distance;
    }

    pub fn set_shape(&mut self, shape: LoadShape) {
        self.shape = shape;
    }

    pub fn viewer_chunk(&self, viewer: Vec3) -> ChunkKey {
        ChunkKey::from_world(viewer.x as f64, viewer.z as f64, self.layout.chunk_world_size())
    }

    /// Нужные ключи вокруг центра, порядок: dx, затем dz.
    /// Ключи за пределами диапазона i32 пропускаются.
    pub fn required_keys(&self, center: ChunkKey) -> Vec<ChunkKey> {
        let r = self.render_distance.max(0);
        let side = (2 * r + 1) as usize;
        let mut keys = Vec::with_capacity(side * side);
        for dx in -r..=r {
            for dz in -r..=r {
                if let Some(key) = center.checked_offset(dx, dz) {
                    if self.shape.contains(center, key, r) {
                        keys.push(key);
                    }
                }
            }
        }
        keys
    }

    /// Вызывается раз в кадр до отрисовки
    pub fn update(&mut self, viewer: Vec3, field: &HeightField) -> UpdateStats {
        let center = self.viewer_chunk(viewer);
        self.center = Some(center);

        let required = self.required_keys(center);
        let required_set: HashSet<ChunkKey> = required.iter().copied().collect();

        let mut stats = UpdateStats::default();

        // Выгрузка первой: меньше пиковых выделений
        let stale: Vec<ChunkKey> = self
            .chunks
            .keys()
            .filter(|key| !required_set.contains(*key))
            .copied()
            .collect();
        for key in stale {
            if self.evict(key) {
                stats.evicted += 1;
            }
        }

        let missing: Vec<ChunkKey> = required
            .into_iter()
            .filter(|key| !self.chunks.contains_key(key))
            .collect();

        for geometry in self.build_all(&missing, field) {
            let ChunkGeometry { key, mesh, bounds } = geometry;
            match self.allocator.allocate(key, &mesh) {
                Ok(buffers) => {
                    self.chunks.insert(key, Chunk::new(key, mesh, bounds, buffers));
                    stats.loaded += 1;
                }
                Err(e) => {
                    log::warn!("chunk {:?} skipped, buffer creation failed: {}", key, e);
                    stats.failed += 1;
                }
            }
        }

        stats.resident = self.chunks.len();
        if stats.changed() || stats.failed > 0 {
            log::debug!(
                "chunks around {:?}: +{} -{} failed {} resident {}",
                center, stats.loaded, stats.evicted, stats.failed, stats.resident
            );
        }
        stats
    }

    fn build_all(&self, keys: &[ChunkKey], field: &HeightField) -> Vec<ChunkGeometry> {
        let layout = self.layout;
        if self.parallel {
            keys.par_iter()
                .map(|&key| build_chunk(key, field, &layout))
                .collect()
        } else {
            keys.iter()
                .map(|&key| build_chunk(key, field, &layout))
                .collect()
        }
    }

    fn evict(&mut self, key: ChunkKey) -> bool {
        match self.chunks.remove(&key) {
            Some(chunk) => {
                self.allocator.release(chunk.into_buffers());
                true
            }
            None => false,
        }
    }

    /// Выгрузить всё (регенерация); возвращает число выгруженных чанков
    pub fn clear(&mut self) -> usize {
        let keys: Vec<ChunkKey> = self.chunks.keys().copied().collect();
        let count = keys.len();
        for key in keys {
            self.evict(key);
        }
        self.center = None;
        count
    }

    pub fn get(&self, key: ChunkKey) -> Option<&Chunk<A::Handle>> {
        self.chunks.get(&key)
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.chunks.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk<A::Handle>> {
        self.chunks.values()
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    pub fn allocator_mut(&mut self) -> &mut A {
        &mut self.allocator
    }
}

impl<A: MeshAllocator> Drop for ChunkManager<A> {
    fn drop(&mut self) {
        self.clear();
    }
}
