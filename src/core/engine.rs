// ============================================
// Terrain Engine - Владелец seed, параметров и резидентных чанков
// ============================================
// Никаких глобальных переменных: несколько движков могут жить рядом.
// Смена шума или seed выгружает все чанки; следующий update загружает
// их заново уже с новой функцией высоты.

use rand::Rng;
use ultraviolet::Vec3;

use crate::core::config::{validate_render_distance, validate_seed, ConfigError, EngineConfig};
use crate::render::Frustum;
use crate::terrain::cache::ChunkKey;
use crate::terrain::generation::{HeightField, NoiseParams, SurfaceWeights};
use crate::terrain::gpu::MeshAllocator;
use crate::terrain::manager::{Chunk, ChunkManager, LoadShape, UpdateStats};
use crate::terrain::mesh::{build_water_plane, ChunkLayout, ChunkMesh};

/// Верхняя граница случайного seed при регенерации
pub const MAX_RANDOM_SEED: f64 = 10000.0;

/// Высота, нормаль и материалы в точке
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceProbe {
    pub height: f64,
    pub normal: [f64; 3],
    pub weights: SurfaceWeights,
}

/// Итог отсечения за кадр
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CullStats {
    pub visible: usize,
    pub culled: usize,
}

pub struct TerrainEngine<A: MeshAllocator> {
    config: EngineConfig,
    field: HeightField,
    manager: ChunkManager<A>,
    generation: u64,
}

impl<A: MeshAllocator> TerrainEngine<A> {
    pub fn new(config: EngineConfig, allocator: A) -> Result<Self, ConfigError> {
        config.validate()?;

        let field = HeightField::new(config.seed, config.noise);
        let mut manager = ChunkManager::new(
            allocator,
            config.chunk,
            config.render_distance,
            config.load_shape,
        );
        manager.set_parallel(config.parallel_build);

        log::info!(
            "Terrain engine: seed {}, {} quads x {} per chunk, render distance {} ({:?})",
            config.seed,
            config.chunk.quads_per_side,
            config.chunk.quad_size,
            config.render_distance,
            config.load_shape
        );

        Ok(Self { config, field, manager, generation: 0 })
    }

    // ---------- Height queries ----------

    /// Высота рельефа; чистая функция, любые координаты
    #[inline]
    pub fn terrain_height(&self, x: f64, z: f64) -> f64 {
        self.field.height(x, z)
    }

    /// Рельеф или вода, что выше
    pub fn surface_height(&self, x: f64, z: f64) -> f64 {
        self.terrain_height(x, z).max(self.config.water.level)
    }

    pub fn probe(&self, x: f64, z: f64) -> SurfaceProbe {
        let height = self.field.height(x, z);
        let normal = self.field.normal(x, z, height, self.config.chunk.normal_epsilon);
        let weights = self.config.blend.weights(height as f32, normal[1] as f32);
        SurfaceProbe { height, normal, weights }
    }

    // ---------- Per-frame ----------

    /// Раз в кадр до отрисовки
    pub fn update(&mut self, viewer: Vec3) -> UpdateStats {
        self.manager.update(viewer, &self.field)
    }

    pub fn visible_chunks<'a>(
        &'a self,
        frustum: &'a Frustum,
    ) -> impl Iterator<Item = &'a Chunk<A::Handle>> + 'a {
        self.manager
            .iter()
            .filter(move |chunk| frustum.intersects_aabb(chunk.bounds()))
    }

    pub fn cull_stats(&self, frustum: &Frustum) -> CullStats {
        let visible = self.visible_chunks(frustum).count();
        CullStats {
            visible,
            culled: self.manager.len() - visible,
        }
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk<A::Handle>> {
        self.manager.iter()
    }

    pub fn chunk(&self, key: ChunkKey) -> Option<&Chunk<A::Handle>> {
        self.manager.get(key)
    }

    pub fn chunk_count(&self) -> usize {
        self.manager.len()
    }

    // ---------- Parameters ----------

    /// Отклонённые параметры не трогают текущее состояние
    pub fn set_noise_params(&mut self, params: NoiseParams) -> Result<(), ConfigError> {
        params.validate()?;
        self.config.noise = params;
        self.field = HeightField::new(self.config.seed, params);
        self.invalidate("noise parameters changed");
        Ok(())
    }

    pub fn reseed(&mut self, seed: f64) -> Result<(), ConfigError> {
        validate_seed(seed)?;
        self.apply_seed(seed);
        Ok(())
    }

    /// Случайный seed в [0, 10000); возвращает новый seed
    pub fn regenerate(&mut self) -> f64 {
        let seed = rand::thread_rng().gen_range(0.0..MAX_RANDOM_SEED);
        self.apply_seed(seed);
        seed
    }

    fn apply_seed(&mut self, seed: f64) {
        self.config.seed = seed;
        self.field = HeightField::new(seed, self.config.noise);
        self.invalidate("reseeded");
    }

    pub fn set_chunk_layout(&mut self, layout: ChunkLayout) -> Result<(), ConfigError> {
        layout.validate()?;
        self.config.chunk = layout;
        self.manager.set_layout(layout);
        self.generation += 1;
        log::info!(
            "Chunk layout changed to {} x {} (generation {})",
            layout.quads_per_side, layout.quad_size, self.generation
        );
        Ok(())
    }

    /// Чанки вне нового радиуса выгрузятся на следующем update
    pub fn set_render_distance(&mut self, render_distance: i32) -> Result<(), ConfigError> {
        validate_render_distance(render_distance)?;
        self.config.render_distance = render_distance;
        self.manager.set_render_distance(render_distance);
        Ok(())
    }

    pub fn set_load_shape(&mut self, shape: LoadShape) {
        self.config.load_shape = shape;
        self.manager.set_shape(shape);
    }

    pub fn set_parallel_build(&mut self, parallel: bool) {
        self.config.parallel_build = parallel;
        self.manager.set_parallel(parallel);
    }

    fn invalidate(&mut self, reason: &str) {
        let dropped = self.manager.clear();
        self.generation += 1;
        log::info!(
            "Terrain invalidated ({}): seed {}, {} chunks dropped, generation {}",
            reason, self.config.seed, dropped, self.generation
        );
    }

    // ---------- Accessors ----------

    pub fn seed(&self) -> f64 {
        self.config.seed
    }

    pub fn params(&self) -> &NoiseParams {
        &self.config.noise
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn height_field(&self) -> &HeightField {
        &self.field
    }

    /// Растёт при каждой полной инвалидации
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn water_mesh(&self) -> ChunkMesh {
        build_water_plane(&self.config.water)
    }

    pub fn allocator(&self) -> &A {
        self.manager.allocator()
    }

    pub fn allocator_mut(&mut self) -> &mut A {
        self.manager.allocator_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::gpu::HostAllocator;
    use ultraviolet::Mat4;

    const TOLERANCE: f64 = 1e-12;

    fn config(render_distance: i32) -> EngineConfig {
        EngineConfig {
            seed: 42.0,
            render_distance,
            ..EngineConfig::default()
        }
    }

    fn engine(render_distance: i32) -> TerrainEngine<HostAllocator> {
        TerrainEngine::new(config(render_distance), HostAllocator::new()).unwrap()
    }

    #[test]
    fn pinned_height_through_engine() {
        let engine = engine(0);
        assert!((engine.terrain_height(0.0, 0.0) - 0.2).abs() < TOLERANCE);
        assert!((engine.terrain_height(12.3, -4.7) - 0.7288923394725939).abs() < TOLERANCE);
        assert_eq!(
            engine.terrain_height(-7.5, 20.25).to_bits(),
            engine.terrain_height(-7.5, 20.25).to_bits()
        );
    }

    #[test]
    fn surface_height_clamps_to_water() {
        let engine = engine(0);
        // Рельеф в (3, 3) ниже уровня воды -0.6
        assert!(engine.terrain_height(3.0, 3.0) < -0.6);
        assert_eq!(engine.surface_height(3.0, 3.0), -0.6);
        assert_eq!(engine.surface_height(12.3, -4.7), engine.terrain_height(12.3, -4.7));
    }

    #[test]
    fn probe_matches_height_field() {
        let engine = engine(0);
        let probe = engine.probe(12.3, -4.7);
        assert_eq!(probe.height, engine.terrain_height(12.3, -4.7));
        let len = probe.normal.iter().map(|c| c * c).sum::<f64>().sqrt();
        assert!((len - 1.0).abs() < 1e-12);
        let w = probe.weights;
        assert!((w.grass + w.rock + w.snow - 1.0).abs() < 1e-5);
    }

    #[test]
    fn update_at_origin_loads_25_chunks() {
        let mut engine = engine(2);
        let stats = engine.update(Vec3::zero());
        assert_eq!(stats.loaded, 25);
        assert_eq!(engine.chunk_count(), 25);
        for dx in -2..=2 {
            for dz in -2..=2 {
                assert!(engine.chunk(ChunkKey::new(dx, dz)).is_some());
            }
        }
    }

    #[test]
    fn noise_change_invalidates_everything() {
        let mut engine = engine(1);
        engine.update(Vec3::zero());
        let before = engine.chunk(ChunkKey::new(0, 0)).unwrap().mesh().clone();

        let params = NoiseParams { octaves: 5, ..NoiseParams::default() };
        engine.set_noise_params(params).unwrap();
        assert_eq!(engine.chunk_count(), 0);
        assert_eq!(engine.generation(), 1);
        assert_eq!(engine.allocator().live_count(), 0);

        let stats = engine.update(Vec3::zero());
        assert_eq!(stats.loaded, 9);
        let after = engine.chunk(ChunkKey::new(0, 0)).unwrap().mesh();
        assert_ne!(&before, after);
        assert_eq!(engine.params().octaves, 5);
    }

    #[test]
    fn rejected_params_keep_prior_state() {
        let mut engine = engine(1);
        engine.update(Vec3::zero());
        let height = engine.terrain_height(12.3, -4.7);

        let bad = NoiseParams { octaves: 0, ..NoiseParams::default() };
        assert!(matches!(engine.set_noise_params(bad), Err(ConfigError::InvalidOctaves(0))));
        assert!(engine.reseed(f64::NAN).is_err());
        assert!(engine.set_render_distance(-3).is_err());
        assert!(engine
            .set_chunk_layout(ChunkLayout { quads_per_side: 0, ..ChunkLayout::default() })
            .is_err());

        assert_eq!(engine.generation(), 0);
        assert_eq!(engine.chunk_count(), 9);
        assert_eq!(engine.params().octaves, 4);
        assert_eq!(engine.terrain_height(12.3, -4.7), height);
    }

    #[test]
    fn reseed_changes_heights_and_bumps_generation() {
        let mut engine = engine(1);
        engine.update(Vec3::zero());
        engine.reseed(7.0).unwrap();
        assert_eq!(engine.seed(), 7.0);
        assert_eq!(engine.generation(), 1);
        assert_eq!(engine.chunk_count(), 0);

        let fresh = TerrainEngine::new(
            EngineConfig { seed: 7.0, ..config(0) },
            HostAllocator::new(),
        )
        .unwrap();
        assert_eq!(
            engine.terrain_height(12.3, -4.7).to_bits(),
            fresh.terrain_height(12.3, -4.7).to_bits()
        );
    }

    #[test]
    fn regenerate_rolls_seed_in_range() {
        let mut engine = engine(1);
        engine.update(Vec3::zero());
        for expected in 1..=5 {
            let seed = engine.regenerate();
            assert!((0.0..MAX_RANDOM_SEED).contains(&seed));
            assert_eq!(engine.seed(), seed);
            assert_eq!(engine.generation(), expected);
        }
        assert_eq!(engine.chunk_count(), 0);
    }

    #[test]
    fn layout_change_uses_new_chunk_size() {
        let mut engine = engine(0);
        engine.update(Vec3::new(7.0, 0.0, 0.0));
        assert!(engine.chunk(ChunkKey::new(1, 0)).is_some());

        let layout = ChunkLayout { quads_per_side: 10, ..ChunkLayout::default() };
        engine.set_chunk_layout(layout).unwrap();
        assert_eq!(engine.chunk_count(), 0);
        assert_eq!(engine.generation(), 1);

        // Размер чанка теперь 3.0
        engine.update(Vec3::new(7.0, 0.0, 0.0));
        let chunk = engine.chunk(ChunkKey::new(2, 0)).unwrap();
        assert_eq!(chunk.mesh().vertex_count(), 11 * 11);
    }

    #[test]
    fn render_distance_and_shape_apply_on_next_update() {
        let mut engine = engine(2);
        engine.update(Vec3::zero());
        engine.set_render_distance(1).unwrap();
        assert_eq!(engine.chunk_count(), 25);
        engine.update(Vec3::zero());
        assert_eq!(engine.chunk_count(), 9);

        engine.set_render_distance(2).unwrap();
        engine.set_load_shape(LoadShape::Circle);
        engine.update(Vec3::zero());
        assert_eq!(engine.chunk_count(), 13);
        assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn visible_chunks_are_a_subset() {
        let mut engine = engine(2);
        engine.update(Vec3::new(3.0, 1.0, 3.0));

        // Смотрим вдоль +Z из чанка (0, 0)
        let eye = Vec3::new(3.0, 1.0, 3.0);
        let view = Mat4::look_at(eye, eye + Vec3::unit_z(), Vec3::unit_y());
        let proj = ultraviolet::projection::perspective_gl(45.0_f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0);
        let frustum = Frustum::from_view_projection(&(proj * view));

        let stats = engine.cull_stats(&frustum);
        assert_eq!(stats.visible + stats.culled, 25);
        assert!(stats.visible > 0);
        assert!(stats.culled > 0);

        let visible: Vec<ChunkKey> = engine.visible_chunks(&frustum).map(|c| c.key()).collect();
        assert_eq!(visible.len(), stats.visible);
        assert!(visible.contains(&ChunkKey::new(0, 1)));
        assert!(!visible.contains(&ChunkKey::new(0, -2)));
    }

    #[test]
    fn water_mesh_sits_at_water_level() {
        let engine = engine(0);
        let water = engine.water_mesh();
        assert!(!water.is_empty());
        assert!(water.positions().iter().all(|p| p[1] == -0.6_f32));
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = EngineConfig { render_distance: 1000, ..EngineConfig::default() };
        assert!(matches!(
            TerrainEngine::new(config, HostAllocator::new()),
            Err(ConfigError::InvalidRenderDistance(1000))
        ));
    }
}
