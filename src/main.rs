// ============================================
// Horizon Demo - Пролёт камеры над бесконечным terrain
// ============================================
// Запуск: horizon [config.json]
// Уровень логов через RUST_LOG (например RUST_LOG=info).

use std::env;

use rand::Rng;
use ultraviolet::{Mat4, Vec3};

use horizon::core::{EngineConfig, TerrainEngine, MAX_RANDOM_SEED};
use horizon::render::Frustum;
use horizon::terrain::gpu::init_headless;
use horizon::terrain::{ChunkKey, HostAllocator, MeshAllocator, WgpuAllocator};

const FRAMES: u32 = 600;
const STATS_EVERY: u32 = 60;
/// Камера держится над рельефом или водой
const HOVER_HEIGHT: f32 = 1.5;
const FLY_SPEED: f32 = 0.15;
const TURN_SPEED: f32 = 0.002;
const FOV_DEGREES: f32 = 70.0;
const ASPECT: f32 = 16.0 / 9.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;
/// Ключ водной плоскости у аллокатора; с чанками не пересекается
const WATER_KEY: ChunkKey = ChunkKey::new(i32::MIN, i32::MIN);

fn main() {
    env_logger::init();

    let config = load_config();

    match pollster::block_on(init_headless()) {
        Ok((device, _queue)) => fly(config, WgpuAllocator::new(device)),
        Err(e) => {
            log::warn!("GPU unavailable ({}), falling back to host allocator", e);
            fly(config, HostAllocator::new());
        }
    }
}

/// Конфиг из первого аргумента; seed 0 заменяется случайным
fn load_config() -> EngineConfig {
    let mut config = match env::args().nth(1) {
        Some(path) => match EngineConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config {}: {}, using defaults", path, e);
                EngineConfig::default()
            }
        },
        None => EngineConfig::default(),
    };

    if config.seed == 0.0 {
        config.seed = rand::thread_rng().gen_range(0.0..MAX_RANDOM_SEED);
    }
    config
}

fn fly<A: MeshAllocator>(config: EngineConfig, allocator: A) {
    let mut engine = match TerrainEngine::new(config, allocator) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Invalid engine config: {}", e);
            return;
        }
    };

    let water = engine.water_mesh();
    let water_buffers = match engine.allocator_mut().allocate(WATER_KEY, &water) {
        Ok(buffers) => Some(buffers),
        Err(e) => {
            log::warn!("Water plane skipped: {}", e);
            None
        }
    };

    let projection =
        ultraviolet::projection::perspective_gl(FOV_DEGREES.to_radians(), ASPECT, Z_NEAR, Z_FAR);
    let mut position = Vec3::zero();
    let mut yaw = 0.0_f32;

    for frame in 0..FRAMES {
        if frame == FRAMES / 2 {
            let seed = engine.regenerate();
            log::info!("Frame {}: world regenerated with seed {:.3}", frame, seed);
        }

        yaw += TURN_SPEED;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        position += forward * FLY_SPEED;
        position.y =
            engine.surface_height(position.x as f64, position.z as f64) as f32 + HOVER_HEIGHT;

        let update = engine.update(position);

        let target = position + forward + Vec3::new(0.0, -0.2, 0.0);
        let view = Mat4::look_at(position, target, Vec3::unit_y());
        let frustum = Frustum::from_view_projection(&(projection * view));
        let cull = engine.cull_stats(&frustum);

        if frame % STATS_EVERY == 0 || update.failed > 0 {
            log::info!(
                "Frame {}: pos ({:.1}, {:.2}, {:.1}) resident {} (+{} -{} failed {}) visible {} culled {}",
                frame,
                position.x,
                position.y,
                position.z,
                update.resident,
                update.loaded,
                update.evicted,
                update.failed,
                cull.visible,
                cull.culled
            );
        }
    }

    let probe = engine.probe(position.x as f64, position.z as f64);
    log::info!(
        "Final probe: height {:.3}, grass {:.2} rock {:.2} snow {:.2}, generation {}",
        probe.height,
        probe.weights.grass,
        probe.weights.rock,
        probe.weights.snow,
        engine.generation()
    );

    if let Some(buffers) = water_buffers {
        engine.allocator_mut().release(buffers);
    }
}
