// ============================================
// Chunk Key - Идентификатор чанка
// ============================================

/// Ключ чанка: (chunk_x, chunk_z); z - вторая горизонтальная ось мира
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Чанк, содержащий мировую точку (floor-деление).
    /// Дальше диапазона i32 ключ насыщается.
    pub fn from_world(world_x: f64, world_z: f64, chunk_world_size: f64) -> Self {
        Self {
            x: (world_x / chunk_world_size).floor() as i32,
            z: (world_z / chunk_world_size).floor() as i32,
        }
    }

    /// Сдвиг с насыщением на краях диапазона
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self { x: self.x.saturating_add(dx), z: self.z.saturating_add(dz) }
    }

    /// None, если сдвиг выходит за диапазон i32
    pub fn checked_offset(self, dx: i32, dz: i32) -> Option<Self> {
        Some(Self { x: self.x.checked_add(dx)?, z: self.z.checked_add(dz)? })
    }

    /// Chebyshev-расстояние в чанках
    pub fn distance(self, other: ChunkKey) -> i64 {
        let dx = (self.x as i64 - other.x as i64).abs();
        let dz = (self.z as i64 - other.z as i64).abs();
        dx.max(dz)
    }

    /// Квадрат евклидова расстояния; насыщается на противоположных краях i32
    pub fn distance_sq(self, other: ChunkKey) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dz = self.z as i64 - other.z as i64;
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_world_floors_negative_coordinates() {
        assert_eq!(ChunkKey::from_world(0.0, 0.0, 6.0), ChunkKey::new(0, 0));
        assert_eq!(ChunkKey::from_world(5.99, 6.0, 6.0), ChunkKey::new(0, 1));
        assert_eq!(ChunkKey::from_world(-0.01, -6.0, 6.0), ChunkKey::new(-1, -1));
        assert_eq!(ChunkKey::from_world(-6.01, 13.0, 6.0), ChunkKey::new(-2, 2));
    }

    #[test]
    fn keys_have_total_order() {
        let mut keys = vec![ChunkKey::new(1, 0), ChunkKey::new(-1, 5), ChunkKey::new(1, -3)];
        keys.sort();
        assert_eq!(keys, vec![ChunkKey::new(-1, 5), ChunkKey::new(1, -3), ChunkKey::new(1, 0)]);
    }

    #[test]
    fn distances() {
        let a = ChunkKey::new(0, 0);
        assert_eq!(a.distance(ChunkKey::new(-3, 2)), 3);
        assert_eq!(a.distance_sq(ChunkKey::new(-3, 2)), 13);
        assert_eq!(a.offset(2, -1), ChunkKey::new(2, -1));
    }

    #[test]
    fn far_world_position_saturates_without_overflow() {
        let edge = ChunkKey::from_world(1.0e12, -1.0e12, 6.0);
        assert_eq!(edge, ChunkKey::new(i32::MAX, i32::MIN));

        assert_eq!(edge.offset(1, -1), edge);
        assert_eq!(edge.checked_offset(1, 0), None);
        assert_eq!(edge.checked_offset(0, -1), None);
        assert_eq!(edge.checked_offset(-1, 1), Some(ChunkKey::new(i32::MAX - 1, i32::MIN + 1)));

        let other = ChunkKey::new(i32::MIN, i32::MAX);
        assert_eq!(edge.distance(other), u32::MAX as i64);
        assert_eq!(edge.distance_sq(other), i64::MAX);
        assert_eq!(edge.distance_sq(edge.offset(-3, 4)), 25);
    }
}
