// ============================================
// Mesh Allocator - Узкий интерфейс GPU ресурсов
// ============================================
// Алгоритмическое ядро видит только allocate/release, поэтому карта высот,
// сборка чанков и culling тестируются без графического контекста.

use std::collections::HashMap;
use std::fmt;

use crate::terrain::cache::ChunkKey;
use crate::terrain::mesh::ChunkMesh;

/// Ошибка выделения буферов для одного меша
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    EmptyMesh,
    OutOfMemory { requested: u64, available: u64 },
    BufferTooLarge { size: u64, limit: u64 },
    Device(String),
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::EmptyMesh => write!(f, "mesh has no triangles"),
            AllocError::OutOfMemory { requested, available } => write!(
                f,
                "out of buffer memory: requested {requested} bytes, {available} available"
            ),
            AllocError::BufferTooLarge { size, limit } => {
                write!(f, "buffer of {size} bytes exceeds device limit of {limit}")
            }
            AllocError::Device(msg) => write!(f, "device error: {msg}"),
        }
    }
}

impl std::error::Error for AllocError {}

/// Создание и освобождение буферов меша.
/// `release` забирает handle, поэтому двойное освобождение невозможно.
pub trait MeshAllocator {
    type Handle;

    fn allocate(&mut self, key: ChunkKey, mesh: &ChunkMesh) -> Result<Self::Handle, AllocError>;

    fn release(&mut self, handle: Self::Handle);
}

/// Handle буферов в памяти хоста
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HostMesh {
    pub id: u64,
    pub key: ChunkKey,
    pub index_count: u32,
    pub bytes: u64,
}

/// Аллокатор без графики: учитывает живые выделения и байтовый бюджет
#[derive(Debug, Default)]
pub struct HostAllocator {
    live: HashMap<u64, u64>,
    next_id: u64,
    used_bytes: u64,
    budget: Option<u64>,
    allocations: u64,
    releases: u64,
}

impl HostAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ограничить суммарный объём живых буферов
    pub fn with_budget(budget_bytes: u64) -> Self {
        Self {
            budget: Some(budget_bytes),
            ..Self::default()
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn total_allocations(&self) -> u64 {
        self.allocations
    }

    pub fn total_releases(&self) -> u64 {
        self.releases
    }
}

impl MeshAllocator for HostAllocator {
    type Handle = HostMesh;

    fn allocate(&mut self, key: ChunkKey, mesh: &ChunkMesh) -> Result<HostMesh, AllocError> {
        if mesh.is_empty() {
            return Err(AllocError::EmptyMesh);
        }
        let bytes = mesh.byte_size();
        if let Some(budget) = self.budget {
            let available = budget.saturating_sub(self.used_bytes);
            if bytes > available {
                return Err(AllocError::OutOfMemory { requested: bytes, available });
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id, bytes);
        self.used_bytes += bytes;
        self.allocations += 1;

        Ok(HostMesh {
            id,
            key,
            index_count: mesh.index_count() as u32,
            bytes,
        })
    }

    fn release(&mut self, handle: HostMesh) {
        if let Some(bytes) = self.live.remove(&handle.id) {
            self.used_bytes -= bytes;
            self.releases += 1;
        } else {
            log::warn!("release of unknown host mesh {} for {:?}", handle.id, handle.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::generation::{HeightField, NoiseParams};
    use crate::terrain::mesh::{build_chunk, ChunkLayout};

    fn mesh() -> ChunkMesh {
        let field = HeightField::new(3.0, NoiseParams::default());
        build_chunk(ChunkKey::new(0, 0), &field, &ChunkLayout::default()).mesh
    }

    #[test]
    fn tracks_live_allocations() {
        let mut alloc = HostAllocator::new();
        let mesh = mesh();
        let a = alloc.allocate(ChunkKey::new(0, 0), &mesh).unwrap();
        let b = alloc.allocate(ChunkKey::new(1, 0), &mesh).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.index_count, 2400);
        assert_eq!(alloc.live_count(), 2);
        assert_eq!(alloc.used_bytes(), 2 * mesh.byte_size());

        alloc.release(a);
        assert_eq!(alloc.live_count(), 1);
        assert_eq!(alloc.total_releases(), 1);
        assert_eq!(alloc.used_bytes(), mesh.byte_size());
    }

    #[test]
    fn budget_rejects_overflow() {
        let mesh = mesh();
        let mut alloc = HostAllocator::with_budget(mesh.byte_size() + 10);
        assert!(alloc.allocate(ChunkKey::new(0, 0), &mesh).is_ok());
        let err = alloc.allocate(ChunkKey::new(1, 0), &mesh).unwrap_err();
        assert_eq!(err, AllocError::OutOfMemory { requested: mesh.byte_size(), available: 10 });
        assert_eq!(alloc.live_count(), 1);
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let empty = ChunkMesh::new(Vec::new(), Vec::new(), Vec::new(), Vec::new()).unwrap();
        let mut alloc = HostAllocator::new();
        assert_eq!(alloc.allocate(ChunkKey::new(0, 0), &empty), Err(AllocError::EmptyMesh));
    }
}
