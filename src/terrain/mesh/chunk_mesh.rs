// ============================================
// Chunk Mesh - Структурированный меш и AABB
// ============================================

use std::fmt;

use ultraviolet::Vec3;

/// Axis-aligned bounding box в мировых координатах
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Пустой бокс: первая точка через include задаёт оба угла
    pub fn empty() -> Self {
        Self {
            min: Vec3::broadcast(f32::INFINITY),
            max: Vec3::broadcast(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min_by_component(p);
        self.max = self.max.max_by_component(p);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }
}

/// Нарушение инвариантов меша при создании
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    AttributeLength { attribute: &'static str, expected: usize, actual: usize },
    IndexOutOfRange { index: u32, vertex_count: usize },
    IncompleteTriangle(usize),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::AttributeLength { attribute, expected, actual } => write!(
                f,
                "{attribute} has {actual} entries, expected {expected}"
            ),
            MeshError::IndexOutOfRange { index, vertex_count } => {
                write!(f, "index {index} out of range for {vertex_count} vertices")
            }
            MeshError::IncompleteTriangle(len) => {
                write!(f, "index count {len} is not a multiple of 3")
            }
        }
    }
}

impl std::error::Error for MeshError {}

/// Меш чанка: отдельные массивы атрибутов + индексы треугольников.
/// Неизменяем после создания. Снаружи создаётся только через `new`,
/// который проверяет длины и индексы. `build_chunk` и `build_water_plane`
/// выдают согласованные массивы по построению сетки и проверяют это
/// только в debug сборке.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMesh {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl ChunkMesh {
    /// Проверяет длины атрибутов и индексы один раз при создании
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        tex_coords: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Result<Self, MeshError> {
        let vertex_count = positions.len();
        if normals.len() != vertex_count {
            return Err(MeshError::AttributeLength {
                attribute: "normals",
                expected: vertex_count,
                actual: normals.len(),
            });
        }
        if tex_coords.len() != vertex_count {
            return Err(MeshError::AttributeLength {
                attribute: "tex_coords",
                expected: vertex_count,
                actual: tex_coords.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange { index, vertex_count });
        }

        Ok(Self { positions, normals, tex_coords, indices })
    }

    /// Для сеточных генераторов: (N+1)^2 вершин на каждый атрибут и
    /// индексы из `grid_indices(N)`, которые по построению меньше (N+1)^2
    pub(crate) fn from_parts_unchecked(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        tex_coords: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(normals.len(), positions.len());
        debug_assert_eq!(tex_coords.len(), positions.len());
        debug_assert!(indices.len() % 3 == 0);
        debug_assert!(indices.iter().all(|&i| (i as usize) < positions.len()));
        Self { positions, normals, tex_coords, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Плоские массивы: 3 * vertex_count, 3 * vertex_count, 2 * vertex_count
    pub fn position_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn tex_coord_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.tex_coords)
    }

    /// Размер всех четырёх буферов в байтах
    pub fn byte_size(&self) -> u64 {
        let floats = self.positions.len() * 3 + self.normals.len() * 3 + self.tex_coords.len() * 2;
        (floats * std::mem::size_of::<f32>() + self.indices.len() * std::mem::size_of::<u32>()) as u64
    }

    /// AABB по фактическим позициям вершин
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for p in &self.positions {
            aabb.include(Vec3::new(p[0], p[1], p[2]));
        }
        aabb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> ChunkMesh {
        ChunkMesh::new(
            vec![[0.0, 0.0, 0.0], [1.0, 2.0, 0.0], [0.0, -1.0, 3.0]],
            vec![[0.0, 1.0, 0.0]; 3],
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vec![0, 1, 2],
        )
        .unwrap()
    }

    #[test]
    fn flat_views_have_expected_lengths() {
        let mesh = triangle();
        assert_eq!(mesh.position_floats().len(), 3 * mesh.vertex_count());
        assert_eq!(mesh.normal_floats().len(), 3 * mesh.vertex_count());
        assert_eq!(mesh.tex_coord_floats().len(), 2 * mesh.vertex_count());
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.byte_size(), (9 + 9 + 6) * 4 + 3 * 4);
    }

    #[test]
    fn rejects_broken_meshes() {
        let err = ChunkMesh::new(vec![[0.0; 3]; 3], vec![[0.0; 3]; 2], vec![[0.0; 2]; 3], vec![0, 1, 2]);
        assert!(matches!(err, Err(MeshError::AttributeLength { attribute: "normals", .. })));

        let err = ChunkMesh::new(vec![[0.0; 3]; 3], vec![[0.0; 3]; 3], vec![[0.0; 2]; 3], vec![0, 1]);
        assert_eq!(err, Err(MeshError::IncompleteTriangle(2)));

        let err = ChunkMesh::new(vec![[0.0; 3]; 3], vec![[0.0; 3]; 3], vec![[0.0; 2]; 3], vec![0, 1, 3]);
        assert_eq!(err, Err(MeshError::IndexOutOfRange { index: 3, vertex_count: 3 }));
    }

    #[test]
    fn bounds_track_every_vertex() {
        let aabb = triangle().bounds();
        assert_eq!(aabb.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
        assert!(aabb.contains(Vec3::new(0.5, 0.0, 1.0)));
        assert!(!aabb.contains(Vec3::new(0.5, 5.0, 1.0)));
        assert!(Aabb::empty().is_empty());
    }
}
