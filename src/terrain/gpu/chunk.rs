// ============================================
// GPU Chunk - Буферы чанка на GPU
// ============================================

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::terrain::cache::ChunkKey;
use crate::terrain::mesh::ChunkMesh;
use super::allocator::{AllocError, MeshAllocator};

/// GPU буферы одного меша: позиции, нормали, UV, индексы
pub struct GpuMesh {
    pub key: ChunkKey,
    pub vertex_buffer: wgpu::Buffer,
    pub normal_buffer: wgpu::Buffer,
    pub tex_coord_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    fn create(device: &wgpu::Device, key: ChunkKey, mesh: &ChunkMesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Chunk {:?} Positions", key)),
            contents: bytemuck::cast_slice(mesh.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let normal_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Chunk {:?} Normals", key)),
            contents: bytemuck::cast_slice(mesh.normals()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let tex_coord_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Chunk {:?} TexCoords", key)),
            contents: bytemuck::cast_slice(mesh.tex_coords()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Chunk {:?} Indices", key)),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            key,
            vertex_buffer,
            normal_buffer,
            tex_coord_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
        }
    }

    fn destroy(self) {
        self.vertex_buffer.destroy();
        self.normal_buffer.destroy();
        self.tex_coord_buffer.destroy();
        self.index_buffer.destroy();
    }

    /// Layout буфера позиций (location 0)
    pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }

    /// Layout буфера нормалей (location 1)
    pub fn normal_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        }];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }

    /// Layout буфера UV (location 2)
    pub fn tex_coord_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
            offset: 0,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x2,
        }];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Аллокатор поверх wgpu::Device
pub struct WgpuAllocator {
    device: Arc<wgpu::Device>,
    live: usize,
}

impl WgpuAllocator {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self { device, live: 0 }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    fn check_limits(&self, mesh: &ChunkMesh) -> Result<(), AllocError> {
        let limit = self.device.limits().max_buffer_size;
        let largest = (mesh.position_floats().len() * std::mem::size_of::<f32>())
            .max(mesh.indices().len() * std::mem::size_of::<u32>()) as u64;
        if largest > limit {
            return Err(AllocError::BufferTooLarge { size: largest, limit });
        }
        Ok(())
    }
}

impl MeshAllocator for WgpuAllocator {
    type Handle = GpuMesh;

    fn allocate(&mut self, key: ChunkKey, mesh: &ChunkMesh) -> Result<GpuMesh, AllocError> {
        if mesh.is_empty() {
            return Err(AllocError::EmptyMesh);
        }
        self.check_limits(mesh)?;

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let gpu_mesh = GpuMesh::create(&self.device, key, mesh);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        if let Some(error) = out_of_memory.or(validation) {
            gpu_mesh.destroy();
            return Err(AllocError::Device(error.to_string()));
        }

        self.live += 1;
        log::debug!("uploaded {:?}: {} indices", key, gpu_mesh.index_count);
        Ok(gpu_mesh)
    }

    fn release(&mut self, handle: GpuMesh) {
        self.live = self.live.saturating_sub(1);
        handle.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layouts_match_mesh_attributes() {
        let layouts = [
            GpuMesh::position_layout(),
            GpuMesh::normal_layout(),
            GpuMesh::tex_coord_layout(),
        ];
        let locations: Vec<u32> = layouts.iter().map(|l| l.attributes[0].shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2]);
        assert_eq!(layouts[0].array_stride, 12);
        assert_eq!(layouts[1].array_stride, 12);
        assert_eq!(layouts[2].array_stride, 8);
        assert_eq!(layouts[2].attributes[0].format, wgpu::VertexFormat::Float32x2);
    }
}
