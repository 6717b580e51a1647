use std::sync::Arc;

use gpro_core::{GpuAabb, InstanceTransform, Material, Vertex};

/// One indexed indirect draw, laid out exactly as wgpu reads it from the
/// indirect buffer.
///
/// The culling shader toggles `instance_count` between 0 and 1; every other
/// field is written once at admission.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct IndirectDrawCommand {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    /// Global instance index; the vertex shader reads the transform at
    /// `instance_index`, which starts here.
    pub first_instance: u32,
}

impl IndirectDrawCommand {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

/// Per-instance lookup entry.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceMeshEntry {
    /// Batch-local mesh index.
    pub mesh: u32,
    /// Global index into the bounding-box array.
    pub aabb: u32,
    /// Batch-local material slot; indexes the batch's texture array.
    pub material: u32,
}

/// Per-instance and per-mesh arrays shared by all batches.
///
/// `transforms`, `commands` and `instance_map` always have one entry per
/// admitted instance; `aabbs` has one per admitted mesh.
#[derive(Debug, Default, Clone)]
pub struct InstanceData {
    pub transforms: Vec<InstanceTransform>,
    pub aabbs: Vec<GpuAabb>,
    pub commands: Vec<IndirectDrawCommand>,
    pub instance_map: Vec<InstanceMeshEntry>,
}

impl InstanceData {
    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Drops everything past `instances` instances and `aabbs` boxes.
    pub(crate) fn truncate(&mut self, instances: usize, aabbs: usize) {
        self.transforms.truncate(instances);
        self.commands.truncate(instances);
        self.instance_map.truncate(instances);
        self.aabbs.truncate(aabbs);
    }

    /// True when the three per-instance arrays agree in length.
    pub fn is_consistent(&self) -> bool {
        self.transforms.len() == self.commands.len()
            && self.transforms.len() == self.instance_map.len()
    }
}

/// Counters and lengths of a [`CpuBatch`] at one point in time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BatchMark {
    vertex_offset: i32,
    index_offset: u32,
    size: u32,
    byte: u64,
    instance_count: u32,
    vertices: usize,
    indices: usize,
    materials: usize,
    dirty: bool,
}

/// A batch under construction (or sealed, once a successor exists).
#[derive(Debug, Clone)]
pub struct CpuBatch {
    pub index: u32,
    /// Base vertex of the next mesh.
    pub vertex_offset: i32,
    /// First index of the next mesh.
    pub index_offset: u32,
    /// Number of meshes.
    pub size: u32,
    /// Vertex plus index bytes accumulated so far.
    pub byte: u64,
    pub instance_count: u32,
    /// Position of this batch's first command in [`InstanceData::commands`].
    pub first_command: u32,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Distinct materials in first-use order; meshes sharing a diffuse
    /// image share a slot.
    pub materials: Vec<Material>,
    /// Has been flushed at least once.
    pub pushed: bool,
    /// Has content the GPU copy lacks.
    pub dirty: bool,
}

impl CpuBatch {
    pub fn new(index: u32, first_command: u32) -> Self {
        Self {
            index,
            vertex_offset: 0,
            index_offset: 0,
            size: 0,
            byte: 0,
            instance_count: 0,
            first_command,
            vertices: Vec::new(),
            indices: Vec::new(),
            materials: Vec::new(),
            pushed: false,
            dirty: false,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub(crate) fn mark(&self) -> BatchMark {
        BatchMark {
            vertex_offset: self.vertex_offset,
            index_offset: self.index_offset,
            size: self.size,
            byte: self.byte,
            instance_count: self.instance_count,
            vertices: self.vertices.len(),
            indices: self.indices.len(),
            materials: self.materials.len(),
            dirty: self.dirty,
        }
    }

    /// Undoes every append made since `mark` was taken.
    pub(crate) fn rewind(&mut self, mark: BatchMark) {
        self.vertex_offset = mark.vertex_offset;
        self.index_offset = mark.index_offset;
        self.size = mark.size;
        self.byte = mark.byte;
        self.instance_count = mark.instance_count;
        self.vertices.truncate(mark.vertices);
        self.indices.truncate(mark.indices);
        self.materials.truncate(mark.materials);
        self.dirty = mark.dirty;
    }

    /// Slot of `material` in this batch, if its image is already bound.
    pub fn material_slot(&self, material: &Material) -> Option<u32> {
        self.materials
            .iter()
            .position(|m| Arc::ptr_eq(&m.diffuse, &material.diffuse))
            .map(|i| i as u32)
    }

    /// Range of this batch's commands in the global command array.
    pub fn command_range(&self) -> std::ops::Range<u32> {
        self.first_command..self.first_command + self.instance_count
    }
}
