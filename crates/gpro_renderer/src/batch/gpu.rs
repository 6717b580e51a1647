//! Turns flushed CPU batches into device buffers.
//!
//! Each batch owns a vertex buffer, an index buffer and one texture per
//! distinct material.  The per-instance arrays are global: every flush rebuilds the
//! transform, bounding-box, instance-map and indirect-command buffers from
//! the complete [`InstanceData`] and destroys the previous set, so callers
//! must rebind anything that referenced them.

use gpro_core::GpuAabb;
use gpro_core::InstanceTransform;

use super::accumulator::FlushKind;
use super::cpu::{CpuBatch, IndirectDrawCommand, InstanceData, InstanceMeshEntry};
use crate::error::RenderError;
use crate::resources::{buffer, texture};

pub struct GpuBatch {
    pub index: u32,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    /// Diffuse maps in material-slot order; created once per slot and kept
    /// across updates.
    pub textures: Vec<wgpu::Texture>,
    pub material_views: Vec<wgpu::TextureView>,
    pub size: u32,
    pub instance_count: u32,
    pub first_command: u32,
}

impl GpuBatch {
    #[inline]
    pub fn material_count(&self) -> u32 {
        self.material_views.len() as u32
    }

    /// Byte offset of this batch's first command in the command buffer.
    #[inline]
    pub fn command_offset(&self) -> wgpu::BufferAddress {
        self.first_command as u64 * IndirectDrawCommand::SIZE
    }

    fn destroy_geometry(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// Device copies of the global per-instance arrays.
pub struct GlobalInstanceBuffers {
    pub transforms: wgpu::Buffer,
    pub aabbs: wgpu::Buffer,
    pub instance_map: wgpu::Buffer,
    /// `INDIRECT | STORAGE | COPY_DST | COPY_SRC`: written by culling, read
    /// by draws, copied out by [`GlobalInstanceBuffers::read_commands`].
    pub commands: wgpu::Buffer,
    pub instance_count: u32,
}

impl GlobalInstanceBuffers {
    fn create(device: &wgpu::Device, instances: &InstanceData) -> Self {
        Self {
            transforms: buffer::create_storage::<InstanceTransform>(
                device,
                "instance transforms",
                &instances.transforms,
                wgpu::BufferUsages::COPY_DST,
            ),
            aabbs: buffer::create_storage::<GpuAabb>(
                device,
                "mesh bounding boxes",
                &instances.aabbs,
                wgpu::BufferUsages::empty(),
            ),
            instance_map: buffer::create_storage::<InstanceMeshEntry>(
                device,
                "instance mesh map",
                &instances.instance_map,
                wgpu::BufferUsages::empty(),
            ),
            commands: buffer::create_storage::<IndirectDrawCommand>(
                device,
                "indirect commands",
                &instances.commands,
                wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
            ),
            instance_count: instances.len() as u32,
        }
    }

    /// Reads the indirect commands back, including the instance counts the
    /// last culling pass wrote.  Blocks.
    pub fn read_commands(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<IndirectDrawCommand>, RenderError> {
        let size = self.instance_count as u64 * IndirectDrawCommand::SIZE;
        let bytes = buffer::read_back(device, queue, &self.commands, size)?;
        Ok(bytes
            .chunks_exact(IndirectDrawCommand::SIZE as usize)
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    fn destroy(&self) {
        self.transforms.destroy();
        self.aabbs.destroy();
        self.instance_map.destroy();
        self.commands.destroy();
    }
}

/// What a [`BatchMaterializer::materialize`] call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOutcome {
    /// Slot of the batch in [`BatchMaterializer::batches`].
    pub batch: usize,
    pub is_new: bool,
    /// The batch's material array has a different length than before.
    pub materials_changed: bool,
}

#[derive(Default)]
pub struct BatchMaterializer {
    batches: Vec<GpuBatch>,
    globals: Option<GlobalInstanceBuffers>,
}

impl BatchMaterializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> &[GpuBatch] {
        &self.batches
    }

    pub fn globals(&self) -> Option<&GlobalInstanceBuffers> {
        self.globals.as_ref()
    }

    /// Uploads `batch` and the global instance arrays.
    ///
    /// On success the batch's previous geometry buffers and the previous
    /// global buffers are destroyed.  On failure nothing already on the
    /// device is touched.
    pub fn materialize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        batch: &CpuBatch,
        instances: &InstanceData,
        kind: FlushKind,
    ) -> Result<MaterializeOutcome, RenderError> {
        let slot = batch.index as usize;
        let existing = match kind {
            FlushKind::Update => self.batches.get(slot),
            FlushKind::New => None,
        };
        let is_new = existing.is_none();
        let kept_textures = existing.map_or(0, |b| b.textures.len());
        let previous_materials = existing.map_or(0, |b| b.material_count() as usize);

        check_sizes(device, batch, instances)?;

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_buffer = buffer::create_vertex(
            device,
            &format!("batch {} vertices", batch.index),
            &batch.vertices,
        );
        let index_buffer = buffer::create_index(
            device,
            &format!("batch {} indices", batch.index),
            &batch.indices,
        );
        let new_textures: Vec<_> = batch
            .materials
            .iter()
            .enumerate()
            .skip(kept_textures)
            .map(|(i, material)| {
                texture::create_material(
                    device,
                    queue,
                    &format!("batch {} material {i} ({})", batch.index, material.name),
                    &material.diffuse,
                )
            })
            .collect();
        let globals = GlobalInstanceBuffers::create(device, instances);

        let label = format!("batch {}", batch.index);
        let validation = pop_scope(device, &label);
        let memory = pop_scope(device, &label);
        validation.and(memory)?;

        let mut textures = match self.batches.get_mut(slot) {
            Some(old) if !is_new => {
                old.destroy_geometry();
                std::mem::take(&mut old.textures)
            }
            _ => Vec::new(),
        };
        textures.extend(new_textures);
        let material_views = textures.iter().map(texture::default_view).collect();

        let gpu = GpuBatch {
            index: batch.index,
            vertex_buffer,
            index_buffer,
            textures,
            material_views,
            size: batch.size,
            instance_count: batch.instance_count,
            first_command: batch.first_command,
        };
        let materials_changed = is_new || previous_materials != gpu.material_views.len();

        if slot < self.batches.len() {
            self.batches[slot] = gpu;
        } else {
            self.batches.push(gpu);
        }

        if let Some(old) = self.globals.replace(globals) {
            old.destroy();
        }

        log::info!(
            "{} batch {} ({} meshes, {} instances, {} vertices); {} instances total",
            if is_new { "pushed" } else { "updated" },
            batch.index,
            batch.size,
            batch.instance_count,
            batch.vertices.len(),
            instances.len()
        );

        Ok(MaterializeOutcome {
            batch: slot,
            is_new,
            materials_changed,
        })
    }
}

fn check_sizes(
    device: &wgpu::Device,
    batch: &CpuBatch,
    instances: &InstanceData,
) -> Result<(), RenderError> {
    let limits = device.limits();
    let max_buffer = limits.max_buffer_size;
    let max_storage = (limits.max_storage_buffer_binding_size as u64).min(max_buffer);

    buffer::check_size(
        "batch vertices",
        std::mem::size_of_val(batch.vertices.as_slice()) as u64,
        max_buffer,
    )?;
    buffer::check_size(
        "batch indices",
        std::mem::size_of_val(batch.indices.as_slice()) as u64,
        max_buffer,
    )?;
    buffer::check_size(
        "instance transforms",
        std::mem::size_of_val(instances.transforms.as_slice()) as u64,
        max_storage,
    )?;
    buffer::check_size(
        "mesh bounding boxes",
        std::mem::size_of_val(instances.aabbs.as_slice()) as u64,
        max_storage,
    )?;
    buffer::check_size(
        "instance mesh map",
        std::mem::size_of_val(instances.instance_map.as_slice()) as u64,
        max_storage,
    )?;
    buffer::check_size(
        "indirect commands",
        std::mem::size_of_val(instances.commands.as_slice()) as u64,
        max_storage,
    )
}

fn pop_scope(device: &wgpu::Device, label: &str) -> Result<(), RenderError> {
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(RenderError::creation(label, err)),
        None => Ok(()),
    }
}
