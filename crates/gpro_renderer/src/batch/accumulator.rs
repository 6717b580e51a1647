//! Groups admitted drawables into byte-bounded batches.
//!
//! Admission appends geometry to the current [`CpuBatch`] and one transform,
//! one draw command and one map entry per instance to the global
//! [`InstanceData`].  When the next drawable would push the current batch
//! past its byte budget, or would need one material slot more than the
//! batch's texture array holds, the batch is sealed (flushed if dirty) and a
//! fresh one takes its place; a drawable is never split across batches.

use gpro_core::{Drawable, DrawableObject, Material};

use super::cpu::{CpuBatch, IndirectDrawCommand, InstanceData, InstanceMeshEntry};
use crate::config::FlushPolicy;
use crate::error::RenderError;

/// Whether a flush creates the GPU copy of a batch or replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushKind {
    New,
    Update,
}

/// Receives batches as they are flushed.
///
/// `instances` is the complete global instance data at flush time, not just
/// the part owned by `batch`.
pub trait BatchSink {
    fn flush(
        &mut self,
        batch: &CpuBatch,
        instances: &InstanceData,
        kind: FlushKind,
    ) -> Result<(), RenderError>;
}

/// Something that can be appended to a batch.
pub trait Batchable {
    /// Vertex plus index bytes this drawable adds to a batch.
    fn byte_size(&self) -> u64;

    fn instance_count(&self) -> u32;

    fn material(&self) -> &Material;

    /// Appends geometry, material and per-instance data, advancing the
    /// batch's offsets and counters.
    fn append_to(&self, batch: &mut CpuBatch, instances: &mut InstanceData);
}

impl Batchable for DrawableObject {
    fn byte_size(&self) -> u64 {
        self.mesh().byte_size()
    }

    fn instance_count(&self) -> u32 {
        DrawableObject::instance_count(self)
    }

    fn material(&self) -> &Material {
        DrawableObject::material(self)
    }

    fn append_to(&self, batch: &mut CpuBatch, instances: &mut InstanceData) {
        let mesh = self.mesh();
        let local = batch.size;
        let material = match batch.material_slot(self.material()) {
            Some(slot) => slot,
            None => {
                batch.materials.push(self.material().clone());
                batch.materials.len() as u32 - 1
            }
        };
        let aabb = instances.aabbs.len() as u32;
        instances.aabbs.push(self.bounding_box().into());

        for transform in self.transforms() {
            let global = instances.transforms.len() as u32;
            instances.transforms.push((*transform).into());
            instances.commands.push(IndirectDrawCommand {
                index_count: mesh.index_count(),
                instance_count: 1,
                first_index: batch.index_offset,
                base_vertex: batch.vertex_offset,
                first_instance: global,
            });
            instances.instance_map.push(InstanceMeshEntry {
                mesh: local,
                aabb,
                material,
            });
        }

        batch.vertices.extend_from_slice(mesh.vertices());
        batch.indices.extend_from_slice(mesh.indices());
        batch.vertex_offset += mesh.vertex_count() as i32;
        batch.index_offset += mesh.index_count();
        batch.size += 1;
        batch.byte += mesh.byte_size();
        batch.instance_count += DrawableObject::instance_count(self);
    }
}

impl Batchable for Drawable {
    fn byte_size(&self) -> u64 {
        match self {
            Drawable::Mesh(obj) => obj.byte_size(),
        }
    }

    fn instance_count(&self) -> u32 {
        match self {
            Drawable::Mesh(obj) => Batchable::instance_count(obj),
        }
    }

    fn material(&self) -> &Material {
        match self {
            Drawable::Mesh(obj) => Batchable::material(obj),
        }
    }

    fn append_to(&self, batch: &mut CpuBatch, instances: &mut InstanceData) {
        match self {
            Drawable::Mesh(obj) => obj.append_to(batch, instances),
        }
    }
}

/// Where an admitted drawable ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchedObject {
    pub batch: u32,
    /// Batch-local mesh index.
    pub mesh: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub byte_budget: u64,
    /// Distinct materials per batch; the length of its texture array.
    pub max_materials: u32,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            byte_budget: 10_000_000,
            max_materials: u32::MAX,
        }
    }
}

pub struct BatchAccumulator {
    limits: BatchLimits,
    policy: FlushPolicy,
    sealed: Vec<CpuBatch>,
    current: CpuBatch,
    instances: InstanceData,
    objects: Vec<BatchedObject>,
}

impl BatchAccumulator {
    pub fn new(limits: BatchLimits, policy: FlushPolicy) -> Self {
        Self {
            limits,
            policy,
            sealed: Vec::new(),
            current: CpuBatch::new(0, 0),
            instances: InstanceData::default(),
            objects: Vec::new(),
        }
    }

    /// Appends `drawable` to the current batch, sealing it first if the
    /// drawable would not fit.
    ///
    /// If the eager flush fails the admission is undone: the drawable is
    /// absent from the batch, the instance data and [`Self::objects`].
    pub fn admit<B, S>(&mut self, drawable: &B, sink: &mut S) -> Result<BatchedObject, RenderError>
    where
        B: Batchable + ?Sized,
        S: BatchSink + ?Sized,
    {
        let byte = drawable.byte_size();
        if byte > self.limits.byte_budget {
            log::warn!(
                "drawable of {byte} bytes exceeds the batch budget of {} bytes; batching it alone",
                self.limits.byte_budget
            );
        }
        if self.would_overflow(byte, drawable.material()) {
            self.seal_current(sink)?;
        }

        let batch_mark = self.current.mark();
        let instance_mark = (self.instances.len(), self.instances.aabbs.len());
        drawable.append_to(&mut self.current, &mut self.instances);
        self.current.dirty = true;

        if self.policy == FlushPolicy::Eager {
            if let Err(err) = self.flush_current(sink) {
                self.current.rewind(batch_mark);
                self.instances.truncate(instance_mark.0, instance_mark.1);
                return Err(err);
            }
        }

        let placed = BatchedObject {
            batch: self.current.index,
            mesh: self.current.size - 1,
        };
        self.objects.push(placed);
        Ok(placed)
    }

    /// Flushes the current batch if it has unflushed content.
    pub fn flush<S: BatchSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), RenderError> {
        if self.current.dirty {
            self.flush_current(sink)?;
        }
        Ok(())
    }

    fn would_overflow(&self, byte: u64, material: &Material) -> bool {
        if self.current.is_empty() {
            return false;
        }
        let needs_slot = self.current.material_slot(material).is_none();
        self.current.byte + byte > self.limits.byte_budget
            || (needs_slot && self.current.materials.len() as u32 >= self.limits.max_materials)
    }

    fn seal_current<S: BatchSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), RenderError> {
        self.flush(sink)?;
        let next = CpuBatch::new(self.current.index + 1, self.instances.commands.len() as u32);
        let sealed = std::mem::replace(&mut self.current, next);
        log::info!(
            "sealed batch {} ({} meshes, {} instances, {} bytes)",
            sealed.index,
            sealed.size,
            sealed.instance_count,
            sealed.byte
        );
        self.sealed.push(sealed);
        Ok(())
    }

    fn flush_current<S: BatchSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), RenderError> {
        let kind = if self.current.pushed {
            FlushKind::Update
        } else {
            FlushKind::New
        };
        sink.flush(&self.current, &self.instances, kind)?;
        self.current.pushed = true;
        self.current.dirty = false;
        Ok(())
    }

    /// Sealed batches followed by the current one, in creation order.
    pub fn batches(&self) -> impl Iterator<Item = &CpuBatch> + '_ {
        self.sealed.iter().chain(std::iter::once(&self.current))
    }

    pub fn batch_count(&self) -> usize {
        self.sealed.len() + 1
    }

    pub fn current(&self) -> &CpuBatch {
        &self.current
    }

    pub fn instances(&self) -> &InstanceData {
        &self.instances
    }

    /// Batch-local mesh index of every instance, in instance order.
    pub fn instance_mesh_map(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.instances.instance_map.iter().map(|e| e.mesh)
    }

    /// Placement of every admitted drawable, in admission order.
    pub fn objects(&self) -> &[BatchedObject] {
        &self.objects
    }

    pub fn total_instances(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn limits(&self) -> BatchLimits {
        self.limits
    }

    pub fn policy(&self) -> FlushPolicy {
        self.policy
    }
}
