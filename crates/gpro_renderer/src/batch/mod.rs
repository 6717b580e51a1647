//! CPU-side batching and its GPU materialisation.
//!
//! [`BatchAccumulator`] groups admitted drawables into byte-bounded
//! [`CpuBatch`]es and appends their per-instance data to the global
//! [`InstanceData`]; every flush is handed to a [`BatchSink`], which in the
//! running renderer is the [`BatchMaterializer`] plus the stages that bind
//! its buffers.

pub mod accumulator;
pub mod cpu;
pub mod gpu;

pub use accumulator::{BatchAccumulator, BatchLimits, BatchSink, Batchable, BatchedObject, FlushKind};
pub use cpu::{CpuBatch, IndirectDrawCommand, InstanceData, InstanceMeshEntry};
pub use gpu::{BatchMaterializer, GlobalInstanceBuffers, GpuBatch, MaterializeOutcome};
