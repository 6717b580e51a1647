use thiserror::Error;

/// Reasons a piece of authored content is refused before it can reach a
/// batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("mesh has no vertices")]
    EmptyVertices,
    #[error("mesh has no indices")]
    EmptyIndices,
    #[error("index {index} references vertex {value} but the mesh only has {vertex_count} vertices")]
    IndexOutOfRange {
        index: usize,
        value: u32,
        vertex_count: usize,
    },
    #[error("drawable must have at least one instance")]
    NoInstances,
    #[error("instance count is {instance_count} but {transforms} transforms were supplied")]
    InstanceMismatch { instance_count: u32, transforms: usize },
    #[error("material image is {width}x{height} but holds {len} bytes (expected {expected})")]
    MaterialSize {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },
}
