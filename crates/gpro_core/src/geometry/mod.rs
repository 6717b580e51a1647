pub mod aabb;
pub mod mesh;
pub mod primitives;
pub mod vertex;

pub use aabb::{Aabb, GpuAabb};
pub use mesh::{Index, Mesh, MeshBuilder, INDEX_SIZE};
pub use vertex::Vertex;
