//! CPU-side triangle meshes.
//!
//! A [`Mesh`] is immutable once built.  Authoring code goes through
//! [`MeshBuilder`], which welds attribute-identical vertices so that the
//! batches uploaded to the GPU never carry duplicates.

use std::collections::HashMap;

use super::Vertex;
use crate::error::GeometryError;

/// Index type shared by every mesh and batch index buffer.
pub type Index = u32;

/// Size in bytes of one index.
pub const INDEX_SIZE: usize = std::mem::size_of::<Index>();

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<Index>,
}

impl Mesh {
    /// Wraps already-welded vertex/index data, validating that every index
    /// references an existing vertex.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<Index>) -> Result<Self, GeometryError> {
        if vertices.is_empty() {
            return Err(GeometryError::EmptyVertices);
        }
        if indices.is_empty() {
            return Err(GeometryError::EmptyIndices);
        }
        if let Some((index, &value)) = indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= vertices.len())
        {
            return Err(GeometryError::IndexOutOfRange {
                index,
                value,
                vertex_count: vertices.len(),
            });
        }
        Ok(Self { vertices, indices })
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Bytes this mesh occupies in a batch's vertex + index buffers.
    pub fn byte_size(&self) -> u64 {
        (self.vertices.len() * Vertex::SIZE + self.indices.len() * INDEX_SIZE) as u64
    }
}

/// Incremental mesh construction with vertex welding.
///
/// Every pushed vertex is looked up among the vertices already emitted; an
/// attribute-identical match is reused and only its index is appended.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<Index>,
    seen: HashMap<[u32; 8], Index>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one corner of a triangle and returns the index it resolved to.
    pub fn push_vertex(&mut self, vertex: Vertex) -> Index {
        let next = self.vertices.len() as Index;
        let index = *self.seen.entry(vertex.key()).or_insert(next);
        if index == next {
            self.vertices.push(vertex);
        }
        self.indices.push(index);
        index
    }

    pub fn push_triangle(&mut self, a: Vertex, b: Vertex, c: Vertex) {
        self.push_vertex(a);
        self.push_vertex(b);
        self.push_vertex(c);
    }

    /// Number of distinct vertices emitted so far.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn build(self) -> Result<Mesh, GeometryError> {
        Mesh::new(self.vertices, self.indices)
    }
}

impl FromIterator<Vertex> for MeshBuilder {
    /// Builds from an unindexed triangle-list corner stream.
    fn from_iter<I: IntoIterator<Item = Vertex>>(iter: I) -> Self {
        let mut builder = MeshBuilder::new();
        for v in iter {
            builder.push_vertex(v);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vertex {
        Vertex::new([x, y, 0.0], [x, y], [0.0, 0.0, 1.0])
    }

    #[test]
    fn identical_vertices_are_welded() {
        let mut b = MeshBuilder::new();
        // quad as two triangles sharing an edge
        b.push_triangle(v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0));
        b.push_triangle(v(1.0, 1.0), v(0.0, 1.0), v(0.0, 0.0));
        let mesh = b.build().unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices(), &[0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn differing_normal_is_a_new_vertex() {
        let a = v(0.0, 0.0);
        let mut b = a;
        b.normal = [0.0, 1.0, 0.0];
        let builder: MeshBuilder = [a, b, a].into_iter().collect();
        assert_eq!(builder.vertex_count(), 2);
    }

    #[test]
    fn signed_zero_is_welded() {
        let a = Vertex::new([0.0, 1.0, 0.0], [0.5, 0.0], [0.0, 1.0, 0.0]);
        let b = Vertex::new([-0.0, 1.0, -0.0], [0.5, -0.0], [-0.0, 1.0, 0.0]);
        let builder: MeshBuilder = [a, b, a].into_iter().collect();
        assert_eq!(builder.vertex_count(), 1);
        assert_eq!(builder.build().unwrap().indices(), &[0, 0, 0]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = Mesh::new(vec![v(0.0, 0.0)], vec![0, 1, 0]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::IndexOutOfRange { index: 1, value: 1, vertex_count: 1 }
        );
    }

    #[test]
    fn byte_size_counts_vertices_and_indices() {
        let mesh = Mesh::new(vec![v(0.0, 0.0); 3], vec![0, 1, 2]).unwrap();
        assert_eq!(mesh.byte_size(), (3 * Vertex::SIZE + 3 * 4) as u64);
    }
}
