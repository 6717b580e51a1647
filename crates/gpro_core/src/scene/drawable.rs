//! Drawable units handed from scene authoring to the renderer.

use std::sync::Arc;

use super::Material;
use crate::error::GeometryError;
use crate::geometry::{Aabb, Mesh};
use crate::transform::Transform;

/// One mesh rendered `instance_count` times, each instance with its own
/// transform, all sharing one material and one object-space bounding box.
#[derive(Debug, Clone)]
pub struct DrawableObject {
    mesh: Arc<Mesh>,
    transforms: Vec<Transform>,
    instance_count: u32,
    material: Material,
    bounding_box: Aabb,
}

impl DrawableObject {
    /// Builds a drawable, computing its bounding box from the mesh.
    ///
    /// The instance count is implied by `transforms`; an empty transform
    /// list is refused.
    pub fn new(
        mesh: Arc<Mesh>,
        transforms: Vec<Transform>,
        material: Material,
    ) -> Result<Self, GeometryError> {
        let count = transforms.len() as u32;
        Self::with_instance_count(mesh, transforms, count, material)
    }

    /// Builds a drawable with an explicit instance count, which must match
    /// the number of transforms.
    pub fn with_instance_count(
        mesh: Arc<Mesh>,
        transforms: Vec<Transform>,
        instance_count: u32,
        material: Material,
    ) -> Result<Self, GeometryError> {
        if instance_count == 0 {
            return Err(GeometryError::NoInstances);
        }
        if transforms.len() != instance_count as usize {
            return Err(GeometryError::InstanceMismatch {
                instance_count,
                transforms: transforms.len(),
            });
        }
        let bounding_box =
            Aabb::from_vertices(mesh.vertices()).ok_or(GeometryError::EmptyVertices)?;
        Ok(Self {
            mesh,
            transforms,
            instance_count,
            material,
            bounding_box,
        })
    }

    #[inline]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    #[inline]
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    #[inline]
    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }
}

/// Closed set of things the renderer knows how to batch.
///
/// Only mesh-backed drawables exist today; new kinds are added as variants
/// and the batching code's exhaustive `match` points at every place that
/// must learn about them.
#[derive(Debug, Clone)]
pub enum Drawable {
    Mesh(DrawableObject),
}

impl From<DrawableObject> for Drawable {
    fn from(obj: DrawableObject) -> Self {
        Drawable::Mesh(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives;

    #[test]
    fn bounding_box_comes_from_mesh() {
        let obj = DrawableObject::new(
            Arc::new(primitives::cube()),
            vec![Transform::IDENTITY],
            Material::solid("white", [255; 4]),
        )
        .unwrap();
        assert_eq!(obj.bounding_box(), Aabb::unit_cube());
        assert_eq!(obj.instance_count(), 1);
    }

    #[test]
    fn instance_count_must_match_transforms() {
        let err = DrawableObject::with_instance_count(
            Arc::new(primitives::plane()),
            vec![Transform::IDENTITY; 2],
            3,
            Material::solid("white", [255; 4]),
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::InstanceMismatch { instance_count: 3, transforms: 2 });
    }

    #[test]
    fn zero_instances_are_refused() {
        let err = DrawableObject::new(
            Arc::new(primitives::plane()),
            Vec::new(),
            Material::solid("white", [255; 4]),
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::NoInstances);
    }
}
