//! Procedural scene description: a list of primitives read from the
//! `[scene]` table and turned into solid-colour drawables.

use std::sync::Arc;

use gpro_core::glam::Vec3;
use gpro_core::{geometry::primitives, DrawableObject, GeometryError, Material, Mesh, Scene, Transform};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Cube,
    Plane,
    Sphere,
}

impl Primitive {
    fn mesh(self) -> Mesh {
        match self {
            Primitive::Cube => primitives::cube(),
            Primitive::Plane => primitives::plane(),
            Primitive::Sphere => primitives::uv_sphere(16, 32),
        }
    }
}

/// One authored object: `instances` copies of a primitive, the k-th one
/// offset by `k * spacing` from `position`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObjectDesc {
    pub name: String,
    pub primitive: Primitive,
    pub position: [f32; 3],
    /// Euler angles in degrees.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub instances: u32,
    pub spacing: [f32; 3],
    /// sRGB bytes.
    pub color: [u8; 4],
}

impl Default for ObjectDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            primitive: Primitive::Cube,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            instances: 1,
            spacing: [3.0, 0.0, 0.0],
            color: [200, 200, 200, 255],
        }
    }
}

impl ObjectDesc {
    pub fn build(&self) -> Result<DrawableObject, GeometryError> {
        let origin = Vec3::from_array(self.position);
        let spacing = Vec3::from_array(self.spacing);
        let rotation = Vec3::from_array(self.rotation);
        let scale = Vec3::from_array(self.scale);
        let transforms = (0..self.instances)
            .map(|k| Transform::new(origin + spacing * k as f32, rotation, scale))
            .collect();
        let material = Material::solid(format!("{} colour", self.name), self.color);
        DrawableObject::with_instance_count(
            Arc::new(self.primitive.mesh()),
            transforms,
            self.instances,
            material,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub objects: Vec<ObjectDesc>,
}

impl Default for SceneDescription {
    /// A floor, a row of cubes and a sphere in front of the default camera.
    fn default() -> Self {
        Self {
            objects: vec![
                ObjectDesc {
                    name: "floor".into(),
                    primitive: Primitive::Plane,
                    position: [0.0, -1.5, 10.0],
                    scale: [20.0, 1.0, 20.0],
                    color: [90, 110, 90, 255],
                    ..ObjectDesc::default()
                },
                ObjectDesc {
                    name: "cubes".into(),
                    position: [-6.0, 0.0, 6.0],
                    instances: 5,
                    color: [200, 80, 60, 255],
                    ..ObjectDesc::default()
                },
                ObjectDesc {
                    name: "sphere".into(),
                    primitive: Primitive::Sphere,
                    position: [0.0, 2.0, 12.0],
                    scale: [1.5; 3],
                    color: [70, 120, 220, 255],
                    ..ObjectDesc::default()
                },
            ],
        }
    }
}

impl SceneDescription {
    /// Adds every valid entry to `scene`.  Entries that fail to build or
    /// reuse an existing name are logged and skipped.  Returns how many were
    /// added.
    pub fn populate(&self, scene: &mut Scene) -> usize {
        let mut added = 0;
        for desc in &self.objects {
            let drawable = match desc.build() {
                Ok(d) => d,
                Err(err) => {
                    log::warn!("scene: skipping {:?}: {err}", desc.name);
                    continue;
                }
            };
            let inserted = if desc.name.is_empty() {
                scene.add(drawable);
                true
            } else {
                scene.add_named(desc.name.as_str(), drawable).is_some()
            };
            if inserted {
                added += 1;
            } else {
                log::warn!("scene: skipping duplicate name {:?}", desc.name);
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_are_spaced_along_x() {
        let desc = ObjectDesc {
            position: [1.0, 2.0, 3.0],
            instances: 3,
            ..ObjectDesc::default()
        };
        let obj = desc.build().unwrap();
        assert_eq!(obj.instance_count(), 3);
        let xs: Vec<f32> = obj.transforms().iter().map(|t| t.translation.x).collect();
        assert_eq!(xs, vec![1.0, 4.0, 7.0]);
        assert!(obj.transforms().iter().all(|t| t.translation.y == 2.0));
    }

    #[test]
    fn zero_instances_is_refused() {
        let desc = ObjectDesc {
            instances: 0,
            ..ObjectDesc::default()
        };
        assert_eq!(desc.build().unwrap_err(), GeometryError::NoInstances);
    }

    #[test]
    fn invalid_and_duplicate_entries_are_skipped() {
        let description = SceneDescription {
            objects: vec![
                ObjectDesc {
                    name: "a".into(),
                    ..ObjectDesc::default()
                },
                ObjectDesc {
                    name: "b".into(),
                    instances: 0,
                    ..ObjectDesc::default()
                },
                ObjectDesc {
                    name: "a".into(),
                    primitive: Primitive::Sphere,
                    ..ObjectDesc::default()
                },
                ObjectDesc::default(),
            ],
        };
        let mut scene = Scene::new();
        assert_eq!(description.populate(&mut scene), 2);
        assert_eq!(scene.len(), 2);
        assert!(scene.find("a").is_some());
        assert!(scene.find("b").is_none());
    }

    #[test]
    fn default_scene_builds() {
        let mut scene = Scene::new();
        let description = SceneDescription::default();
        assert_eq!(description.populate(&mut scene), description.objects.len());
        assert_eq!(scene.pending_count(), scene.len());
    }

    #[test]
    fn parses_from_toml() {
        let description: SceneDescription = toml::from_str(
            r#"
            [[objects]]
            name = "ball"
            primitive = "sphere"
            color = [255, 0, 0, 255]
            instances = 2
            spacing = [0.0, 0.0, 4.0]
            "#,
        )
        .unwrap();
        let obj = &description.objects[0];
        assert_eq!(obj.primitive, Primitive::Sphere);
        assert_eq!(obj.scale, [1.0; 3]);
        assert_eq!(obj.build().unwrap().transforms()[1].translation.z, 4.0);
    }
}
