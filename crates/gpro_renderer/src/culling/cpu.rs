//! Host-side mirror of `frustum_cull.wgsl`.
//!
//! Same test, same writes: every instance's mesh box is moved to world space
//! and checked against the frustum, and its command's `instance_count`
//! becomes 1 or 0.

use gpro_core::{Aabb, Frustum};

use crate::batch::InstanceData;

/// Culls every instance in `instances` against `frustum`, rewriting the
/// instance counts of `instances.commands`.  Returns the visible count.
pub fn cull_on_cpu(frustum: &Frustum, instances: &mut InstanceData) -> u32 {
    let InstanceData {
        transforms,
        aabbs,
        commands,
        instance_map,
    } = instances;

    let mut visible = 0;
    for ((transform, entry), command) in transforms.iter().zip(instance_map.iter()).zip(commands.iter_mut()) {
        let local = Aabb::from(aabbs[entry.aabb as usize]);
        let world = local.transform(&transform.matrix());
        if frustum.intersects_aabb(&world) {
            command.instance_count = 1;
            visible += 1;
        } else {
            command.instance_count = 0;
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;
    use gpro_core::{geometry::primitives, Camera, DrawableObject, Material, Transform};

    use super::*;
    use crate::batch::{Batchable, CpuBatch};

    fn camera() -> Camera {
        Camera {
            position: Vec3::ZERO,
            front: Vec3::NEG_Z,
            fov: 60.0,
            aspect: 1.0,
            znear: 0.1,
            zfar: 100.0,
            ..Camera::default()
        }
    }

    fn instances(positions: &[Vec3]) -> InstanceData {
        let transforms = positions.iter().map(|p| Transform::from_translation(*p)).collect();
        let obj = DrawableObject::new(
            Arc::new(primitives::cube()),
            transforms,
            Material::solid("white", [255; 4]),
        )
        .unwrap();
        let mut data = InstanceData::default();
        obj.append_to(&mut CpuBatch::new(0, 0), &mut data);
        data
    }

    #[test]
    fn outside_instances_are_hidden() {
        let mut data = instances(&[
            Vec3::new(0.0, 0.0, -10.0),  // ahead
            Vec3::new(0.0, 0.0, 10.0),   // behind
            Vec3::new(80.0, 0.0, -10.0), // far right
            Vec3::new(0.0, 0.0, -500.0), // past the far plane
        ]);
        let visible = cull_on_cpu(&camera().frustum(), &mut data);
        assert_eq!(visible, 1);
        let counts: Vec<_> = data.commands.iter().map(|c| c.instance_count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0]);
    }

    #[test]
    fn box_around_camera_is_visible() {
        let mut data = instances(&[Vec3::ZERO]);
        assert_eq!(cull_on_cpu(&camera().frustum(), &mut data), 1);
        assert_eq!(data.commands[0].instance_count, 1);
    }

    #[test]
    fn scale_and_rotation_widen_the_box() {
        // unit cube just outside the right plane, pulled back in by scale
        let mut data = instances(&[Vec3::new(8.0, 0.0, -10.0)]);
        assert_eq!(cull_on_cpu(&camera().frustum(), &mut data), 0);
        data.transforms[0] = Transform::new(
            Vec3::new(8.0, 0.0, -10.0),
            Vec3::new(0.0, 45.0, 0.0),
            Vec3::splat(4.0),
        )
        .into();
        assert_eq!(cull_on_cpu(&camera().frustum(), &mut data), 1);
    }

    #[test]
    fn culling_is_idempotent() {
        let mut data = instances(&[
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(0.0, 50.0, -5.0),
            Vec3::new(-3.0, 0.0, -20.0),
        ]);
        let frustum = camera().frustum();
        let first = cull_on_cpu(&frustum, &mut data);
        let commands = data.commands.clone();
        let second = cull_on_cpu(&frustum, &mut data);
        assert_eq!(first, second);
        assert_eq!(commands, data.commands);
    }
}
