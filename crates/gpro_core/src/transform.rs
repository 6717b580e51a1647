//! Instance transform: translation, Euler rotation, scale.
//!
//! `Transform` is `Copy` and `Default`, making it easy to embed in any
//! struct.  Call `.matrix()` to get the combined model matrix, or convert
//! into [`InstanceTransform`] for upload to the per-instance storage buffer.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Authoring-side transform of one instance.
///
/// # Example
/// ```rust,ignore
/// use gpro_core::Transform;
/// use glam::Vec3;
///
/// let t = Transform::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 90.0, 0.0), Vec3::ONE);
/// let m = t.matrix(); // translate · rotate · scale
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space translation.
    pub translation: Vec3,
    /// Euler angles in **degrees** around X, Y and Z.
    pub rotation: Vec3,
    /// Non-uniform scale factor.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform: no translation, no rotation, uniform scale 1.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self { translation, rotation, scale }
    }

    /// Construct with a world-space translation, identity rotation and scale.
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    /// Construct with a translation and a uniform scale.
    pub fn from_translation_scale(translation: Vec3, scale: f32) -> Self {
        Self {
            translation,
            scale: Vec3::splat(scale),
            ..Self::IDENTITY
        }
    }

    /// Rotation as a quaternion: `Rz · Ry · Rx` of the Euler angles.
    pub fn quat(&self) -> Quat {
        let r = self.rotation * (std::f32::consts::PI / 180.0);
        Quat::from_euler(EulerRot::ZYX, r.z, r.y, r.x)
    }

    /// Build the model matrix (`T · R · S`).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.translation)
    }
}

/// GPU layout of one instance transform: a column-major `mat4x4<f32>`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceTransform {
    pub model: [[f32; 4]; 4],
}

impl InstanceTransform {
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self { model: Mat4::IDENTITY.to_cols_array_2d() }
    }
}

impl From<Transform> for InstanceTransform {
    fn from(t: Transform) -> Self {
        Self { model: t.matrix().to_cols_array_2d() }
    }
}

impl From<Mat4> for InstanceTransform {
    fn from(m: Mat4) -> Self {
        Self { model: m.to_cols_array_2d() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix() {
        let t = Transform::default();
        assert!(t.matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn composition_is_translate_rotate_scale() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 90.0, 0.0),
            Vec3::splat(2.0),
        );
        // scale first: (1,0,0) -> (2,0,0); yaw 90°: -> (0,0,-2); then translate
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn euler_order_applies_x_first() {
        let t = Transform::new(Vec3::ZERO, Vec3::new(90.0, 90.0, 0.0), Vec3::ONE);
        // Rx(90) maps +Y to +Z, then Ry(90) maps +Z to +X
        let p = t.matrix().transform_point3(Vec3::Y);
        assert!((p - Vec3::X).length() < 1e-5);
    }
}
