//! Perspective camera and its view frustum.
//!
//! The camera lives in core so both the application (which drives it from
//! input) and the renderer (which uploads it and culls against it) can use
//! it; GPU buffers stay in the renderer.
//!
//! ## Frustum planes
//!
//! Given the combined `view_proj` matrix `M`, the six frustum planes can be
//! extracted analytically (Gribb-Hartmann).  Each plane is stored as
//! `Vec4(nx, ny, nz, d)` in world space with `dot(n, p) + d >= 0` for points
//! on the visible side.  For an AABB to be completely outside one plane it is
//! sufficient that its *positive vertex* (the corner farthest along the
//! plane normal) has a negative signed distance.

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::geometry::Aabb;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    // --- view parameters --------------------------------------------------
    pub position: Vec3,
    /// Look direction at zero yaw/pitch.
    pub front: Vec3,
    pub up: Vec3,
    /// Rotation around `up`, degrees.
    pub yaw: f32,
    /// Elevation, degrees, clamped to ±89 by the controller.
    pub pitch: f32,
    // --- projection parameters --------------------------------------------
    /// Vertical field of view, degrees.
    pub fov: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -7.0),
            front: Vec3::Z,
            up: Vec3::Y,
            yaw: 0.0,
            pitch: 0.0,
            fov: 45.0,
            aspect: 1.0,
            znear: 0.1,
            zfar: 30000.0,
        }
    }
}

impl Camera {
    /// Current look direction (unit length).
    pub fn look_direction(&self) -> Vec3 {
        let up = self.up.normalize_or_zero();
        let yawed = Quat::from_axis_angle(up, self.yaw.to_radians()) * self.front;
        let right = yawed.cross(up).normalize_or_zero();
        if right == Vec3::ZERO {
            return yawed.normalize_or_zero();
        }
        (Quat::from_axis_angle(right, self.pitch.to_radians()) * yawed).normalize_or_zero()
    }

    /// Right vector in world space, perpendicular to look direction and up.
    pub fn right(&self) -> Vec3 {
        self.look_direction().cross(self.up).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.look_direction(), self.up)
    }

    /// Right-handed projection with wgpu's `[0, 1]` depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.znear, self.zfar)
    }

    /// Build the combined view-projection matrix from the current parameters.
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update aspect ratio when viewport dimensions change.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_proj(&self.build_view_projection_matrix())
    }
}

/// Camera data uploaded to the shading pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    /// World-space eye position; `w` is unused.
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 4],
        }
    }

    pub fn from_camera(camera: &Camera) -> Self {
        let mut u = Self::new();
        u.update(camera);
        u
    }

    pub fn update(&mut self, camera: &Camera) {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        self.view = view.to_cols_array_2d();
        self.projection = projection.to_cols_array_2d();
        self.view_proj = (projection * view).to_cols_array_2d();
        self.position = camera.position.extend(1.0).to_array();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Six clip planes: left, right, bottom, top, near, far.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extracts the six frustum planes from `view_proj` (column-major).
    pub fn from_view_proj(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d(); // m[col][row]
        let row = |r: usize| Vec4::new(m[0][r], m[1][r], m[2][r], m[3][r]);

        let r0 = row(0);
        let r1 = row(1);
        let r2 = row(2);
        let r3 = row(3);

        // near is r2 alone because wgpu clip depth is [0, w]
        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near
            r3 - r2, // far
        ];

        for p in &mut planes {
            let len = p.truncate().length();
            if len > 1e-6 {
                *p /= len;
            }
        }

        Self { planes }
    }

    #[inline]
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// Signed distance of `p` to plane `i`; positive on the visible side.
    #[inline]
    pub fn distance(&self, i: usize, p: Vec3) -> f32 {
        self.planes[i].truncate().dot(p) + self.planes[i].w
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        (0..6).all(|i| self.distance(i, p) >= 0.0)
    }

    /// Returns `true` if the AABB **might** be visible (conservative, no
    /// false negatives).
    #[inline]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            let px = if plane.x >= 0.0 { aabb.max.x } else { aabb.min.x };
            let py = if plane.y >= 0.0 { aabb.max.y } else { aabb.min.y };
            let pz = if plane.z >= 0.0 { aabb.max.z } else { aabb.min.z };

            if plane.x * px + plane.y * py + plane.z * pz + plane.w < 0.0 {
                return false;
            }
        }
        true
    }

    pub fn to_gpu(&self) -> GpuFrustum {
        GpuFrustum { planes: self.planes.map(|p| p.to_array()) }
    }
}

/// GPU layout of a [`Frustum`] (uniform buffer, six `vec4<f32>`).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuFrustum {
    pub planes: [[f32; 4]; 6],
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Symmetric pyramid at the origin looking down -Z: fov 90°, near 1, far 100.
    fn camera() -> Camera {
        Camera {
            position: Vec3::ZERO,
            front: Vec3::NEG_Z,
            fov: 90.0,
            aspect: 1.0,
            znear: 1.0,
            zfar: 100.0,
            ..Camera::default()
        }
    }

    #[test]
    fn look_direction_follows_yaw_and_pitch() {
        let mut cam = camera();
        assert!((cam.look_direction() - Vec3::NEG_Z).length() < 1e-5);
        cam.yaw = 90.0;
        // yawing left from -Z turns towards -X
        assert!((cam.look_direction() - Vec3::NEG_X).length() < 1e-5);
        cam.yaw = 0.0;
        cam.pitch = 89.0;
        assert!(cam.look_direction().y > 0.99);
    }

    #[test]
    fn planes_bound_the_pyramid() {
        let f = camera().frustum();
        assert!(f.contains_point(Vec3::new(0.0, 0.0, -50.0)));
        // 45° half-angle: at depth 10 the side planes sit at |x| = 10
        assert!(f.contains_point(Vec3::new(9.9, 0.0, -10.0)));
        assert!(!f.contains_point(Vec3::new(10.1, 0.0, -10.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -0.5)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -101.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn aabb_test_is_conservative() {
        let f = camera().frustum();
        // box straddling the right plane
        let b = Aabb::new(Vec3::new(9.0, -1.0, -11.0), Vec3::new(12.0, 1.0, -9.0));
        assert!(f.intersects_aabb(&b));
        // box around the eye
        assert!(f.intersects_aabb(&Aabb::new(Vec3::splat(-2.0), Vec3::splat(2.0))));
        // box entirely behind the camera
        let behind = Aabb::new(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 12.0));
        assert!(!f.intersects_aabb(&behind));
        // box beyond the far plane
        let far = Aabb::new(Vec3::new(-1.0, -1.0, -300.0), Vec3::new(1.0, 1.0, -200.0));
        assert!(!f.intersects_aabb(&far));
    }

    #[test]
    fn uniform_carries_view_projection() {
        let cam = camera();
        let u = CameraUniform::from_camera(&cam);
        let vp = Mat4::from_cols_array_2d(&u.view_proj);
        assert!(vp.abs_diff_eq(cam.build_view_projection_matrix(), 1e-6));
        assert_eq!(u.position, [0.0, 0.0, 0.0, 1.0]);
    }
}
