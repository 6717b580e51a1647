/// Axis-aligned bounding boxes.
///
/// A box is computed once per mesh from its vertex positions and never
/// changes afterwards.  Per-instance world boxes are derived on the fly by
/// [`Aabb::transform`], on the CPU here and in `frustum_cull.wgsl` on the GPU.
use glam::{Mat4, Vec3};

use super::Vertex;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Creates an AABB from `min`/`max` corners.
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates a unit-cube AABB (fits the built-in cube mesh).
    #[inline]
    pub fn unit_cube() -> Self {
        Self { min: Vec3::splat(-1.0), max: Vec3::splat(1.0) }
    }

    /// Per-axis min/max reduction over `points`.  Returns `None` for an empty
    /// set.
    ///
    /// `min`/`max` are commutative, so any permutation of the same points
    /// produces the same box.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self::new(p, p),
                Some(b) => Self::new(b.min.min(p), b.max.max(p)),
            })
        })
    }

    /// Bounding box of the vertex positions of a mesh.
    pub fn from_vertices(vertices: &[Vertex]) -> Option<Self> {
        Self::from_points(vertices.iter().map(|v| Vec3::from_array(v.position)))
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Returns a new AABB enclosing this box after `transform`.
    ///
    /// Transforms the centre and rotates the half-extents through the
    /// absolute value of the upper-left 3×3 (Arvo 1990), which is exact for
    /// the enclosing box of all eight transformed corners.
    pub fn transform(&self, transform: &Mat4) -> Self {
        let half = self.half_extents();
        let new_centre = transform.transform_point3(self.center());

        let m = transform.to_cols_array_2d();
        let new_half = Vec3::new(
            half.x * m[0][0].abs() + half.y * m[1][0].abs() + half.z * m[2][0].abs(),
            half.x * m[0][1].abs() + half.y * m[1][1].abs() + half.z * m[2][1].abs(),
            half.x * m[0][2].abs() + half.y * m[1][2].abs() + half.z * m[2][2].abs(),
        );

        Self {
            min: new_centre - new_half,
            max: new_centre + new_half,
        }
    }
}

/// GPU layout of an [`Aabb`]: two `vec4<f32>` so each corner starts on a
/// 16-byte boundary in the storage buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuAabb {
    pub min: [f32; 4],
    pub max: [f32; 4],
}

impl From<Aabb> for GpuAabb {
    fn from(b: Aabb) -> Self {
        Self {
            min: b.min.extend(0.0).to_array(),
            max: b.max.extend(0.0).to_array(),
        }
    }
}

impl From<GpuAabb> for Aabb {
    fn from(b: GpuAabb) -> Self {
        Self {
            min: Vec3::new(b.min[0], b.min[1], b.min[2]),
            max: Vec3::new(b.max[0], b.max[1], b.max[2]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<Vec3> {
        vec![
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-4.0, 5.0, 0.5),
            Vec3::new(0.0, 0.0, -6.0),
            Vec3::new(2.5, 1.0, 1.0),
        ]
    }

    #[test]
    fn reduction_picks_component_extremes() {
        let b = Aabb::from_points(points()).unwrap();
        assert_eq!(b.min, Vec3::new(-4.0, -2.0, -6.0));
        assert_eq!(b.max, Vec3::new(2.5, 5.0, 3.0));
    }

    #[test]
    fn reduction_is_order_independent() {
        let reference = Aabb::from_points(points()).unwrap();
        let mut pts = points();
        pts.reverse();
        assert_eq!(Aabb::from_points(pts.clone()).unwrap(), reference);
        pts.swap(0, 2);
        assert_eq!(Aabb::from_points(pts.clone()).unwrap(), reference);
        pts.rotate_left(1);
        assert_eq!(Aabb::from_points(pts).unwrap(), reference);
    }

    #[test]
    fn empty_set_has_no_box() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn all_negative_points_keep_negative_max() {
        let b = Aabb::from_points([Vec3::splat(-3.0), Vec3::splat(-2.0)]).unwrap();
        assert_eq!(b.max, Vec3::splat(-2.0));
    }

    #[test]
    fn transform_translates_and_scales() {
        let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let b = Aabb::unit_cube().transform(&m);
        assert!((b.min - Vec3::new(8.0, -2.0, -2.0)).length() < 1e-5);
        assert!((b.max - Vec3::new(12.0, 2.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn rotated_box_grows_to_enclose_corners() {
        let m = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let b = Aabb::unit_cube().transform(&m);
        let r = std::f32::consts::SQRT_2;
        assert!((b.max.x - r).abs() < 1e-5);
        assert!((b.max.y - 1.0).abs() < 1e-5);
    }
}
