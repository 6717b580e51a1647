/// Built-in procedural meshes.
///
/// All primitives are centred at the origin, wound counter-clockwise when
/// seen from outside, and built through [`MeshBuilder`] so shared corners
/// are welded.
use glam::{Vec2, Vec3};

use super::{Mesh, MeshBuilder, Vertex};

/// Emits one quad as two triangles.  `u × v` must point along `normal`.
fn push_quad(b: &mut MeshBuilder, centre: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
    let corner = |su: f32, sv: f32, uv: Vec2| {
        Vertex::new(
            (centre + u * su + v * sv).to_array(),
            uv.to_array(),
            normal.to_array(),
        )
    };
    let c0 = corner(-1.0, -1.0, Vec2::new(0.0, 1.0));
    let c1 = corner(1.0, -1.0, Vec2::new(1.0, 1.0));
    let c2 = corner(1.0, 1.0, Vec2::new(1.0, 0.0));
    let c3 = corner(-1.0, 1.0, Vec2::new(0.0, 0.0));
    b.push_triangle(c0, c1, c2);
    b.push_triangle(c2, c3, c0);
}

/// Unit cube spanning `[-1, 1]` on every axis: 24 vertices, 36 indices.
pub fn cube() -> Mesh {
    let mut b = MeshBuilder::new();
    #[rustfmt::skip]
    let faces = [
        // normal      u             v
        (Vec3::Z,     Vec3::X,      Vec3::Y),     // front  (z+)
        (Vec3::NEG_Z, Vec3::NEG_X,  Vec3::Y),     // back   (z-)
        (Vec3::X,     Vec3::NEG_Z,  Vec3::Y),     // right  (x+)
        (Vec3::NEG_X, Vec3::Z,      Vec3::Y),     // left   (x-)
        (Vec3::Y,     Vec3::X,      Vec3::NEG_Z), // top    (y+)
        (Vec3::NEG_Y, Vec3::X,      Vec3::Z),     // bottom (y-)
    ];
    for (n, u, v) in faces {
        push_quad(&mut b, n, u, v, n);
    }
    b.build().expect("cube primitive is well formed")
}

/// Horizontal `2 × 2` plane in the XZ plane facing +Y.
pub fn plane() -> Mesh {
    let mut b = MeshBuilder::new();
    push_quad(&mut b, Vec3::ZERO, Vec3::X, Vec3::NEG_Z, Vec3::Y);
    b.build().expect("plane primitive is well formed")
}

/// Unit UV sphere.  `stacks` and `sectors` are clamped to at least 2 and 3.
pub fn uv_sphere(stacks: u32, sectors: u32) -> Mesh {
    let stacks = stacks.max(2);
    let sectors = sectors.max(3);
    let vertex = |i: u32, j: u32| {
        let theta = std::f32::consts::PI * i as f32 / stacks as f32;
        let phi = std::f32::consts::TAU * j as f32 / sectors as f32;
        let p = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
        Vertex::new(
            p.to_array(),
            [j as f32 / sectors as f32, i as f32 / stacks as f32],
            p.to_array(),
        )
    };

    let mut b = MeshBuilder::new();
    for i in 0..stacks {
        for j in 0..sectors {
            let a = vertex(i, j);
            let bl = vertex(i + 1, j);
            let br = vertex(i + 1, j + 1);
            let d = vertex(i, j + 1);
            // the pole rows collapse one triangle of each quad
            if i + 1 != stacks {
                b.push_triangle(a, br, bl);
            }
            if i != 0 {
                b.push_triangle(a, d, br);
            }
        }
    }
    b.build().expect("sphere primitive is well formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_four_vertices_per_face() {
        let m = cube();
        assert_eq!(m.vertex_count(), 24);
        assert_eq!(m.index_count(), 36);
    }

    #[test]
    fn cube_faces_wind_outwards() {
        let m = cube();
        for tri in m.indices().chunks(3) {
            let p = |i: u32| Vec3::from_array(m.vertices()[i as usize].position);
            let n = Vec3::from_array(m.vertices()[tri[0] as usize].normal);
            let face = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            assert!(face.dot(n) > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let m = uv_sphere(8, 12);
        for v in m.vertices() {
            assert!((Vec3::from_array(v.position).length() - 1.0).abs() < 1e-5);
        }
        assert_eq!(m.index_count() % 3, 0);
    }
}
