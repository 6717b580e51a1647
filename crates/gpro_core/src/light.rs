/// A point light as uploaded to the shading pass.
///
/// Both fields are padded to `vec4` so an array of lights has the same
/// layout in a WGSL uniform block.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Light {
    /// World-space position; `w` is ignored.
    pub position: [f32; 4],
    /// Linear RGB intensity; `w` is ignored.
    pub color: [f32; 4],
}

impl Light {
    pub fn new(position: glam::Vec3, color: glam::Vec3) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            color: color.extend(1.0).to_array(),
        }
    }
}

impl Default for Light {
    /// Dim white light five units above the origin.
    fn default() -> Self {
        Self::new(glam::Vec3::new(0.0, 5.0, 0.0), glam::Vec3::splat(0.4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_two_vec4() {
        assert_eq!(std::mem::size_of::<Light>(), 32);
        let l = Light::default();
        assert_eq!(l.position, [0.0, 5.0, 0.0, 1.0]);
        assert_eq!(l.color[..3], [0.4, 0.4, 0.4]);
    }
}
