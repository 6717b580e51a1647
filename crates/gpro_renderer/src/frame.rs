//! Per-frame uniforms bound at group(0) of every batch pipeline.
//!
//! The frustum buffer is also bound by the culling stage, so a frame's
//! culling and shading read the same planes.

use bytemuck::Zeroable;
use gpro_core::{Camera, CameraUniform, GpuFrustum, Light};

use crate::resources::buffer;

/// Capacity of the light array in the shading pass.
pub const MAX_LIGHTS: usize = 8;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub lights: [Light; MAX_LIGHTS],
    pub count: u32,
    _pad: [u32; 3],
}

impl LightsUniform {
    /// Packs up to [`MAX_LIGHTS`] lights; extra lights are dropped.
    pub fn new(lights: &[Light]) -> Self {
        if lights.len() > MAX_LIGHTS {
            log::warn!("{} lights supplied, only the first {MAX_LIGHTS} are used", lights.len());
        }
        let mut packed = [Light::zeroed(); MAX_LIGHTS];
        let count = lights.len().min(MAX_LIGHTS);
        packed[..count].copy_from_slice(&lights[..count]);
        Self {
            lights: packed,
            count: count as u32,
            _pad: [0; 3],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TimeUniform {
    pub seconds: f32,
    _pad: [f32; 3],
}

pub struct FrameUniforms {
    pub camera: wgpu::Buffer,
    pub frustum: wgpu::Buffer,
    pub lights: wgpu::Buffer,
    pub time: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl FrameUniforms {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera: &Camera,
        lights: &[Light],
    ) -> Self {
        let camera_buf = buffer::create_uniform(device, "camera uniform", &CameraUniform::from_camera(camera));
        let frustum = buffer::create_uniform(device, "frustum uniform", &camera.frustum().to_gpu());
        let lights_buf = buffer::create_uniform(device, "lights uniform", &LightsUniform::new(lights));
        let time = buffer::create_uniform(device, "time uniform", &TimeUniform::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: camera_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: frustum.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: lights_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: time.as_entire_binding() },
            ],
        });

        Self {
            camera: camera_buf,
            frustum,
            lights: lights_buf,
            time,
            bind_group,
        }
    }

    /// Writes the camera matrices and the frustum derived from them.
    pub fn sync_camera(&self, queue: &wgpu::Queue, camera: &Camera) {
        buffer::update_uniform(queue, &self.camera, &CameraUniform::from_camera(camera));
        let frustum: GpuFrustum = camera.frustum().to_gpu();
        buffer::update_uniform(queue, &self.frustum, &frustum);
    }

    pub fn sync_lights(&self, queue: &wgpu::Queue, lights: &[Light]) {
        buffer::update_uniform(queue, &self.lights, &LightsUniform::new(lights));
    }

    pub fn sync_time(&self, queue: &wgpu::Queue, seconds: f32) {
        buffer::update_uniform(queue, &self.time, &TimeUniform { seconds, _pad: [0.0; 3] });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_are_truncated_to_capacity() {
        let many = vec![Light::default(); MAX_LIGHTS + 3];
        let packed = LightsUniform::new(&many);
        assert_eq!(packed.count as usize, MAX_LIGHTS);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 32 * MAX_LIGHTS + 16);
    }

    #[test]
    fn unused_slots_are_zero() {
        let packed = LightsUniform::new(&[Light::default()]);
        assert_eq!(packed.count, 1);
        assert_eq!(packed.lights[1], Light::zeroed());
    }
}
