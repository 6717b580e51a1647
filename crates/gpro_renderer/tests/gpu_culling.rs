//! End-to-end checks of the full renderer.  They need an adapter with
//! texture binding arrays, which software adapters usually lack, so they are
//! opt-in: `cargo test -- --ignored`.  Culling alone is covered on any
//! adapter in `culling_stage.rs`.

use std::sync::Arc;

use glam::Vec3;
use gpro_core::{geometry::primitives, DrawableObject, EngineContext, Material, Transform};
use gpro_renderer::{
    cull_on_cpu, CullState, FlushPolicy, Renderer, RendererConfig, OPTIONAL_FEATURES,
    REQUIRED_FEATURES,
};

const SIZE: u32 = 64;

const NEEDS_BINDING_ARRAYS: &str = "needs an adapter with texture binding arrays";

fn renderer(config: RendererConfig) -> Renderer {
    let context = pollster::block_on(EngineContext::new(REQUIRED_FEATURES, OPTIONAL_FEATURES))
        .unwrap_or_else(|err| panic!("{NEEDS_BINDING_ARRAYS}: {err:#}"));
    Renderer::new(
        context,
        SIZE,
        SIZE,
        wgpu::TextureFormat::Rgba8UnormSrgb,
        config,
    )
}

fn target(renderer: &Renderer) -> wgpu::TextureView {
    renderer
        .context
        .device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("test target"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn cubes(positions: &[Vec3]) -> DrawableObject {
    DrawableObject::new(
        Arc::new(primitives::cube()),
        positions.iter().map(|p| Transform::from_translation(*p)).collect(),
        Material::solid("grey", [160, 160, 160, 255]),
    )
    .unwrap()
}

#[test]
#[ignore = "needs an adapter with texture binding arrays"]
fn empty_scene_resolves_without_dispatch() {
    let mut renderer = renderer(RendererConfig::default());
    let view = target(&renderer);
    let stats = renderer.render_frame(&view).unwrap();
    assert_eq!(stats.visible, 0);
    assert_eq!(stats.instances, 0);
    assert_eq!(renderer.cull_state(), CullState::Resolved);
}

#[test]
#[ignore = "needs an adapter with texture binding arrays"]
fn gpu_and_cpu_agree_on_visibility() {
    let mut renderer = renderer(RendererConfig::default());
    // default camera sits at z = -7 looking down +Z
    renderer
        .admit(&cubes(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -20.0),
            Vec3::new(500.0, 0.0, 5.0),
        ]))
        .unwrap();
    renderer.admit(&cubes(&[Vec3::new(2.0, 1.0, 10.0)])).unwrap();

    let view = target(&renderer);
    let stats = renderer.render_frame(&view).unwrap();

    let mut instances = renderer.accumulator().instances().clone();
    let expected = cull_on_cpu(&renderer.camera().frustum(), &mut instances);
    assert_eq!(expected, 2);
    assert_eq!(stats.visible, expected);
    assert_eq!(stats.instances, 4);
    assert_eq!(stats.batches, 1);

    // unchanged inputs give the same answer
    let again = renderer.render_frame(&view).unwrap();
    assert_eq!(again.visible, stats.visible);
}

#[test]
#[ignore = "needs an adapter with texture binding arrays"]
fn deferred_batches_are_drawn_after_flush() {
    let config = RendererConfig {
        flush_policy: FlushPolicy::Deferred,
        batch_byte_budget: primitives::cube().byte_size(),
        ..RendererConfig::default()
    };
    let mut renderer = renderer(config);
    for z in [0.0, 4.0, 8.0] {
        renderer.admit(&cubes(&[Vec3::new(0.0, 0.0, z)])).unwrap();
    }
    let view = target(&renderer);
    let stats = renderer.render_frame(&view).unwrap();
    assert_eq!(stats.batches, 3);
    assert_eq!(stats.instances, 3);
    assert_eq!(stats.visible, 3);
}
