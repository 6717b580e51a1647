/// A compiled compute shader together with the layout it was linked against.
pub struct ComputePipeline {
    pub inner: wgpu::ComputePipeline,
}

impl ComputePipeline {
    /// Compiles `shader_source` (WGSL) and links `entry_point` against
    /// `bind_group_layouts`, in group order.
    pub fn new(
        device: &wgpu::Device,
        shader_source: &str,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        entry_point: &str,
        label: &str,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} shader")),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} layout")),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let inner = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(entry_point),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self { inner }
    }
}
