/// GPU vertex type used by the batched forward pipeline.
///
/// The layout packs position, texture coordinate and normal contiguously so
/// that `bytemuck` can reinterpret a slice of vertices as bytes.  The matching
/// WGSL attribute locations are declared in `assets/shaders/indirect_phong.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate, `v` pointing down.
    pub uv: [f32; 2],
    /// Object-space normal.
    pub normal: [f32; 3],
}

impl Vertex {
    pub const SIZE: usize = std::mem::size_of::<Vertex>();

    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self { position, uv, normal }
    }

    /// Deduplication key: the bit patterns of all attributes, with `-0.0`
    /// folded into `0.0` so the key agrees with float `==`.
    pub(crate) fn key(&self) -> [u32; 8] {
        // x + 0.0 turns -0.0 into +0.0 and leaves every other value alone
        let bits = |x: f32| (x + 0.0).to_bits();
        let p = self.position;
        let t = self.uv;
        let n = self.normal;
        [
            bits(p[0]),
            bits(p[1]),
            bits(p[2]),
            bits(t[0]),
            bits(t[1]),
            bits(n[0]),
            bits(n[1]),
            bits(n[2]),
        ]
    }

    /// Returns the `VertexBufferLayout` that matches this struct's memory
    /// layout.  Pass this to `wgpu::VertexState::buffers` when building a
    /// render pipeline.
    #[cfg(feature = "gpu")]
    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x3, // position
            1 => Float32x2, // uv
            2 => Float32x3, // normal
        ];
        wgpu::VertexBufferLayout {
            array_stride: Vertex::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}
