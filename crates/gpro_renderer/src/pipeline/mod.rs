pub mod compute;
pub mod layout;
pub mod render;

pub use compute::ComputePipeline;
pub use layout::FrameLayouts;
pub use render::BatchPipeline;
