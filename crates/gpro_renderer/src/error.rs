use thiserror::Error;

/// Failures of the GPU side of the pipeline.
///
/// Every variant is fatal for the frame loop; nothing here is retried.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create {label}: {reason}")]
    ResourceCreation { label: String, reason: String },

    #[error("{label} needs {size} bytes but the device allows at most {max}")]
    BufferTooLarge { label: String, size: u64, max: u64 },

    #[error("GPU readback failed: {0}")]
    Readback(String),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl RenderError {
    pub(crate) fn creation(label: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResourceCreation {
            label: label.into(),
            reason: reason.to_string(),
        }
    }
}
