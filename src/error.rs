//
// error.rs
// EOTRH-Score-rs
//
// Error taxonomy separating whole-request failures from per-ROI failures that the
// orchestrator isolates into detail records.
//

use thiserror::Error;

/// Whole-request failures. Once one of these occurs no ROI can be analyzed; the
/// orchestrator reports them inside the outcome instead of propagating a panic.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode radiograph: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("entropy backend is not available")]
    BackendUnavailable,
}

/// Failures local to a single ROI. These are caught at the orchestrator boundary
/// and never affect the processing of other ROIs.
#[derive(Debug, Error)]
pub enum RoiFailure {
    #[error("region produced no pixels after rasterization")]
    EmptyRegion,

    #[error("failed to resize region grid: {0}")]
    Resize(String),

    #[error("normalized region contains non-finite values")]
    NonFiniteGrid,

    #[error("entropy computation failed: {0}")]
    Entropy(#[from] EntropyError),
}

/// Failures raised by an entropy backend.
#[derive(Debug, Error)]
pub enum EntropyError {
    #[error("{rows}x{cols} grid is too small for {m}x{m} templates with delay {tau}")]
    GridTooSmall {
        rows: usize,
        cols: usize,
        m: usize,
        tau: usize,
    },

    #[error("distribution entropy evaluated to a non-finite value")]
    NonFinite,
}

/// Rejections produced while validating raw ROI input at the crate boundary,
/// before any pipeline work starts.
#[derive(Debug, Error)]
pub enum RoiInputError {
    #[error("ROI data must be a JSON array of polygons: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("polygon {index} has {count} vertices; at least 3 are required")]
    TooFewVertices { index: usize, count: usize },
}
