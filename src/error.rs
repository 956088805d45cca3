use serde_json::json;

/// Errors produced while analysing one image.
///
/// A detection either succeeds completely or fails with one of these; no
/// partial visualizations are ever returned next to an error.
#[derive(Debug, thiserror::Error)]
pub enum ContourError {
    /// The raster (or serialized contour data) is malformed or empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value is out of range or unknown.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The border tracer detected an inconsistent labelling.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContourError {
    /// Structured failure handed to the boundary layer: `{"error": "<message>"}`.
    pub fn to_json(&self) -> serde_json::Value {
        json!({ "error": self.to_string() })
    }
}

pub type Result<T> = std::result::Result<T, ContourError>;
