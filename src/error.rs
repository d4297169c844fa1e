// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the inference library.

use thiserror::Error;

/// Result type alias for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Main error type for the inference library.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Error loading the ONNX model.
    #[error("Model load error: {0}")]
    ModelLoad(String),
    /// Error during model inference.
    #[error("Inference error: {0}")]
    Inference(String),
    /// Error decoding or converting images.
    #[error("Image error: {0}")]
    Image(String),
    /// Error parsing model metadata.
    #[error("Metadata error: {0}")]
    Metadata(String),
    /// Model output could not be decoded.
    #[error("Post-processing error: {0}")]
    PostProcessing(String),
    /// Output record could not be encoded.
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<image::ImageError> for InferenceError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err.to_string())
    }
}
