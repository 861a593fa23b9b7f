use std::path::PathBuf;
use thiserror::Error;

/// Error hierarchy for the imgvec pipelines.
///
/// Every variant is fatal to the run: neither pipeline retries or persists
/// partial results, failures surface to the caller unmodified.
#[derive(Error, Debug)]
pub enum VisionError {
    /// Unreadable or corrupt image file
    #[error("failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Feature computation failure, including output shape mismatch
    #[error("feature extraction failed: {0}")]
    Extraction(String),

    /// Model could not be loaded into an inference session
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Malformed or mismatched index query, or an unbuildable index
    #[error("index error: {0}")]
    Index(String),

    /// Trace/convert failure in the export step
    #[error("model conversion failed: {0}")]
    Conversion(String),

    /// Input directory contained no recognized image files
    #[error("no images found in {dir}")]
    NoImages { dir: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact encode/decode failure
    #[error("serialization error: {0}")]
    Serialization(String),
}
