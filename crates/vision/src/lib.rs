//! Image feature extraction and model export.
//!
//! The feature extractor wraps a pretrained ONNX embedding model (a
//! classifier with its head removed) behind the [`ImageEmbedder`] trait:
//! normalized image tensor in, fixed-length vector out. The export module
//! packages the same model for deployment as a single bundle file with
//! descriptive metadata.

pub mod config;
pub mod export;
pub mod extractor;
pub mod mock;
pub mod preprocess;

pub use config::{Device, VisionConfig};
pub use export::{export_model, ExportConfig, ModelBundle, ModelMetadata};
pub use extractor::{FeatureExtractor, ImageEmbedder};
pub use mock::MockEmbedder;
