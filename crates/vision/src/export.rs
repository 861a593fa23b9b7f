use crate::config::VisionConfig;
use crate::extractor::FeatureExtractor;
use crate::preprocess;
use common::{Result, VisionError};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Declared input semantics of the exported model: the deployment runtime
/// feeds raw `[0, 255]` pixels, so the bundle records the scale factor and
/// per-channel bias the model expects applied first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    pub shape: [usize; 4],
    pub scale: f32,
    pub bias: [f32; 3],
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub dim: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub short_description: String,
    pub input: InputSpec,
    pub output: OutputSpec,
}

/// Export artifact: the validated model graph plus its metadata, packed
/// into a single self-describing file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub metadata: ModelMetadata,
    pub model: Vec<u8>,
}

impl ModelBundle {
    /// Serialize the bundle to `path` (temp-write-then-rename, parent
    /// directories created if absent).
    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| VisionError::Serialization(e.to_string()))?;
        common::fsutil::write_atomic(path, &bytes)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        bincode::deserialize(&bytes).map_err(|e| VisionError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Source ONNX feature-extractor model
    pub model_path: PathBuf,
    /// Destination bundle file
    pub output_path: PathBuf,
}

/// Validate the feature extractor against a fixed dummy input and package
/// it for deployment.
///
/// The model is loaded through an inference session with full graph
/// optimization, run once on a zero `[1, 3, 224, 224]` tensor to check it
/// produces a flat embedding, then written as one [`ModelBundle`] file.
pub fn export_model(config: &ExportConfig) -> Result<PathBuf> {
    let vision_config = VisionConfig {
        model_path: config.model_path.clone(),
        embedding_dim: None,
        ..VisionConfig::default()
    };
    let extractor = FeatureExtractor::new(&vision_config)
        .map_err(|e| VisionError::Conversion(e.to_string()))?;

    let side = preprocess::INPUT_SIZE as usize;
    let dummy = Array4::<f32>::zeros((1, 3, side, side));
    let embedding = extractor
        .embed_tensor(&dummy)
        .map_err(|e| VisionError::Conversion(format!("validation run failed: {e}")))?;
    let dim = embedding.len();

    let model = fs::read(&config.model_path)?;
    let bundle = ModelBundle {
        metadata: embedding_metadata(dim),
        model,
    };
    bundle.write(&config.output_path)?;

    info!(
        "exported {}-d embedding model to {}",
        dim,
        config.output_path.display()
    );
    Ok(config.output_path.clone())
}

/// Descriptive metadata for an embedding extractor over 224x224 input.
pub fn embedding_metadata(dim: usize) -> ModelMetadata {
    let side = preprocess::INPUT_SIZE as usize;
    ModelMetadata {
        short_description: format!("Image feature extractor (outputs {dim}-d embedding)"),
        input: InputSpec {
            name: "input_image".to_string(),
            shape: [1, 3, side, side],
            scale: 1.0 / 255.0,
            bias: preprocess::MEAN,
            description: format!("Input image of size {side}x{side}"),
        },
        output: OutputSpec {
            name: "embedding".to_string(),
            dim,
            description: format!("{dim}-dimensional image embedding"),
        },
    }
}
