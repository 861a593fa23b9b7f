use crate::config::{Device, VisionConfig};
use crate::preprocess;
use common::{Result, VisionError};
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use ort::inputs;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Image-to-embedding contract used by the batch collector. Implemented by
/// the real ONNX extractor and by [`crate::MockEmbedder`] in tests.
pub trait ImageEmbedder {
    /// Decode and preprocess `path`, then compute its embedding vector.
    fn embed_file(&self, path: &Path) -> Result<Vec<f32>>;

    /// Expected embedding dimensionality, if known up front.
    fn dim(&self) -> Option<usize>;
}

/// Pretrained feature extractor backed by an ONNX Runtime session.
///
/// The session is inference-only and deterministic for fixed weights; the
/// compute device is fixed at construction from the config.
#[derive(Debug)]
pub struct FeatureExtractor {
    session: Mutex<Session>,
    input_name: String,
    dim: Option<usize>,
}

impl FeatureExtractor {
    pub fn new(config: &VisionConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(VisionError::ModelLoad(format!(
                "model file not found: {}",
                config.model_path.display()
            )));
        }

        let session = build_session(config)
            .map_err(|e| VisionError::ModelLoad(e.to_string()))?;

        let input_name = match &config.input_name {
            Some(name) => name.clone(),
            None => session
                .inputs
                .first()
                .map(|input| input.name.clone())
                .ok_or_else(|| {
                    VisionError::ModelLoad("model declares no inputs".to_string())
                })?,
        };

        info!(
            "loaded feature extractor {} (input `{}`, {} outputs)",
            config.model_path.display(),
            input_name,
            session.outputs.len()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            dim: config.embedding_dim,
        })
    }

    /// Run the extractor on a preprocessed `[1, 3, 224, 224]` tensor and
    /// return the flat embedding vector.
    pub fn embed_tensor(&self, tensor: &Array4<f32>) -> Result<Vec<f32>> {
        let s = tensor.shape();
        let shape = [s[0], s[1], s[2], s[3]];
        let data: Vec<f32> = tensor.iter().copied().collect();

        let input = Tensor::from_array((shape, data))
            .map_err(|e| VisionError::Extraction(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VisionError::Extraction("session lock poisoned".to_string()))?;

        let outputs = session
            .run(inputs![self.input_name.as_str() => input])
            .map_err(|e| VisionError::Extraction(e.to_string()))?;

        // The embedding is the first float output of shape [1, D]; some
        // exports keep trailing singleton spatial dims ([1, D, 1, 1]).
        for (_name, output) in outputs.iter() {
            if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
                let dims: Vec<i64> = (0..shape.len()).map(|i| shape[i]).collect();

                let flat = match dims.as_slice() {
                    [1, d] if *d > 0 => Some(*d as usize),
                    [1, d, 1, 1] if *d > 0 => Some(*d as usize),
                    _ => None,
                };

                if let Some(d) = flat {
                    if let Some(expected) = self.dim {
                        if d != expected {
                            return Err(VisionError::Extraction(format!(
                                "embedding dimension mismatch: expected {expected}, model produced {d}"
                            )));
                        }
                    }
                    debug!("extracted {d}-dim embedding");
                    return Ok(data.to_vec());
                }
            }
        }

        Err(VisionError::Extraction(
            "model produced no [1, D] float output".to_string(),
        ))
    }
}

impl ImageEmbedder for FeatureExtractor {
    fn embed_file(&self, path: &Path) -> Result<Vec<f32>> {
        let img = preprocess::load_image(path)?;
        let tensor = preprocess::image_to_tensor(&img);
        self.embed_tensor(&tensor)
    }

    fn dim(&self) -> Option<usize> {
        self.dim
    }
}

fn build_session(config: &VisionConfig) -> std::result::Result<Session, ort::Error> {
    ort::init().with_name("imgvec").commit()?;

    let builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(config.intra_threads)?;

    #[cfg(feature = "gpu")]
    let builder = if config.device == Device::Cuda {
        use ort::execution_providers::CUDAExecutionProvider;
        let provider = CUDAExecutionProvider::default()
            .with_device_id(config.cuda_device_id)
            .build();
        info!("using CUDA execution provider (device {})", config.cuda_device_id);
        builder.with_execution_providers([provider])?
    } else {
        builder
    };

    #[cfg(not(feature = "gpu"))]
    if config.device == Device::Cuda {
        warn!("CUDA requested but this build has no GPU support, running on CPU");
    }

    builder.commit_from_file(&config.model_path)
}
