use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Compute device for inference. Chosen once at startup and passed into the
/// extractor constructor; there is no process-global device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    Cuda,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Path to the ONNX feature-extractor model
    pub model_path: PathBuf,
    /// Compute device for the inference session
    pub device: Device,
    /// CUDA device id, used when `device` is [`Device::Cuda`]
    pub cuda_device_id: i32,
    /// Intra-op thread count for the session
    pub intra_threads: usize,
    /// Model input name; defaults to the session's first declared input
    pub input_name: Option<String>,
    /// Expected embedding dimensionality, if known up front
    pub embedding_dim: Option<usize>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/resnet50.onnx"),
            device: Device::Cpu,
            cuda_device_id: 0,
            intra_threads: 4,
            input_name: None,
            embedding_dim: Some(2048),
        }
    }
}
