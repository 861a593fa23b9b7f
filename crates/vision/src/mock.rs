use crate::extractor::ImageEmbedder;
use common::{Result, VisionError};
use std::collections::HashMap;
use std::path::Path;

/// Deterministic stand-in for [`crate::FeatureExtractor`] so collector and
/// pipeline tests run without an ONNX model on disk. Vectors are looked up
/// by file name; a missing entry behaves like a failed extraction.
#[derive(Debug, Default, Clone)]
pub struct MockEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dim: Option<usize>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector(mut self, name: &str, vector: Vec<f32>) -> Self {
        self.dim = Some(vector.len());
        self.vectors.insert(name.to_string(), vector);
        self
    }
}

impl ImageEmbedder for MockEmbedder {
    fn embed_file(&self, path: &Path) -> Result<Vec<f32>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.vectors
            .get(&name)
            .cloned()
            .ok_or_else(|| VisionError::Extraction(format!("no mock vector for {name}")))
    }

    fn dim(&self) -> Option<usize> {
        self.dim
    }
}
