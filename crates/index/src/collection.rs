use common::{Result, VisionError};
use serde::{Deserialize, Serialize};

/// Ordered sequence of `(identifier, embedding vector)` pairs.
///
/// Insertion order is preserved: downstream index results refer to entries
/// by position, not by identifier. All vectors share one dimensionality,
/// pinned by the first push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingCollection {
    ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Fails if the vector is empty or its length differs
    /// from the collection's pinned dimensionality.
    pub fn push(&mut self, id: String, vector: Vec<f32>) -> Result<()> {
        if vector.is_empty() {
            return Err(VisionError::Index(format!("empty embedding vector for `{id}`")));
        }
        if let Some(dim) = self.dim() {
            if vector.len() != dim {
                return Err(VisionError::Index(format!(
                    "embedding dimension mismatch for `{id}`: expected {dim}, got {}",
                    vector.len()
                )));
            }
        }

        self.ids.push(id);
        self.vectors.push(vector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Shared vector length, or `None` while the collection is empty.
    pub fn dim(&self) -> Option<usize> {
        self.vectors.first().map(|v| v.len())
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn get(&self, position: usize) -> Option<(&str, &[f32])> {
        let id = self.ids.get(position)?;
        let vector = self.vectors.get(position)?;
        Some((id.as_str(), vector.as_slice()))
    }
}
