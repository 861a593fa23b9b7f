use crate::collection::EmbeddingCollection;
use common::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One search hit: position of the stored vector in the source collection
/// plus its cosine distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Brute-force cosine nearest-neighbor index.
///
/// Built once from a full collection and read-only afterwards; every query
/// computes the distance to every stored vector (no pruning). Serializable,
/// so a persisted index is query-ready on reload without recomputation.
///
/// Querying with a vector that is itself stored returns that vector's own
/// position at distance 0 as the first hit. Callers wanting k genuine
/// neighbors of a stored vector must request k + 1 and skip the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BruteForceIndex {
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
    dim: usize,
}

impl BruteForceIndex {
    /// Build the index over the collection's vectors. Fails on an empty
    /// collection.
    pub fn build(collection: &EmbeddingCollection) -> Result<Self> {
        let dim = collection.dim().ok_or_else(|| {
            VisionError::Index("cannot build an index over an empty collection".to_string())
        })?;

        let vectors = collection.vectors().to_vec();
        let norms = vectors.iter().map(|v| l2_norm(v)).collect();

        Ok(Self { vectors, norms, dim })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return the `k` stored vectors closest to `query`, ascending by
    /// cosine distance; ties keep insertion order. Requires
    /// `1 <= k <= len` and a query of the stored dimensionality.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(VisionError::Index(format!(
                "query dimension mismatch: expected {}, got {}",
                self.dim,
                query.len()
            )));
        }
        if k == 0 || k > self.len() {
            return Err(VisionError::Index(format!(
                "neighbor count {k} out of range for an index of {} vectors",
                self.len()
            )));
        }

        let query_norm = l2_norm(query);
        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .zip(&self.norms)
            .enumerate()
            .map(|(position, (vector, &norm))| Neighbor {
                position,
                distance: cosine_distance(query, query_norm, vector, norm),
            })
            .collect();

        // Stable sort: equal distances keep insertion order.
        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}

/// Cosine distance `1 - a.b / (|a||b|)`, clamped to `[0, 2]`. Zero-norm
/// vectors have no direction and compare at distance 1.
fn cosine_distance(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (1.0 - dot / (norm_a * norm_b)).clamp(0.0, 2.0)
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
