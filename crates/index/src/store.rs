use crate::collection::EmbeddingCollection;
use crate::knn::BruteForceIndex;
use common::{Result, VisionError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Artifact holding identifiers and vectors.
pub const EMBEDDINGS_FILE: &str = "embeddings.bin";
/// Artifact holding the query-ready index.
pub const INDEX_FILE: &str = "nn_index.bin";

/// Persist the collection and its index as two artifacts under `out_dir`
/// (created if absent). Each file is written through a temp file and
/// renamed into place, so an existing artifact is never left partially
/// overwritten. Returns the two artifact paths.
pub fn save_artifacts(
    out_dir: &Path,
    collection: &EmbeddingCollection,
    index: &BruteForceIndex,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(out_dir)?;

    let embeddings_path = out_dir.join(EMBEDDINGS_FILE);
    write_bincode(&embeddings_path, collection)?;

    let index_path = out_dir.join(INDEX_FILE);
    write_bincode(&index_path, index)?;

    info!(
        "saved {} embeddings and index to {}",
        collection.len(),
        out_dir.display()
    );
    Ok((embeddings_path, index_path))
}

pub fn load_collection(path: &Path) -> Result<EmbeddingCollection> {
    read_bincode(path)
}

pub fn load_index(path: &Path) -> Result<BruteForceIndex> {
    read_bincode(path)
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes =
        bincode::serialize(value).map_err(|e| VisionError::Serialization(e.to_string()))?;
    common::fsutil::write_atomic(path, &bytes)?;
    Ok(())
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    bincode::deserialize(&bytes).map_err(|e| VisionError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (EmbeddingCollection, BruteForceIndex) {
        let mut collection = EmbeddingCollection::new();
        collection.push("a.jpg".into(), vec![1.0, 0.0, 0.0]).unwrap();
        collection.push("b.png".into(), vec![0.0, 1.0, 0.0]).unwrap();
        collection.push("c.jpeg".into(), vec![0.6, 0.8, 0.0]).unwrap();
        let index = BruteForceIndex::build(&collection).unwrap();
        (collection, index)
    }

    #[test]
    fn round_trip_reproduces_collection_and_query_results() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("models");
        let (collection, index) = sample();

        let (embeddings_path, index_path) =
            save_artifacts(&out, &collection, &index).unwrap();

        let loaded_collection = load_collection(&embeddings_path).unwrap();
        assert_eq!(loaded_collection, collection);

        let loaded_index = load_index(&index_path).unwrap();
        let probe = [0.6f32, 0.8, 0.0];
        assert_eq!(
            loaded_index.search(&probe, 3).unwrap(),
            index.search(&probe, 3).unwrap()
        );
    }

    #[test]
    fn creates_output_directory_if_absent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deeply/nested/models");
        let (collection, index) = sample();

        save_artifacts(&out, &collection, &index).unwrap();

        assert!(out.join(EMBEDDINGS_FILE).exists());
        assert!(out.join(INDEX_FILE).exists());
    }

    #[test]
    fn overwrites_previous_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_path_buf();
        let (collection, index) = sample();
        save_artifacts(&out, &collection, &index).unwrap();

        let mut smaller = EmbeddingCollection::new();
        smaller.push("only.jpg".into(), vec![1.0, 1.0]).unwrap();
        let smaller_index = BruteForceIndex::build(&smaller).unwrap();
        save_artifacts(&out, &smaller, &smaller_index).unwrap();

        let loaded = load_collection(&out.join(EMBEDDINGS_FILE)).unwrap();
        assert_eq!(loaded, smaller);
        assert_eq!(load_index(&out.join(INDEX_FILE)).unwrap().len(), 1);
    }

    #[test]
    fn corrupt_artifact_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EMBEDDINGS_FILE);
        fs::write(&path, b"\xff\xff\xff\xff").unwrap();

        let err = load_collection(&path).unwrap_err();
        assert!(matches!(err, VisionError::Serialization(_)));
    }
}
