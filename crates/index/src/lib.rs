//! Embedding collection, brute-force nearest-neighbor search, and artifact
//! persistence for the indexing pipeline.

pub mod collect;
pub mod collection;
pub mod knn;
pub mod store;

pub use collect::collect_embeddings;
pub use collection::EmbeddingCollection;
pub use knn::{BruteForceIndex, Neighbor};
pub use store::{load_collection, load_index, save_artifacts, EMBEDDINGS_FILE, INDEX_FILE};
