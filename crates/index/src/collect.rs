use crate::collection::EmbeddingCollection;
use common::{Result, VisionError};
use indicatif::ProgressBar;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use vision::ImageEmbedder;

/// Recognized image file extensions, compared case-insensitively.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Embed every recognized image in `dir`, in lexicographic file-name order.
///
/// Entries that are not files or whose extension is not in the allow-list
/// are skipped. An empty surviving set is [`VisionError::NoImages`]. The
/// first file that fails to decode or embed aborts the run; embeddings
/// computed so far are discarded.
pub fn collect_embeddings(
    dir: &Path,
    embedder: &dyn ImageEmbedder,
) -> Result<EmbeddingCollection> {
    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if has_image_extension(&name) {
            names.push(name);
        }
    }
    names.sort();

    if names.is_empty() {
        return Err(VisionError::NoImages {
            dir: dir.to_path_buf(),
        });
    }

    let bar = ProgressBar::new(names.len() as u64);
    let mut collection = EmbeddingCollection::new();
    for name in names {
        let path = dir.join(&name);
        debug!("embedding {name}");

        let vector = embedder.embed_file(&path).map_err(|e| match e {
            // Decode errors already name the file.
            VisionError::Extraction(msg) => {
                VisionError::Extraction(format!("{name}: {msg}"))
            }
            other => other,
        })?;

        collection.push(name, vector)?;
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!(
        "embedded {} images from {} ({}-d vectors)",
        collection.len(),
        dir.display(),
        collection.dim().unwrap_or(0)
    );
    Ok(collection)
}

fn has_image_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vision::MockEmbedder;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn empty_directory_reports_no_images() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::new();

        let err = collect_embeddings(dir.path(), &embedder).unwrap_err();
        assert!(matches!(err, VisionError::NoImages { .. }));
    }

    #[test]
    fn directory_with_only_unrecognized_files_reports_no_images() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "archive.tar.gz");
        let embedder = MockEmbedder::new();

        let err = collect_embeddings(dir.path(), &embedder).unwrap_err();
        assert!(matches!(err, VisionError::NoImages { .. }));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let embedder = MockEmbedder::new();
        let err = collect_embeddings(Path::new("does/not/exist"), &embedder).unwrap_err();
        assert!(matches!(err, VisionError::Io(_)));
    }

    #[test]
    fn filters_by_extension_and_sorts_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.png");
        touch(dir.path(), "c.txt");
        touch(dir.path(), "a.jpg");
        let embedder = MockEmbedder::new()
            .with_vector("a.jpg", vec![1.0, 0.0])
            .with_vector("b.png", vec![0.0, 1.0]);

        let collection = collect_embeddings(dir.path(), &embedder).unwrap();

        assert_eq!(collection.ids(), &["a.jpg", "b.png"]);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.dim(), Some(2));
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "A.JPG");
        touch(dir.path(), "b.Jpeg");
        let embedder = MockEmbedder::new()
            .with_vector("A.JPG", vec![1.0])
            .with_vector("b.Jpeg", vec![2.0]);

        let collection = collect_embeddings(dir.path(), &embedder).unwrap();
        assert_eq!(collection.ids(), &["A.JPG", "b.Jpeg"]);
    }

    #[test]
    fn first_failing_file_aborts_the_run_and_names_it() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "b.jpg");
        // Mock has no vector for b.jpg, so it fails like a corrupt file.
        let embedder = MockEmbedder::new().with_vector("a.jpg", vec![1.0, 0.0]);

        let err = collect_embeddings(dir.path(), &embedder).unwrap_err();
        match err {
            VisionError::Extraction(msg) => assert!(msg.contains("b.jpg")),
            other => panic!("expected Extraction error, got {other:?}"),
        }
    }

    #[test]
    fn dotfiles_without_extension_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".png");
        touch(dir.path(), "a.jpg");
        let embedder = MockEmbedder::new().with_vector("a.jpg", vec![1.0]);

        let collection = collect_embeddings(dir.path(), &embedder).unwrap();
        assert_eq!(collection.ids(), &["a.jpg"]);
    }
}
