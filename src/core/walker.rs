use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::error::MirrorError;

/// Immediate children of one directory, classified for the mirror loop.
///
/// Order within each list follows the underlying directory listing and is
/// not guaranteed stable across filesystems.
#[derive(Debug, Default)]
pub struct DirectoryBatch {
    /// Non-empty subdirectories, pending traversal
    pub directories: Vec<PathBuf>,
    /// Files to hand to the mirror engine
    pub files: Vec<PathBuf>,
}

pub struct TreeWalker;

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWalker {
    pub fn new() -> Self {
        Self
    }

    /// List the immediate children of `dir`.
    ///
    /// Subdirectories with zero entries are dropped: the mirror is defined
    /// over files, so an empty source directory leaves no trace at the
    /// destination even on first sync.
    pub async fn scan(&self, dir: &Path) -> Result<DirectoryBatch, MirrorError> {
        let mut batch = DirectoryBatch::default();

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| inspect_error(dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| inspect_error(dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| inspect_error(&path, e))?;

            if file_type.is_dir() {
                if has_entries(&path).await? {
                    batch.directories.push(path);
                }
            } else {
                batch.files.push(path);
            }
        }

        if !batch.directories.is_empty() || !batch.files.is_empty() {
            debug!(
                "scanned {}: {} directories, {} files",
                dir.display(),
                batch.directories.len(),
                batch.files.len()
            );
        }

        Ok(batch)
    }
}

/// True when the directory contains at least one entry
async fn has_entries(dir: &Path) -> Result<bool, MirrorError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| inspect_error(dir, e))?;

    let first = entries
        .next_entry()
        .await
        .map_err(|e| inspect_error(dir, e))?;

    Ok(first.is_some())
}

fn inspect_error(path: &Path, source: io::Error) -> MirrorError {
    MirrorError::Inspect {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        tokio::fs::write(root.join("file_a"), b"alpha").await.unwrap();
        tokio::fs::write(root.join("file_b"), b"beta").await.unwrap();

        tokio::fs::create_dir(root.join("dir_a")).await.unwrap();
        tokio::fs::write(root.join("dir_a").join("file_a_a"), b"nested")
            .await
            .unwrap();

        tokio::fs::create_dir(root.join("dir_empty")).await.unwrap();

        temp_dir
    }

    #[tokio::test]
    async fn scan_classifies_files_and_directories() {
        let temp_dir = create_test_tree().await;
        let walker = TreeWalker::new();

        let batch = walker.scan(temp_dir.path()).await.unwrap();

        let mut files: Vec<_> = batch
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        files.sort();
        assert_eq!(files, vec!["file_a", "file_b"]);

        let dirs: Vec<_> = batch
            .directories
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(dirs, vec!["dir_a"], "only the non-empty subdirectory survives");
    }

    #[tokio::test]
    async fn scan_drops_empty_directories() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::create_dir(temp_dir.path().join("empty_one"))
            .await
            .unwrap();
        tokio::fs::create_dir(temp_dir.path().join("empty_two"))
            .await
            .unwrap();

        let batch = TreeWalker::new().scan(temp_dir.path()).await.unwrap();

        assert!(batch.directories.is_empty(), "empty directories must be dropped");
        assert!(batch.files.is_empty());
    }

    #[tokio::test]
    async fn scan_of_missing_directory_is_an_inspect_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does_not_exist");

        let result = TreeWalker::new().scan(&missing).await;

        assert!(matches!(result, Err(MirrorError::Inspect { .. })));
    }

    #[tokio::test]
    async fn scan_keeps_nested_content_out_of_the_batch() {
        let temp_dir = create_test_tree().await;

        let batch = TreeWalker::new().scan(temp_dir.path()).await.unwrap();

        assert!(
            batch.files.iter().all(|p| p.parent() == Some(temp_dir.path())),
            "scan must only report immediate children"
        );
    }
}
