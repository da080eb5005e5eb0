use std::collections::HashSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::error::MirrorError;

/// Running counters for one mirror run.
#[derive(Debug, Clone, Default)]
pub struct MirrorProgress {
    pub files_copied: u64,
    pub files_skipped: u64,
    pub entries_deleted: u64,
    pub bytes_copied: u64,
    pub directories_scanned: u64,
    pub current_file: Option<PathBuf>,
}

pub struct MirrorEngine;

impl Default for MirrorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorEngine {
    pub fn new() -> Self {
        Self
    }

    /// Remove destination entries whose base name is absent from `files`.
    ///
    /// All files in one batch share the same parent directory. The matching
    /// destination directory is created (with ancestors) before it is
    /// listed, so a fresh destination subtree exists before the first copy.
    /// Matching is by file name only, never by path or content.
    pub async fn delete_unmatched(
        &self,
        files: &[PathBuf],
        source_root: &Path,
        target_root: &Path,
        progress: &mut MirrorProgress,
    ) -> Result<(), MirrorError> {
        let Some(first) = files.first() else {
            return Ok(());
        };

        let batch_parent = first.parent().unwrap_or(source_root);
        let target_dir = rebase(batch_parent, source_root, target_root)?;

        if !target_dir.exists() {
            tokio::fs::create_dir_all(&target_dir)
                .await
                .map_err(|e| delete_error(&target_dir, e))?;
        }

        let names: HashSet<OsString> = files
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_os_string()))
            .collect();

        let mut entries = tokio::fs::read_dir(&target_dir)
            .await
            .map_err(|e| delete_error(&target_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| delete_error(&target_dir, e))?
        {
            if names.contains(&entry.file_name()) {
                continue;
            }

            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| delete_error(&path, e))?;

            if file_type.is_dir() {
                tokio::fs::remove_dir_all(&path)
                    .await
                    .map_err(|e| delete_error(&path, e))?;
            } else {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| delete_error(&path, e))?;
            }

            progress.entries_deleted += 1;
            debug!("deleted: {}", path.display());
        }

        Ok(())
    }

    /// Copy each source file to its destination path.
    ///
    /// Files that already share filesystem identity with their destination
    /// are skipped; everything else is overwritten with the source bytes.
    pub async fn copy_files<F>(
        &self,
        files: &[PathBuf],
        source_root: &Path,
        target_root: &Path,
        progress: &mut MirrorProgress,
        progress_callback: &mut F,
    ) -> Result<(), MirrorError>
    where
        F: FnMut(&MirrorProgress) + Send,
    {
        if files.is_empty() {
            return Ok(());
        }

        debug!("copy files: {}", files.len());

        for source in files {
            let target = rebase(source, source_root, target_root)?;

            if let Some(parent) = target.parent() {
                if !parent.exists() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| copy_error(source, e))?;
                }
            }

            if same_identity(source, &target).await {
                progress.files_skipped += 1;
                debug!("skip identical: {} -> {}", source.display(), target.display());
                continue;
            }

            progress.current_file = Some(source.clone());

            let bytes = self.copy_file(source, &target).await?;

            progress.bytes_copied += bytes;
            progress.files_copied += 1;
            progress_callback(&*progress);
        }

        Ok(())
    }

    /// Streamed byte copy; fully replaces the destination content.
    async fn copy_file(&self, source: &Path, target: &Path) -> Result<u64, MirrorError> {
        debug!("copy: {} -> {}", source.display(), target.display());

        let mut reader = tokio::fs::File::open(source)
            .await
            .map_err(|e| copy_error(source, e))?;
        let mut writer = tokio::fs::File::create(target)
            .await
            .map_err(|e| copy_error(target, e))?;

        let bytes = tokio::io::copy(&mut reader, &mut writer)
            .await
            .map_err(|e| copy_error(source, e))?;

        writer.flush().await.map_err(|e| copy_error(target, e))?;

        Ok(bytes)
    }
}

/// Destination path = target root joined with the source path relative to
/// the source root.
fn rebase(path: &Path, source_root: &Path, target_root: &Path) -> Result<PathBuf, MirrorError> {
    let relative = path
        .strip_prefix(source_root)
        .map_err(|_| MirrorError::OutsideRoot {
            path: path.to_path_buf(),
            root: source_root.to_path_buf(),
        })?;

    Ok(target_root.join(relative))
}

/// True when both paths refer to the literal same underlying file.
#[cfg(unix)]
async fn same_identity(source: &Path, target: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    let (Ok(src), Ok(dst)) = (
        tokio::fs::metadata(source).await,
        tokio::fs::metadata(target).await,
    ) else {
        return false;
    };

    src.dev() == dst.dev() && src.ino() == dst.ino()
}

/// Without stable file identifiers, canonical-path equality covers the one
/// reachable aliasing case: source and destination spelling the same file.
#[cfg(not(unix))]
async fn same_identity(source: &Path, target: &Path) -> bool {
    match (dunce::canonicalize(source), dunce::canonicalize(target)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn delete_error(path: &Path, source: io::Error) -> MirrorError {
    MirrorError::Delete {
        path: path.to_path_buf(),
        source,
    }
}

fn copy_error(path: &Path, source: io::Error) -> MirrorError {
    MirrorError::Copy {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_progress() -> impl FnMut(&MirrorProgress) + Send {
        |_| {}
    }

    async fn write_file(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.unwrap();
        }
        tokio::fs::write(path, content).await.unwrap();
    }

    async fn sorted_names(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        names
    }

    #[tokio::test]
    async fn delete_unmatched_removes_stale_entries() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        write_file(&source.path().join("file_a"), b"alpha").await;
        write_file(&target.path().join("file_a"), b"alpha").await;
        write_file(&target.path().join("file_stale"), b"old").await;
        write_file(&target.path().join("dir_stale").join("inner"), b"old").await;

        let files = vec![source.path().join("file_a")];
        let mut progress = MirrorProgress::default();

        MirrorEngine::new()
            .delete_unmatched(&files, source.path(), target.path(), &mut progress)
            .await
            .unwrap();

        assert_eq!(sorted_names(target.path()).await, vec!["file_a"]);
        assert_eq!(progress.entries_deleted, 2, "stale file and stale directory");
    }

    #[tokio::test]
    async fn delete_unmatched_is_a_noop_for_an_empty_batch() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        write_file(&target.path().join("file_stale"), b"old").await;

        let mut progress = MirrorProgress::default();
        MirrorEngine::new()
            .delete_unmatched(&[], source.path(), target.path(), &mut progress)
            .await
            .unwrap();

        assert_eq!(
            sorted_names(target.path()).await,
            vec!["file_stale"],
            "an empty batch must not touch the destination"
        );
        assert_eq!(progress.entries_deleted, 0);
    }

    #[tokio::test]
    async fn delete_unmatched_creates_the_destination_directory() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        write_file(&source.path().join("dir_a").join("file_a_a"), b"nested").await;

        let files = vec![source.path().join("dir_a").join("file_a_a")];
        let mut progress = MirrorProgress::default();

        MirrorEngine::new()
            .delete_unmatched(&files, source.path(), target.path(), &mut progress)
            .await
            .unwrap();

        assert!(
            target.path().join("dir_a").is_dir(),
            "destination subtree must exist before any file is copied"
        );
    }

    #[tokio::test]
    async fn copy_files_copies_byte_content() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        write_file(&source.path().join("file_a"), b"alpha").await;
        write_file(&source.path().join("file_b"), b"beta").await;

        let files = vec![source.path().join("file_a"), source.path().join("file_b")];
        let mut progress = MirrorProgress::default();

        MirrorEngine::new()
            .copy_files(
                &files,
                source.path(),
                target.path(),
                &mut progress,
                &mut no_progress(),
            )
            .await
            .unwrap();

        assert_eq!(
            tokio::fs::read(target.path().join("file_a")).await.unwrap(),
            b"alpha"
        );
        assert_eq!(
            tokio::fs::read(target.path().join("file_b")).await.unwrap(),
            b"beta"
        );
        assert_eq!(progress.files_copied, 2);
        assert_eq!(progress.bytes_copied, 9);
    }

    #[tokio::test]
    async fn copy_files_overwrites_existing_destination_content() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        write_file(&source.path().join("file_a"), b"new content").await;
        write_file(&target.path().join("file_a"), b"an older, longer content").await;

        let files = vec![source.path().join("file_a")];
        let mut progress = MirrorProgress::default();

        MirrorEngine::new()
            .copy_files(
                &files,
                source.path(),
                target.path(),
                &mut progress,
                &mut no_progress(),
            )
            .await
            .unwrap();

        assert_eq!(
            tokio::fs::read(target.path().join("file_a")).await.unwrap(),
            b"new content",
            "destination must be fully replaced, not appended or partially written"
        );
    }

    #[tokio::test]
    async fn copy_files_creates_missing_parent_directories() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        write_file(&source.path().join("dir_a").join("file_a_a"), b"nested").await;

        let files = vec![source.path().join("dir_a").join("file_a_a")];
        let mut progress = MirrorProgress::default();

        MirrorEngine::new()
            .copy_files(
                &files,
                source.path(),
                target.path(),
                &mut progress,
                &mut no_progress(),
            )
            .await
            .unwrap();

        assert_eq!(
            tokio::fs::read(target.path().join("dir_a").join("file_a_a"))
                .await
                .unwrap(),
            b"nested"
        );
    }

    #[tokio::test]
    async fn copy_files_skips_the_destination_when_it_is_the_same_file() {
        let source = TempDir::new().unwrap();

        write_file(&source.path().join("file_a"), b"alpha").await;

        // Mirroring a directory onto itself: every derived destination path
        // aliases its source file.
        let files = vec![source.path().join("file_a")];
        let mut progress = MirrorProgress::default();

        MirrorEngine::new()
            .copy_files(
                &files,
                source.path(),
                source.path(),
                &mut progress,
                &mut no_progress(),
            )
            .await
            .unwrap();

        assert_eq!(progress.files_skipped, 1);
        assert_eq!(progress.files_copied, 0);
        assert_eq!(
            tokio::fs::read(source.path().join("file_a")).await.unwrap(),
            b"alpha",
            "the aliased file must not be truncated"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn copy_files_skips_hard_linked_destinations() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        write_file(&source.path().join("file_a"), b"alpha").await;
        tokio::fs::hard_link(
            source.path().join("file_a"),
            target.path().join("file_a"),
        )
        .await
        .unwrap();

        let files = vec![source.path().join("file_a")];
        let mut progress = MirrorProgress::default();

        MirrorEngine::new()
            .copy_files(
                &files,
                source.path(),
                target.path(),
                &mut progress,
                &mut no_progress(),
            )
            .await
            .unwrap();

        assert_eq!(progress.files_skipped, 1);
        assert_eq!(progress.files_copied, 0);
    }

    #[tokio::test]
    async fn copy_files_rejects_paths_outside_the_source_root() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let stray = TempDir::new().unwrap();

        write_file(&stray.path().join("file_x"), b"stray").await;

        let files = vec![stray.path().join("file_x")];
        let mut progress = MirrorProgress::default();

        let result = MirrorEngine::new()
            .copy_files(
                &files,
                source.path(),
                target.path(),
                &mut progress,
                &mut no_progress(),
            )
            .await;

        assert!(matches!(result, Err(MirrorError::OutsideRoot { .. })));
    }

    #[tokio::test]
    async fn copy_files_reports_missing_sources_as_copy_errors() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();

        let files = vec![source.path().join("file_gone")];
        let mut progress = MirrorProgress::default();

        let result = MirrorEngine::new()
            .copy_files(
                &files,
                source.path(),
                target.path(),
                &mut progress,
                &mut no_progress(),
            )
            .await;

        assert!(matches!(result, Err(MirrorError::Copy { .. })));
    }
}
