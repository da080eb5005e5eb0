use std::collections::VecDeque;
use std::path::Path;
use tracing::debug;

use crate::core::engine::{MirrorEngine, MirrorProgress};
use crate::core::error::MirrorError;
use crate::core::walker::TreeWalker;

/// Breadth-first traversal loop composing the walker and the engine.
pub struct MirrorDriver {
    walker: TreeWalker,
    engine: MirrorEngine,
}

impl Default for MirrorDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorDriver {
    pub fn new() -> Self {
        Self {
            walker: TreeWalker::new(),
            engine: MirrorEngine::new(),
        }
    }

    /// Mirror `source_root` into `target_root`.
    ///
    /// Each directory's file batch is deleted-then-copied before its
    /// subdirectories are expanded, and directories discovered at depth N
    /// run strictly after every directory already enqueued. The loop ends
    /// when the pending queue and the current batch are both drained.
    pub async fn run<F>(
        &self,
        source_root: &Path,
        target_root: &Path,
        mut progress_callback: F,
    ) -> Result<MirrorProgress, MirrorError>
    where
        F: FnMut(&MirrorProgress) + Send,
    {
        let mut progress = MirrorProgress::default();
        let mut pending = VecDeque::from([source_root.to_path_buf()]);
        let mut files = Vec::new();

        while !pending.is_empty() || !files.is_empty() {
            self.engine
                .delete_unmatched(&files, source_root, target_root, &mut progress)
                .await?;
            self.engine
                .copy_files(
                    &files,
                    source_root,
                    target_root,
                    &mut progress,
                    &mut progress_callback,
                )
                .await?;
            files = Vec::new();

            if let Some(dir) = pending.pop_front() {
                debug!("pending: {}, inspect {}", pending.len() + 1, dir.display());

                let batch = self.walker.scan(&dir).await?;
                pending.extend(batch.directories);
                files = batch.files;
                progress.directories_scanned += 1;
            }
        }

        progress.current_file = None;
        Ok(progress)
    }
}
