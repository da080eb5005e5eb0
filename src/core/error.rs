use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the mirror core.
///
/// Every kind is fatal to the run: nothing is retried, and the first
/// failure propagates to the caller unchanged.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Failed to list a directory during traversal
    #[error("failed to inspect directory {}: {source}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to list the destination directory or remove one of its entries
    #[error("failed to delete destination entry {}: {source}", .path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read a source file or create/write its destination
    #[error("failed to copy {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A path turned out not to live under the mirror root it was derived from
    #[error("path {} is outside mirror root {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },
}
