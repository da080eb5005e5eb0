use anyhow::{bail, Result};
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub warnings: Vec<String>,
}

/// Check the preconditions the mirror core relies on.
///
/// The core itself never validates paths; both roots must already exist as
/// directories, the source must be listable and the destination writable.
pub async fn validate_mirror_job(source: &Path, target: &Path) -> Result<ValidationResult> {
    let mut warnings = Vec::new();

    debug!("Validating mirror job: {:?} -> {:?}", source, target);

    // 1. Source exists and is a directory
    if !source.exists() {
        bail!("Source path does not exist: {}", source.display());
    }

    if !source.is_dir() {
        bail!("Source path is not a directory: {}", source.display());
    }

    // 2. Test read access on source
    match tokio::fs::read_dir(source).await {
        Ok(_) => debug!("Source is readable"),
        Err(e) => bail!("Cannot read source directory: {}", e),
    }

    // 3. Destination must already exist as a directory; the mirror never
    //    creates its root
    if !target.exists() {
        bail!("Destination path does not exist: {}", target.display());
    }

    if !target.is_dir() {
        bail!("Destination path is not a directory: {}", target.display());
    }

    // 4. Test write access on destination
    let test_file = target.join(".mirrorhive_write_test");
    match tokio::fs::write(&test_file, b"test").await {
        Ok(_) => {
            let _ = tokio::fs::remove_file(&test_file).await;
            debug!("Destination is writable");
        }
        Err(e) => bail!("Cannot write to destination directory: {}", e),
    }

    // 5. Overlap checks. A destination equal to the source is harmless (the
    //    identity skip leaves every file alone), but a destination nested
    //    inside the source would be traversed while being rewritten.
    if source == target {
        warnings.push(
            "Source and destination are the same directory; files will be skipped as identical"
                .to_string(),
        );
    } else if target.starts_with(source) {
        bail!("Destination directory cannot be inside source directory");
    }

    Ok(ValidationResult {
        is_valid: true,
        warnings,
    })
}
