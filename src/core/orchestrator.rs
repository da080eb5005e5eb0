use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::core::driver::MirrorDriver;
use crate::core::error::MirrorError;
use crate::core::report::MirrorReport;
use crate::core::validation::validate_mirror_job;

pub struct MirrorOrchestrator {
    driver: MirrorDriver,
}

impl Default for MirrorOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorOrchestrator {
    pub fn new() -> Self {
        Self {
            driver: MirrorDriver::new(),
        }
    }

    /// Execute one mirror job with cancellation support
    pub async fn execute_mirror(
        &self,
        job_id: &str,
        source: &Path,
        target: &Path,
        cancellation: CancellationToken,
    ) -> Result<MirrorReport> {
        info!(
            "Starting mirror: {} ({} -> {})",
            job_id,
            source.display(),
            target.display()
        );

        // Precondition checks on behalf of the CLI layer
        let validation = validate_mirror_job(source, target).await?;

        if !validation.is_valid {
            bail!("Mirror validation failed");
        }

        for warning in &validation.warnings {
            warn!("Validation warning: {}", warning);
        }

        // Canonical roots keep the relative-path rewriting immune to
        // trailing separators and mixed separator spellings
        let source = dunce::canonicalize(source).with_context(|| {
            format!("Cannot canonicalize source directory: {}", source.display())
        })?;
        let target = dunce::canonicalize(target).with_context(|| {
            format!(
                "Cannot canonicalize destination directory: {}",
                target.display()
            )
        })?;

        let mut report = MirrorReport::new(job_id.to_string(), source.clone(), target.clone());

        let run_result = tokio::select! {
            result = self.mirror_with_progress(&source, &target, &mut report) => result,
            _ = cancellation.cancelled() => {
                warn!("Mirror cancelled for job: {}", job_id);
                bail!("Mirror cancelled");
            }
        };

        match run_result {
            Ok(_) => {
                report.mark_complete();
                info!(
                    "Mirror completed: {} ({} files copied, {} skipped, {} entries deleted, {} bytes)",
                    job_id,
                    report.files_copied,
                    report.files_skipped,
                    report.entries_deleted,
                    report.bytes_copied
                );
            }
            Err(e) => {
                error!("Mirror failed: {}: {}", job_id, e);
                return Err(e.into());
            }
        }

        Ok(report)
    }

    /// Drive the traversal, streaming counters into the report
    async fn mirror_with_progress(
        &self,
        source: &Path,
        target: &Path,
        report: &mut MirrorReport,
    ) -> Result<(), MirrorError> {
        let progress = self
            .driver
            .run(source, target, |p| report.record(p))
            .await?;

        report.record(&progress);

        Ok(())
    }
}
