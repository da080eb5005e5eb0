use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_LOG_LEVEL: &str = "info";

#[inline]
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Top-level tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Mirror jobs, executed sequentially in order
    pub jobs: Vec<MirrorJob>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional log file directory (if None, only console logging)
    #[serde(default)]
    pub log_directory: Option<PathBuf>,

    /// Log file rotation strategy
    #[serde(default)]
    pub log_rotation: LogRotation,

    /// Optional path the run reports are written to as JSON
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

impl MirrorConfig {
    /// Configuration for a single job given on the command line
    pub fn for_single_job(source: PathBuf, target: PathBuf, verbose: bool) -> Self {
        Self {
            jobs: vec![MirrorJob {
                id: "adhoc".to_string(),
                source,
                target,
                description: String::new(),
            }],
            log_level: if verbose {
                "debug".to_string()
            } else {
                default_log_level()
            },
            log_directory: None,
            log_rotation: LogRotation::default(),
            report_path: None,
        }
    }
}

/// Log file rotation strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate daily
    Daily,
    /// Rotate hourly
    Hourly,
    /// Never rotate (single file)
    Never,
}

impl Default for LogRotation {
    fn default() -> Self {
        LogRotation::Daily
    }
}

/// Individual mirror job configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorJob {
    /// Unique job identifier
    pub id: String,

    /// Source directory to mirror from
    pub source: PathBuf,

    /// Destination directory to mirror into
    pub target: PathBuf,

    /// Optional description
    #[serde(default)]
    pub description: String,
}
