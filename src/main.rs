use anyhow::{bail, Context, Result};
use mirrorhive::{
    config::{LogRotation, MirrorConfig},
    core::MirrorOrchestrator,
    observability::{init_logging, shutdown_logging, Rotation},
    signals::setup_shutdown_handler,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// How the tool was invoked: a config file with jobs, or a single
/// source/destination pair on the command line.
enum Invocation {
    ConfigFile(PathBuf),
    AdHoc {
        source: PathBuf,
        target: PathBuf,
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        bail!("No arguments given");
    }

    if matches!(args[1].as_str(), "--help" | "-h") {
        print_help();
        return Ok(());
    }

    let invocation = parse_invocation(&args)?;
    run(invocation)
}

fn parse_invocation(args: &[String]) -> Result<Invocation> {
    let mut source = None;
    let mut target = None;
    let mut verbose = false;
    let mut config_path = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-s" => {
                source = iter.next().filter(|v| !v.starts_with('-')).cloned();
                if source.is_none() {
                    bail!("Option -s requires a source directory argument");
                }
            }
            "-d" => {
                target = iter.next().filter(|v| !v.starts_with('-')).cloned();
                if target.is_none() {
                    bail!("Option -d requires a destination directory argument");
                }
            }
            "-v" => verbose = true,
            other if !other.starts_with('-') && config_path.is_none() => {
                config_path = Some(PathBuf::from(other));
            }
            other => bail!("Unrecognized argument: {}", other),
        }
    }

    match (source, target, config_path) {
        (Some(source), Some(target), None) => Ok(Invocation::AdHoc {
            source: PathBuf::from(source),
            target: PathBuf::from(target),
            verbose,
        }),
        (None, None, Some(path)) => Ok(Invocation::ConfigFile(path)),
        (Some(_), None, _) => bail!("Option -d <destination directory> required"),
        (None, Some(_), _) => bail!("Option -s <source directory> required"),
        (None, None, None) => bail!("Either a config file or -s/-d directories are required"),
        _ => bail!("A config file and -s/-d directories cannot be combined"),
    }
}

#[tokio::main]
async fn run(invocation: Invocation) -> Result<()> {
    let config = match invocation {
        Invocation::ConfigFile(path) => load_config(&path)
            .await
            .context("Failed to load configuration")?,
        Invocation::AdHoc {
            source,
            target,
            verbose,
        } => MirrorConfig::for_single_job(source, target, verbose),
    };

    let rotation = match config.log_rotation {
        LogRotation::Daily => Rotation::Daily,
        LogRotation::Hourly => Rotation::Hourly,
        LogRotation::Never => Rotation::Never,
    };

    init_logging(&config.log_level, config.log_directory.as_deref(), rotation)?;

    info!("mirrorhive v{}", env!("CARGO_PKG_VERSION"));

    let cancellation = CancellationToken::new();
    setup_shutdown_handler(cancellation.clone()).await;

    let orchestrator = MirrorOrchestrator::new();
    let mut reports = Vec::new();

    for job in &config.jobs {
        if !job.description.is_empty() {
            info!("Job {}: {}", job.id, job.description);
        }

        // First failure aborts the whole run
        let report = orchestrator
            .execute_mirror(&job.id, &job.source, &job.target, cancellation.clone())
            .await?;

        reports.push(report);
    }

    if let Some(report_path) = &config.report_path {
        let json = serde_json::to_string_pretty(&reports)?;
        tokio::fs::write(report_path, json)
            .await
            .with_context(|| format!("Failed to write report file: {}", report_path.display()))?;
        info!("Run report written to {}", report_path.display());
    }

    shutdown_logging();
    Ok(())
}

async fn load_config(path: &PathBuf) -> Result<MirrorConfig> {
    if !path.exists() {
        bail!(
            "Configuration file not found: {}\n\nCreate a config file first. Example:\n{}",
            path.display(),
            get_example_config()
        );
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .context("Failed to read config file")?;

    let config: MirrorConfig =
        serde_json::from_str(&content).context("Failed to parse config file")?;

    if config.jobs.is_empty() {
        bail!("Configuration contains no jobs: {}", path.display());
    }

    Ok(config)
}

fn print_help() {
    println!("mirrorhive v{} - One-Way Directory Mirror", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Copies files from a source directory to a destination directory and");
    println!("deletes destination files that no longer exist in the source.");
    println!("Both directories must already exist.");
    println!();
    println!("USAGE:");
    println!("  mirrorhive -s <SOURCE> -d <DESTINATION> [-v]   Mirror one directory pair");
    println!("  mirrorhive <CONFIG_FILE>                       Run all configured jobs");
    println!("  mirrorhive --help                              Show this help");
    println!();
    println!("OPTIONS:");
    println!("  -s <SOURCE>        source directory (required without a config file)");
    println!("  -d <DESTINATION>   destination directory (required without a config file)");
    println!("  -v                 verbose output (debug log level)");
    println!();
    println!("EXAMPLES:");
    println!("  # Mirror a single directory pair");
    println!("  mirrorhive -s /data/docs -d /mirror/docs");
    println!();
    println!("  # Run the jobs from a config file");
    println!("  mirrorhive mirror_config.json");
}

fn get_example_config() -> &'static str {
    r#"{
  "jobs": [
    {
      "id": "docs_mirror",
      "source": "/data/docs",
      "target": "/mirror/docs",
      "description": "Nightly documentation mirror"
    }
  ],
  "log_level": "info",
  "log_directory": "./logs",
  "log_rotation": {
    "type": "daily"
  },
  "report_path": "./mirror_report.json"
}"#
}
