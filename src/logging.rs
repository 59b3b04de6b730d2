use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn filter(debug: bool, quiet: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("flowcurrent=debug")
    } else if quiet {
        EnvFilter::new("flowcurrent=error")
    } else {
        // RUST_LOG wins when set
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowcurrent=warn"))
    }
}

/// Initialize logging from the CLI flags, with an optional log file
pub fn init_logging(debug: bool, quiet: bool, log_file: Option<PathBuf>) -> anyhow::Result<()> {
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(debug)
        .with_file(debug)
        .with_writer(std::io::stderr);

    let file_layer = match log_file {
        Some(log_path) => {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)?;

            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(file)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter(debug, quiet))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Default log file path for a run of `workflow_name`
pub fn default_log_path(workflow_name: &str) -> anyhow::Result<PathBuf> {
    let log_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("flowcurrent")
        .join("logs");

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    Ok(log_dir.join(format!("{}-{}.log", workflow_name, timestamp)))
}
