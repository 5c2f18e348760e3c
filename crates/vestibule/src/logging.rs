use std::fs;
use std::path::Path;

use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "vestibule.log";

/// Route all tracing output to a log file under the data directory.
/// Stdout/stderr belong to the TUI while the app runs.
pub fn init(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let log_file = fs::File::create(data_dir.join(LOG_FILE))?;

    let env_filter = EnvFilter::try_from_env("VESTIBULE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(ErrorLayer::default())
        .init();
    Ok(())
}
