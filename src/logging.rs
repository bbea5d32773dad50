//! Process-wide tracing setup.
//!
//! Initialised once by the command-line entry point. Library code only emits
//! events; it never installs a subscriber of its own.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber.
///
/// Logs go to stderr, and additionally to `log_dir/scraper_<timestamp>.log`
/// when a log directory is given. Returns the log file path if one was opened.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> Option<PathBuf> {
    let default_filter = if verbose {
        "reviewharvest=debug"
    } else {
        "reviewharvest=info"
    };

    let (file_layer, log_path) = match log_dir.map(open_log_file) {
        Some(Ok((file, path))) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            ),
            Some(path),
        ),
        Some(Err(e)) => {
            eprintln!("Could not open log file: {}", e);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    log_path
}

fn open_log_file(dir: &Path) -> std::io::Result<(File, PathBuf)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(log_file_name(chrono::Local::now()));
    let file = File::create(&path)?;
    Ok((file, path))
}

fn log_file_name<Tz: chrono::TimeZone>(now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("scraper_{}.log", now.format("%Y%m%d_%H%M%S"))
}
