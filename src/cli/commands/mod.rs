//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod extract;
mod scrape;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "reviewharvest")]
#[command(about = "Guest review harvester for hotel listing pages")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the reviews of a listing and save them as CSV
    Scrape {
        /// Listing URL, e.g. https://www.booking.com/hotel/gb/property-name.html
        url: String,

        /// Stop once at least this many reviews are collected (0 = no limit)
        #[arg(short = 'm', long)]
        max_reviews: Option<u64>,
    },

    /// Run the extraction over saved listing pages, in page order
    Extract {
        /// HTML files, one per review page
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Stop once at least this many reviews are collected (0 = no limit)
        #[arg(short = 'm', long)]
        max_reviews: Option<u64>,

        /// Output name (defaults to the first file's name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Start the web interface and JSON API
    Serve {
        /// Address to bind: PORT, HOST or HOST:PORT
        #[arg(short, long)]
        bind: Option<String>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, _config) = load_settings_with_options(options).await;

    if let Some(path) = crate::logging::init(cli.verbose, settings.log_dir.as_deref()) {
        tracing::debug!("Logging to {}", path.display());
    }

    match cli.command {
        Commands::Scrape { url, max_reviews } => {
            scrape::cmd_scrape(&settings, &url, max_reviews).await
        }
        Commands::Extract {
            files,
            max_reviews,
            name,
        } => extract::cmd_extract(&settings, &files, max_reviews, name.as_deref()).await,
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scrape() {
        let cli = Cli::try_parse_from([
            "reviewharvest",
            "-v",
            "scrape",
            "https://www.booking.com/hotel/gb/x.html",
            "--max-reviews",
            "20",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Scrape { url, max_reviews } => {
                assert_eq!(url, "https://www.booking.com/hotel/gb/x.html");
                assert_eq!(max_reviews, Some(20));
            }
            _ => panic!("expected scrape"),
        }
    }

    #[test]
    fn test_extract_requires_files() {
        assert!(Cli::try_parse_from(["reviewharvest", "extract"]).is_err());

        let cli =
            Cli::try_parse_from(["reviewharvest", "extract", "a.html", "b.html", "-n", "inn"])
                .unwrap();
        match cli.command {
            Commands::Extract { files, name, .. } => {
                assert_eq!(files.len(), 2);
                assert_eq!(name.as_deref(), Some("inn"));
            }
            _ => panic!("expected extract"),
        }
    }
}
