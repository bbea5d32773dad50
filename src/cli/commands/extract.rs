//! Offline extraction over saved pages.

use std::path::PathBuf;

use anyhow::Context;
use console::style;

use super::scrape::print_report;
use crate::config::Settings;
use crate::scrapers::reviews::ReviewScraper;

/// Crawl saved HTML pages as if they were the live listing.
pub async fn cmd_extract(
    settings: &Settings,
    files: &[PathBuf],
    max_reviews: Option<u64>,
    name: Option<&str>,
) -> anyhow::Result<()> {
    println!(
        "{} Extracting reviews from {} saved page(s)",
        style("→").cyan(),
        files.len()
    );

    let scraper = ReviewScraper::new(settings.clone());
    let report = scraper
        .extract_snapshots(files, max_reviews, name)
        .await
        .context("Failed to read saved pages")?;
    print_report(&report);
    Ok(())
}
