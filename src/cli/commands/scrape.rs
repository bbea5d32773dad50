//! Live scrape command.

use console::style;

use crate::config::Settings;
use crate::scrapers::reviews::{ReviewScraper, ReviewSource, ScrapeReport};

/// Scrape a listing and print a summary.
pub async fn cmd_scrape(
    settings: &Settings,
    url: &str,
    max_reviews: Option<u64>,
) -> anyhow::Result<()> {
    println!("{} Scraping reviews from {}", style("→").cyan(), url);

    let scraper = ReviewScraper::new(settings.clone());
    let report = scraper.scrape(url, max_reviews).await?;
    print_report(&report);
    Ok(())
}

/// Print the outcome of a scrape or extraction.
pub(super) fn print_report(report: &ScrapeReport) {
    if report.reviews.is_empty() {
        println!(
            "  {} No reviews were scraped ({})",
            style("✗").red(),
            report.outcome
        );
        return;
    }

    println!(
        "  {} Scraped {} reviews from {} page(s) ({})",
        style("✓").green(),
        report.reviews.len(),
        report.pages_visited,
        report.outcome
    );
    if let Some(target) = report.target {
        println!(
            "  {} reviews advertised, {} targeted",
            target.total_reviews,
            target.effective()
        );
    }
    match report.csv_path {
        Some(ref path) => println!("  Saved to {}", style(path.display()).bold()),
        None => println!("  {} CSV could not be written", style("!").yellow()),
    }
}
