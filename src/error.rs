//! Errors surfaced to callers of the scraper.

use thiserror::Error;

/// Errors that can occur while scraping a listing.
///
/// Per-field, per-card and per-page problems never show up here; they are
/// absorbed inside the crawl. Only input validation and output failures do.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Invalid listing URL: {0}")]
    InvalidUrl(String),

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScrapeError {
    /// Whether the error is the caller's fault (bad input).
    pub fn is_validation(&self) -> bool {
        matches!(self, ScrapeError::InvalidUrl(_))
    }
}
