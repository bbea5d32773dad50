//! Askama template structs for the web interface.
//!
//! Each struct corresponds to an HTML template in the templates/ directory.

use askama::Template;

/// Summary shown under a successful scrape.
pub struct ScrapeSummary {
    pub total_reviews: usize,
    pub filename: String,
    pub property_name: String,
}

/// The scrape form, with the outcome of the last submission.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    pub message: Option<String>,
    pub result: Option<ScrapeSummary>,
}

impl<'a> IndexTemplate<'a> {
    pub fn new(message: Option<String>, result: Option<ScrapeSummary>) -> Self {
        Self {
            title: "Booking.com Review Scraper",
            message,
            result,
        }
    }
}
