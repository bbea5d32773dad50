//! The HTML scrape form.

use askama::Template;
use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, IntoResponse},
    Form,
};
use serde::Deserialize;
use tracing::error;

use super::super::template_structs::{IndexTemplate, ScrapeSummary};
use super::super::AppState;
use super::parse_max_reviews;
use crate::listing::{is_valid_listing_url, PropertyInfo};

const INVALID_URL_MESSAGE: &str = "Invalid Booking.com URL. Please use a URL in the format: https://www.booking.com/hotel/country_code/property_name.html";
/// Shown in place of the file name when the CSV could not be written.
const NOT_SAVED: &str = "(not saved)";
const NO_REVIEWS_MESSAGE: &str = "No reviews were found or an error occurred during scraping.";

/// Submitted form fields.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeForm {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub max_reviews: Option<String>,
}

/// Empty form.
pub async fn index() -> impl IntoResponse {
    render(IndexTemplate::new(None, None))
}

/// Run a scrape from the form and report the result on the same page.
pub async fn submit_form(
    State(state): State<AppState>,
    form: Result<Form<ScrapeForm>, FormRejection>,
) -> impl IntoResponse {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let url = form.url.unwrap_or_default().trim().to_string();

    if !is_valid_listing_url(&url) {
        return render(IndexTemplate::new(Some(INVALID_URL_MESSAGE.to_string()), None));
    }

    let max_reviews = form.max_reviews.as_deref().and_then(parse_max_reviews);
    let property_name = PropertyInfo::from_url(&url)
        .property_name
        .unwrap_or_default();

    let (message, result) = match state.scrape(&url, max_reviews).await {
        Ok(report) if !report.reviews.is_empty() => {
            let total_reviews = report.reviews.len();
            let (message, filename) = match report.csv_file_name() {
                Some(filename) => (
                    format!(
                        "Successfully scraped {} reviews for {}. Check {}",
                        total_reviews, property_name, filename
                    ),
                    filename,
                ),
                None => (
                    format!(
                        "Scraped {} reviews for {}, but saving the CSV file failed.",
                        total_reviews, property_name
                    ),
                    NOT_SAVED.to_string(),
                ),
            };
            let summary = ScrapeSummary {
                total_reviews,
                filename,
                property_name,
            };
            (message, Some(summary))
        }
        Ok(_) => (NO_REVIEWS_MESSAGE.to_string(), None),
        Err(e) => {
            error!("Error processing request: {}", e);
            (format!("An error occurred: {}", e), None)
        }
    };

    render(IndexTemplate::new(Some(message), result))
}

fn render(template: IndexTemplate<'_>) -> Html<String> {
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}
