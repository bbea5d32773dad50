//! Listing URL contract.
//!
//! A scrapeable listing looks like
//! `https://www.booking.com/hotel/<cc>/<slug>.html`, optionally followed by a
//! query string or fragment.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Fragment that opens the reviews tab of a listing.
pub const REVIEWS_TAB_ANCHOR: &str = "#tab-reviews";

static LISTING_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://www\.booking\.com/hotel/[a-z]{2}/[^/]+\.html").unwrap()
});

static PROPERTY_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://www\.booking\.com/([^/]+)/([^/]+)/([^.]+)\.html").unwrap()
});

/// Whether `url` is a listing URL the scraper accepts.
pub fn is_valid_listing_url(url: &str) -> bool {
    !url.is_empty() && LISTING_URL.is_match(url)
}

/// Parts of a listing URL: `/<property_type>/<country_code>/<property_name>.html`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertyInfo {
    pub property_type: Option<String>,
    pub country_code: Option<String>,
    pub property_name: Option<String>,
}

impl PropertyInfo {
    /// Parse the three path segments. All parts are `None` when the URL does
    /// not have that shape.
    pub fn from_url(url: &str) -> Self {
        match PROPERTY_PARTS.captures(url) {
            Some(caps) => Self {
                property_type: Some(caps[1].to_string()),
                country_code: Some(caps[2].to_string()),
                property_name: Some(caps[3].to_string()),
            },
            None => Self::default(),
        }
    }
}

/// URL of the reviews tab for a listing.
pub fn reviews_tab_url(url: &str) -> String {
    if url.contains(REVIEWS_TAB_ANCHOR) {
        url.to_string()
    } else {
        format!("{}{}", url, REVIEWS_TAB_ANCHOR)
    }
}

/// Stem used to name the output file: the last path segment without its
/// extension.
pub fn output_stem(url: &str) -> String {
    let last = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .unwrap_or_default(),
        Err(_) => url.rsplit('/').next().unwrap_or_default().to_string(),
    };
    last.split('.').next().unwrap_or_default().to_string()
}
