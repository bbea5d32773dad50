//! Listing URL contract
//!
//! The URL rules shared by the CLI, the form page and the JSON API.

use reviewharvest::listing::{is_valid_listing_url, output_stem, reviews_tab_url, PropertyInfo};
use reviewharvest::{ReviewScraper, ReviewSource, ScrapeError};

#[test]
fn test_accepts_listing_urls() {
    for url in [
        "https://www.booking.com/hotel/gb/london-visitors.html",
        "http://www.booking.com/hotel/fr/le-petit.fr.html",
        "https://www.booking.com/hotel/us/sample-inn.html?aid=1&checkin=2024-05-01",
    ] {
        assert!(is_valid_listing_url(url), "{}", url);
    }
}

#[test]
fn test_rejects_other_urls() {
    for url in [
        "",
        "not a url",
        "https://example.com/hotel/gb/x.html",
        "https://www.booking.com/hotel/london.html",
        "https://www.booking.com/searchresults.html",
        "https://booking.com/hotel/gb/x.html",
    ] {
        assert!(!is_valid_listing_url(url), "{}", url);
    }
}

#[test]
fn test_property_info_and_naming() {
    let url = "https://www.booking.com/hotel/gb/london-visitors.html";
    let info = PropertyInfo::from_url(url);
    assert_eq!(info.property_type.as_deref(), Some("hotel"));
    assert_eq!(info.country_code.as_deref(), Some("gb"));
    assert_eq!(info.property_name.as_deref(), Some("london-visitors"));

    assert_eq!(output_stem(url), "london-visitors");
    assert_eq!(reviews_tab_url(url), format!("{}#tab-reviews", url));
    assert_eq!(
        reviews_tab_url(&format!("{}#tab-reviews", url)),
        format!("{}#tab-reviews", url)
    );
}

#[tokio::test]
async fn test_scrape_rejects_invalid_url() {
    let dir = tempfile::tempdir().unwrap();
    let scraper =
        ReviewScraper::new(reviewharvest::config::Settings::with_output_dir(dir.path().into()));
    let err = scraper
        .scrape("https://example.com/hotel/gb/x.html", Some(10))
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::InvalidUrl(_)));
}
