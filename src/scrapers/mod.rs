//! Page backends and the review scraper built on them.

pub mod browser;
pub mod locator;
pub mod reviews;
pub mod snapshot;

pub use browser::{BrowserConfig, BrowserSession};
pub use locator::{wait_until, ElementLocator, LocatorError, PageSession};
pub use reviews::{CrawlOutcome, ReviewScraper, ReviewSource, ScrapeReport};
pub use snapshot::SnapshotSession;
