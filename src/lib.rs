//! reviewharvest - guest review harvesting for hotel listing pages.
//!
//! Drives a headless browser through a property's review listing, extracts
//! one record per review card and writes the collected reviews as CSV. The
//! same crawl can be run from the command line, from the bundled web form,
//! through the JSON API, or offline against saved HTML pages.

pub mod cli;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod models;
pub mod scrapers;
pub mod server;
pub mod storage;

pub use error::ScrapeError;
pub use models::{CrawlTarget, ReviewCollection, ReviewRecord, ReviewRow, ReviewTable};
pub use scrapers::reviews::{CrawlOutcome, ReviewScraper, ReviewSource, ScrapeReport};
