//! Guest review scraping for listing pages.
//!
//! [`ReviewScraper`] is the entry point: it validates the listing URL, runs
//! the crawl in a fresh browser session, always closes that session, and
//! writes the reviews to CSV.

mod count;
mod crawl;
mod extract;
mod harvest;
mod paginate;
pub mod selectors;

pub use count::{count_in, resolve_review_count};
pub use crawl::{CrawlOutcome, CrawlRun, Crawler};
pub use extract::{traveler_type_in, FieldExtractor};
pub use harvest::harvest_page;
pub use paginate::Paginator;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::error::ScrapeError;
use crate::listing::{self, PropertyInfo};
use crate::models::{CrawlTarget, ReviewTable};
use crate::scrapers::browser::BrowserSession;
use crate::scrapers::locator::PageSession;
use crate::scrapers::snapshot::SnapshotSession;
use crate::storage;

/// Everything a scrape produced.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub url: String,
    pub property: PropertyInfo,
    pub target: Option<CrawlTarget>,
    pub reviews: ReviewTable,
    pub outcome: CrawlOutcome,
    pub pages_visited: usize,
    /// Where the CSV was written. None when there was nothing to write or
    /// the write failed.
    pub csv_path: Option<PathBuf>,
}

impl ScrapeReport {
    /// Name of the written CSV file, if any.
    pub fn csv_file_name(&self) -> Option<String> {
        self.csv_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Something that can scrape a listing's reviews.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn scrape(
        &self,
        url: &str,
        max_reviews: Option<u64>,
    ) -> Result<ScrapeReport, ScrapeError>;
}

/// Scrapes listings with a live browser.
pub struct ReviewScraper {
    settings: Settings,
}

impl ReviewScraper {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Crawl saved listing pages instead of the live site.
    ///
    /// `name` replaces the output file stem; by default the first file's
    /// stem is used.
    pub async fn extract_snapshots(
        &self,
        files: &[PathBuf],
        max_reviews: Option<u64>,
        name: Option<&str>,
    ) -> Result<ScrapeReport, ScrapeError> {
        let session = SnapshotSession::from_files(files)?;
        let source = files
            .first()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let stem = match name {
            Some(name) => name.to_string(),
            None => files
                .first()
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let run = self.crawl_with(&session, &source, max_reviews).await;
        Ok(self.report(&source, &stem, PropertyInfo::default(), run))
    }

    /// Run a crawl on `session` and close it afterwards.
    async fn crawl_with<S: PageSession>(
        &self,
        session: &S,
        url: &str,
        max_reviews: Option<u64>,
    ) -> CrawlRun {
        let run = Crawler::new(session, &self.settings.crawl)
            .run(url, max_reviews)
            .await;
        session.close().await;
        run
    }

    #[cfg(feature = "browser")]
    async fn crawl_live(&self, url: &str, max_reviews: Option<u64>) -> CrawlRun {
        let session =
            match BrowserSession::launch(&self.settings.browser, self.settings.crawl.load_timeout())
                .await
            {
                Ok(session) => session,
                Err(e) => {
                    error!("{}", e);
                    return CrawlRun::failed(e.to_string());
                }
            };
        self.crawl_with(&session, url, max_reviews).await
    }

    #[cfg(not(feature = "browser"))]
    async fn crawl_live(&self, _url: &str, _max_reviews: Option<u64>) -> CrawlRun {
        match BrowserSession::launch(&self.settings.browser, self.settings.crawl.load_timeout())
            .await
        {
            Ok(_) => CrawlRun::failed("browser session unavailable"),
            Err(e) => {
                error!("{}", e);
                CrawlRun::failed(e.to_string())
            }
        }
    }

    /// Persist a non-empty result and assemble the report.
    fn report(&self, url: &str, stem: &str, property: PropertyInfo, run: CrawlRun) -> ScrapeReport {
        let csv_path = if run.reviews.is_empty() {
            None
        } else {
            self.persist(stem, &run.reviews)
        };

        ScrapeReport {
            url: url.to_string(),
            property,
            target: run.target,
            reviews: run.reviews,
            outcome: run.outcome,
            pages_visited: run.pages_visited,
            csv_path,
        }
    }

    fn persist(&self, stem: &str, reviews: &ReviewTable) -> Option<PathBuf> {
        let dir: &Path = &self.settings.output_dir;
        match storage::write_reviews_csv(dir, stem, &self.settings.file_prefix, reviews) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to save reviews: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl ReviewSource for ReviewScraper {
    /// Scrape a listing's reviews.
    ///
    /// Only a malformed URL is an error. A browser that cannot be started
    /// or a page that cannot be loaded yields a report with no reviews and
    /// a failed outcome.
    async fn scrape(
        &self,
        url: &str,
        max_reviews: Option<u64>,
    ) -> Result<ScrapeReport, ScrapeError> {
        if !listing::is_valid_listing_url(url) {
            return Err(ScrapeError::InvalidUrl(url.to_string()));
        }

        let property = PropertyInfo::from_url(url);
        info!(
            "Scraping reviews for {}",
            property.property_name.as_deref().unwrap_or(url)
        );

        let run = self.crawl_live(url, max_reviews).await;
        Ok(self.report(url, &listing::output_stem(url), property, run))
    }
}
