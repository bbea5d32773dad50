//! Crawl state machine for one listing.
//!
//! `Init -> CountResolved -> Harvesting <-> Paginating -> Done`. A session
//! that cannot load the listing at all ends the crawl as failed with no
//! reviews; everything else degrades to a partial result.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::count::resolve_review_count;
use super::harvest::harvest_page;
use super::paginate::Paginator;
use super::selectors as sel;
use crate::config::CrawlSettings;
use crate::listing::reviews_tab_url;
use crate::models::{CrawlTarget, ReviewCollection, ReviewTable};
use crate::scrapers::locator::{wait_until, LocatorError, PageSession};

/// How a crawl ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// Collected at least the target number of reviews.
    TargetMet,
    /// Ran out of pages first.
    Exhausted,
    /// The session could not drive the listing.
    Failed(String),
}

impl CrawlOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, CrawlOutcome::Failed(_))
    }
}

impl std::fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlOutcome::TargetMet => write!(f, "target reached"),
            CrawlOutcome::Exhausted => write!(f, "no more pages"),
            CrawlOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CrawlState {
    Init,
    CountResolved,
    Harvesting,
    Paginating,
    Done(CrawlOutcome),
}

/// Result of one crawl.
#[derive(Debug, Clone)]
pub struct CrawlRun {
    pub reviews: ReviewTable,
    /// Unset when the crawl failed before the count was resolved.
    pub target: Option<CrawlTarget>,
    pub outcome: CrawlOutcome,
    pub pages_visited: usize,
}

impl CrawlRun {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            reviews: ReviewCollection::new().finalize(),
            target: None,
            outcome: CrawlOutcome::Failed(reason.into()),
            pages_visited: 0,
        }
    }
}

/// Drives one listing through a [`PageSession`].
///
/// The session is borrowed; opening and closing it is the caller's job.
pub struct Crawler<'a, S: PageSession> {
    session: &'a S,
    settings: &'a CrawlSettings,
}

impl<'a, S: PageSession> Crawler<'a, S> {
    pub fn new(session: &'a S, settings: &'a CrawlSettings) -> Self {
        Self { session, settings }
    }

    /// Crawl the listing at `url`, collecting up to `max_reviews`.
    pub async fn run(&self, url: &str, max_reviews: Option<u64>) -> CrawlRun {
        let mut state = CrawlState::Init;
        let mut collection = ReviewCollection::new();
        let mut target: Option<CrawlTarget> = None;
        let mut pages_visited = 0;

        let outcome = loop {
            state = match state {
                CrawlState::Init => match self.prepare(url).await {
                    Ok(()) => {
                        let total = resolve_review_count(self.session).await;
                        info!("Found {} total reviews", total);
                        let resolved = CrawlTarget::new(total, max_reviews);
                        info!("Will scrape up to {} reviews", resolved.effective());
                        target = Some(resolved);
                        CrawlState::CountResolved
                    }
                    Err(e) => {
                        error!("Could not load {}: {}", url, e);
                        CrawlState::Done(CrawlOutcome::Failed(e.to_string()))
                    }
                },
                CrawlState::CountResolved => {
                    if target.is_some_and(|t| t.is_met(collection.len())) {
                        CrawlState::Done(CrawlOutcome::TargetMet)
                    } else {
                        CrawlState::Harvesting
                    }
                }
                CrawlState::Harvesting => {
                    pages_visited += 1;
                    info!("Scraping page {}...", pages_visited);
                    let records = harvest_page(self.session).await;
                    info!("Scraped {} reviews from page {}", records.len(), pages_visited);
                    collection.extend(records);
                    info!("Total reviews scraped so far: {}", collection.len());

                    match target {
                        Some(t) if t.is_met(collection.len()) => {
                            info!("Reached target of {} reviews", t.effective());
                            CrawlState::Done(CrawlOutcome::TargetMet)
                        }
                        _ => CrawlState::Paginating,
                    }
                }
                CrawlState::Paginating => {
                    if Paginator::new(self.session, self.settings).advance().await {
                        CrawlState::Harvesting
                    } else {
                        info!("No more pages available");
                        CrawlState::Done(CrawlOutcome::Exhausted)
                    }
                }
                CrawlState::Done(outcome) => break outcome,
            };
        };

        let reviews = if outcome.is_failed() {
            ReviewCollection::new().finalize()
        } else {
            collection.finalize()
        };
        if reviews.is_empty() {
            warn!("No reviews were scraped");
        }

        CrawlRun {
            reviews,
            target,
            outcome,
            pages_visited,
        }
    }

    /// Load the reviews tab and get it into a harvestable state.
    ///
    /// Only the navigation itself can fail; the banner and tab steps are
    /// best effort.
    async fn prepare(&self, url: &str) -> Result<(), LocatorError> {
        self.session.open(&reviews_tab_url(url)).await?;
        if !self.wait_for_cards().await {
            debug!("No review cards rendered after load");
        }

        self.dismiss_consent().await;
        if self.open_reviews_tab().await && !self.wait_for_cards().await {
            warn!("No review cards rendered after opening the reviews tab");
        }
        Ok(())
    }

    async fn wait_for_cards(&self) -> bool {
        let session = self.session;
        wait_until(
            self.settings.render_timeout(),
            self.settings.poll_interval(),
            move || async move {
                matches!(
                    session.first_by_marker(None, sel::REVIEW_CARD).await,
                    Ok(Some(_))
                )
            },
        )
        .await
    }

    async fn dismiss_consent(&self) {
        let mut candidates = self
            .session
            .find_by_marker(None, sel::CONSENT_BUTTON_IDS)
            .await
            .unwrap_or_default();
        candidates.extend(
            self.session
                .find_by_label(&["button"], sel::CONSENT_LABEL)
                .await
                .unwrap_or_default(),
        );

        if let Some(button) = self.first_interactable(candidates).await {
            match self.session.activate(&button).await {
                Ok(()) => {
                    debug!("Dismissed cookie consent");
                    tokio::time::sleep(self.settings.consent_settle()).await;
                }
                Err(e) => debug!("Cookie consent click failed: {}", e),
            }
        }
    }

    /// Click the reviews tab if one is showing. Returns whether it was clicked.
    async fn open_reviews_tab(&self) -> bool {
        let mut candidates = self
            .session
            .find_by_marker(None, sel::REVIEWS_TAB_LINK)
            .await
            .unwrap_or_default();
        candidates.extend(
            self.session
                .find_by_label(&["button"], sel::REVIEWS_TAB_LABEL)
                .await
                .unwrap_or_default(),
        );

        let Some(tab) = self.first_interactable(candidates).await else {
            return false;
        };
        match self.session.activate(&tab).await {
            Ok(()) => true,
            Err(e) => {
                debug!("Reviews tab click failed: {}", e);
                false
            }
        }
    }

    async fn first_interactable(&self, candidates: Vec<S::Element>) -> Option<S::Element> {
        for candidate in candidates {
            if self.session.is_interactable(&candidate).await.unwrap_or(false) {
                return Some(candidate);
            }
        }
        None
    }
}
