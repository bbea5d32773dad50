//! Moving the review listing to its next page.

use tracing::{debug, error, info, warn};

use super::selectors as sel;
use crate::config::CrawlSettings;
use crate::scrapers::locator::{wait_until, ElementLocator, LocatorError};

/// Advances the review listing one page at a time.
pub struct Paginator<'a, L: ElementLocator> {
    locator: &'a L,
    settings: &'a CrawlSettings,
}

impl<'a, L: ElementLocator> Paginator<'a, L> {
    pub fn new(locator: &'a L, settings: &'a CrawlSettings) -> Self {
        Self { locator, settings }
    }

    /// Try to show the next page of reviews.
    ///
    /// Prefers a "Next" control, then the link numbered one past the active
    /// page. Returns false when neither exists, when clicking fails, or when
    /// the page did not change afterwards.
    pub async fn advance(&self) -> bool {
        let before = self.fingerprint().await;

        match self.try_advance().await {
            Ok(true) => {}
            Ok(false) => {
                info!("No next page button found or reached the last page");
                return false;
            }
            Err(e) => {
                error!("Error navigating to next page: {}", e);
                return false;
            }
        }

        let before = &before;
        let changed = wait_until(
            self.settings.page_change_timeout(),
            self.settings.poll_interval(),
            move || async move { self.fingerprint().await != *before },
        )
        .await;
        if !changed {
            warn!("Page did not change after pagination click; treating as last page");
            return false;
        }

        let rendered = wait_until(
            self.settings.render_timeout(),
            self.settings.poll_interval(),
            move || async move { self.has_cards().await },
        )
        .await;
        if !rendered {
            debug!("No review cards rendered on the new page");
        }
        true
    }

    async fn try_advance(&self) -> Result<bool, LocatorError> {
        if let Some(control) = self.next_control().await? {
            debug!("Clicking next-page control");
            self.locator.activate(&control).await?;
            return Ok(true);
        }

        if let Some(link) = self.successor_link().await? {
            debug!("Clicking numbered page link");
            self.locator.activate(&link).await?;
            return Ok(true);
        }

        Ok(false)
    }

    /// A displayed, enabled "Next" button or link.
    async fn next_control(&self) -> Result<Option<L::Element>, LocatorError> {
        let mut candidates = self
            .locator
            .find_by_label(&["button", "a"], sel::NEXT_LABEL)
            .await?;
        candidates.extend(self.locator.find_by_marker(None, sel::NEXT_CLASS_LINK).await?);

        for candidate in candidates {
            if self.locator.is_interactable(&candidate).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// The displayed pagination link for the page after the active one.
    async fn successor_link(&self) -> Result<Option<L::Element>, LocatorError> {
        let Some(current) = self.current_page().await? else {
            return Ok(None);
        };
        let wanted = (current + 1).to_string();

        for link in self.locator.find_by_marker(None, sel::PAGE_LINKS).await? {
            if self.locator.text(&link).await?.trim() == wanted
                && self.locator.is_interactable(&link).await?
            {
                return Ok(Some(link));
            }
        }
        Ok(None)
    }

    /// Number shown by the active page indicator.
    async fn current_page(&self) -> Result<Option<u32>, LocatorError> {
        for indicator in self.locator.find_by_marker(None, sel::ACTIVE_PAGE).await? {
            if let Ok(page) = self.locator.text(&indicator).await?.trim().parse::<u32>() {
                return Ok(Some(page));
            }
        }
        Ok(None)
    }

    /// Active page indicator plus first review card text.
    async fn fingerprint(&self) -> String {
        let indicator = self.first_text(sel::ACTIVE_PAGE).await;
        let card = self.first_text(sel::REVIEW_CARD).await;
        format!("{}\u{1f}{}", indicator, card)
    }

    async fn first_text(&self, selector: &str) -> String {
        match self.locator.first_by_marker(None, selector).await {
            Ok(Some(element)) => self.locator.text(&element).await.unwrap_or_default(),
            _ => String::new(),
        }
    }

    async fn has_cards(&self) -> bool {
        matches!(
            self.locator.first_by_marker(None, sel::REVIEW_CARD).await,
            Ok(Some(_))
        )
    }
}
