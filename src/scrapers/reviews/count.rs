//! Resolving the advertised number of reviews.

use tracing::{debug, warn};

use super::selectors as sel;
use crate::scrapers::locator::{ElementLocator, LocatorError};

/// Estimate the total number of reviews on the loaded reviews page.
///
/// Looks for "<n> reviews" in the page text first, then for the leading
/// number of the "Guest reviews" heading. Any failure yields 0 so the crawl
/// can go on without a count.
pub async fn resolve_review_count<L: ElementLocator>(locator: &L) -> u64 {
    match try_resolve(locator).await {
        Ok(Some(count)) => count,
        Ok(None) => {
            debug!("No review count found on page");
            0
        }
        Err(e) => {
            warn!("Error getting review count: {}", e);
            0
        }
    }
}

async fn try_resolve<L: ElementLocator>(locator: &L) -> Result<Option<u64>, LocatorError> {
    if let Some(block) = locator
        .find_by_text_pattern(None, &sel::REVIEW_COUNT)
        .await?
    {
        if let Some(count) = count_in(&block) {
            return Ok(Some(count));
        }
    }

    let headings = locator
        .find_by_label(&[sel::GUEST_REVIEWS_HEADING], sel::GUEST_REVIEWS_LABEL)
        .await?;
    for heading in &headings {
        let text = locator.text(heading).await?;
        if let Some(count) = leading_number(&text) {
            return Ok(Some(count));
        }
    }
    Ok(None)
}

/// Number in a "<n> reviews" phrase, with thousands separators removed.
pub fn count_in(text: &str) -> Option<u64> {
    sel::REVIEW_COUNT
        .captures(text)
        .and_then(|caps| parse_count(&caps[1]))
}

fn leading_number(text: &str) -> Option<u64> {
    sel::LEADING_NUMBER
        .captures(text)
        .and_then(|caps| parse_count(&caps[1]))
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.replace([',', '.'], "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::locator::PageSession;
    use crate::scrapers::snapshot::SnapshotSession;

    async fn resolve(body: &str) -> u64 {
        let session = SnapshotSession::new(vec![format!("<html><body>{}</body></html>", body)]);
        session.open("https://example.test").await.unwrap();
        resolve_review_count(&session).await
    }

    #[test]
    fn test_count_in() {
        assert_eq!(count_in("1,234 reviews"), Some(1234));
        assert_eq!(count_in("Based on 2.045 Reviews"), Some(2045));
        assert_eq!(count_in("1 review"), Some(1));
        assert_eq!(count_in("8.7 · 512 reviews"), Some(512));
        assert_eq!(count_in("Read all reviews"), None);
    }

    #[tokio::test]
    async fn test_resolve_from_text() {
        assert_eq!(resolve("<span>Wonderful</span><span>1,234 reviews</span>").await, 1234);
    }

    #[tokio::test]
    async fn test_resolve_from_heading() {
        assert_eq!(resolve("<h2>Guest reviews (87)</h2>").await, 87);
    }

    #[tokio::test]
    async fn test_resolve_no_signal() {
        assert_eq!(resolve("<p>Nothing to see</p><h2>Guest reviews</h2>").await, 0);
    }

    #[tokio::test]
    async fn test_resolve_without_page() {
        let session = SnapshotSession::new(Vec::new());
        assert_eq!(resolve_review_count(&session).await, 0);
    }
}
