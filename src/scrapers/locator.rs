//! Element location capability shared by every page backend.
//!
//! The review extractor and paginator only talk to these traits. The live
//! backend drives Chrome over CDP; the snapshot backend answers the same
//! questions from saved HTML.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Errors raised while locating or driving page elements.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    #[error("Script failed: {0}")]
    Script(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Query interface over a rendered page.
///
/// `scope` limits a search to the descendants of an element; `None` searches
/// the whole document.
#[async_trait]
pub trait ElementLocator: Send + Sync {
    type Element: Send + Sync;

    /// Elements matching a structural CSS marker.
    async fn find_by_marker(
        &self,
        scope: Option<&Self::Element>,
        selector: &str,
    ) -> Result<Vec<Self::Element>, LocatorError>;

    /// Elements of the given tags whose accessible label or visible text
    /// contains `label`.
    async fn find_by_label(
        &self,
        tags: &[&str],
        label: &str,
    ) -> Result<Vec<Self::Element>, LocatorError>;

    /// Visible text of every element that owns a non-blank text node, in
    /// document order.
    async fn text_blocks(
        &self,
        scope: Option<&Self::Element>,
    ) -> Result<Vec<String>, LocatorError>;

    /// Rendered text of an element.
    async fn text(&self, element: &Self::Element) -> Result<String, LocatorError>;

    /// Whether the element is displayed and enabled.
    async fn is_interactable(&self, element: &Self::Element) -> Result<bool, LocatorError>;

    /// Scroll the element into view and click it programmatically.
    async fn activate(&self, element: &Self::Element) -> Result<(), LocatorError>;

    /// First text block matching `pattern`.
    async fn find_by_text_pattern(
        &self,
        scope: Option<&Self::Element>,
        pattern: &Regex,
    ) -> Result<Option<String>, LocatorError> {
        let blocks = self.text_blocks(scope).await?;
        Ok(blocks.into_iter().find(|block| pattern.is_match(block)))
    }

    /// First element matching `selector`, if any.
    async fn first_by_marker(
        &self,
        scope: Option<&Self::Element>,
        selector: &str,
    ) -> Result<Option<Self::Element>, LocatorError> {
        Ok(self.find_by_marker(scope, selector).await?.into_iter().next())
    }
}

/// A page that can be pointed at a URL and torn down.
#[async_trait]
pub trait PageSession: ElementLocator {
    /// Load `url` and wait for the document to be ready.
    async fn open(&self, url: &str) -> Result<(), LocatorError>;

    /// Release the underlying browser resources. Safe to call more than once.
    async fn close(&self);
}

/// Poll `condition` until it holds or `timeout` elapses.
///
/// Returns whether the condition was observed. The condition is always
/// checked at least once.
pub async fn wait_until<F, Fut>(timeout: Duration, poll_interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await {
            return true;
        }
        let now = tokio::time::Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Keep the items `check` accepts.
///
/// `check` takes each item and hands it back with its verdict. Items whose
/// check fails, such as nodes detached since they were queried, are dropped
/// instead of failing the whole lookup.
pub async fn retain_readable<T, F, Fut>(items: Vec<T>, mut check: F) -> Vec<T>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = (T, Result<bool, LocatorError>)>,
{
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        match check(item).await {
            (item, Ok(true)) => kept.push(item),
            (_, Ok(false)) => {}
            (_, Err(e)) => debug!("Skipping unreadable element: {}", e),
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_wait_until_immediate() {
        let met = wait_until(Duration::from_millis(50), Duration::from_millis(10), || async {
            true
        })
        .await;
        assert!(met);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_eventually() {
        let calls = AtomicUsize::new(0);
        let met = wait_until(Duration::from_secs(5), Duration::from_millis(100), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { n >= 3 }
        })
        .await;
        assert!(met);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_times_out() {
        let calls = AtomicUsize::new(0);
        let met = wait_until(Duration::from_secs(1), Duration::from_millis(250), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { false }
        })
        .await;
        assert!(!met);
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_retain_readable_skips_failed_checks() {
        let kept = retain_readable(vec![1, 2, 3, 4], |n| async move {
            if n == 2 {
                (n, Err(LocatorError::Browser("node detached".to_string())))
            } else {
                (n, Ok(n != 4))
            }
        })
        .await;
        assert_eq!(kept, vec![1, 3]);
    }
}
