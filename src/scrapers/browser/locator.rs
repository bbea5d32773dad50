//! Element queries against the live page.

use async_trait::async_trait;
use chromiumoxide::element::Element;
use tracing::{debug, info, warn};

use super::BrowserSession;
use crate::scrapers::locator::{retain_readable, ElementLocator, LocatorError, PageSession};

/// Resolves once the document has parsed.
const READY_STATE_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
        }
    })
"#;

const INTERACTABLE_FN: &str = r#"
    function() {
        const style = window.getComputedStyle(this);
        const rect = this.getBoundingClientRect();
        return !this.disabled
            && this.getAttribute('aria-disabled') !== 'true'
            && style.display !== 'none'
            && style.visibility !== 'hidden'
            && rect.width > 0 && rect.height > 0;
    }
"#;

/// Visible text of every element that directly owns a text node, as JSON.
const TEXT_BLOCKS_FN: &str = r#"
    function() {
        const blocks = [];
        const walker = document.createTreeWalker(this, NodeFilter.SHOW_ELEMENT);
        let node = walker.nextNode();
        while (node) {
            if (node.tagName !== 'SCRIPT' && node.tagName !== 'STYLE') {
                const ownsText = Array.from(node.childNodes).some(
                    (c) => c.nodeType === Node.TEXT_NODE && c.textContent.trim() !== ''
                );
                if (ownsText && node.getClientRects().length > 0) {
                    blocks.push(node.innerText.trim());
                }
            }
            node = walker.nextNode();
        }
        return JSON.stringify(blocks);
    }
"#;

const CLICK_FN: &str = "function() { this.click(); }";

fn browser_err(e: chromiumoxide::error::CdpError) -> LocatorError {
    LocatorError::Browser(e.to_string())
}

/// Whether the element's aria-label or visible text contains `label`.
async fn label_matches(element: Element, label: &str) -> (Element, Result<bool, LocatorError>) {
    let matched: Result<bool, LocatorError> = async {
        let aria = element
            .attribute("aria-label")
            .await
            .map_err(browser_err)?
            .unwrap_or_default();
        if aria.contains(label) {
            return Ok(true);
        }
        let text = element
            .inner_text()
            .await
            .map_err(browser_err)?
            .unwrap_or_default();
        Ok(text.contains(label))
    }
    .await;
    (element, matched)
}

impl BrowserSession {
    async fn select(
        &self,
        scope: Option<&Element>,
        selector: &str,
    ) -> Result<Vec<Element>, LocatorError> {
        let found = match scope {
            Some(element) => element.find_elements(selector).await,
            None => self.page().find_elements(selector).await,
        };
        found.map_err(browser_err)
    }

    async fn body(&self) -> Result<Element, LocatorError> {
        self.page()
            .find_element("body")
            .await
            .map_err(|e| LocatorError::NotFound(format!("body: {}", e)))
    }
}

#[async_trait]
impl ElementLocator for BrowserSession {
    type Element = Element;

    async fn find_by_marker(
        &self,
        scope: Option<&Element>,
        selector: &str,
    ) -> Result<Vec<Element>, LocatorError> {
        self.select(scope, selector).await
    }

    async fn find_by_label(
        &self,
        tags: &[&str],
        label: &str,
    ) -> Result<Vec<Element>, LocatorError> {
        let candidates = self.select(None, &tags.join(", ")).await?;
        // Nodes replaced by a re-render since the query are skipped
        Ok(retain_readable(candidates, |element| label_matches(element, label)).await)
    }

    async fn text_blocks(&self, scope: Option<&Element>) -> Result<Vec<String>, LocatorError> {
        let returns = match scope {
            Some(element) => element.call_js_fn(TEXT_BLOCKS_FN, false).await,
            None => self.body().await?.call_js_fn(TEXT_BLOCKS_FN, false).await,
        }
        .map_err(browser_err)?;

        let json = returns
            .result
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| LocatorError::Script("text walk returned nothing".to_string()))?;
        serde_json::from_str(&json).map_err(|e| LocatorError::Script(e.to_string()))
    }

    async fn text(&self, element: &Element) -> Result<String, LocatorError> {
        Ok(element
            .inner_text()
            .await
            .map_err(browser_err)?
            .unwrap_or_default())
    }

    async fn is_interactable(&self, element: &Element) -> Result<bool, LocatorError> {
        let returns = element
            .call_js_fn(INTERACTABLE_FN, false)
            .await
            .map_err(browser_err)?;
        Ok(returns
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn activate(&self, element: &Element) -> Result<(), LocatorError> {
        element
            .scroll_into_view()
            .await
            .map_err(|e| LocatorError::NotInteractable(e.to_string()))?;
        element
            .call_js_fn(CLICK_FN, false)
            .await
            .map_err(|e| LocatorError::NotInteractable(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PageSession for BrowserSession {
    async fn open(&self, url: &str) -> Result<(), LocatorError> {
        info!("Navigating to {}", url);
        let timeout = self.load_timeout();

        match tokio::time::timeout(timeout, self.page().goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(LocatorError::Navigation(format!("{}: {}", url, e))),
            Err(_) => return Err(LocatorError::Timeout(timeout)),
        }

        let ready = self.page().evaluate(READY_STATE_SCRIPT.to_string());
        match tokio::time::timeout(timeout, ready).await {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => debug!("Could not check ready state: {}", e),
            Err(_) => warn!("Timeout waiting for page ready state"),
        }
        Ok(())
    }

    async fn close(&self) {
        self.shutdown().await;
    }
}
