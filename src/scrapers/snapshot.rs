//! Page backend over saved HTML documents.
//!
//! Answers locator queries with the `scraper` crate instead of a live
//! browser. Used to re-run extraction against pages saved from the site and
//! as the page double in tests.
//!
//! Navigation is modelled as a sequence of pages: activating a pagination
//! control ("Next" or a page number) moves to the following snapshot. Other
//! activations, such as consent buttons or tab switches, are recorded and
//! otherwise ignored.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::locator::{ElementLocator, LocatorError, PageSession};

/// Element captured from a snapshot page.
#[derive(Debug, Clone)]
pub struct SnapshotElement {
    tag: String,
    html: String,
    text: String,
    attrs: Vec<(String, String)>,
}

impl SnapshotElement {
    fn from_ref(element: ElementRef<'_>) -> Self {
        Self {
            tag: element.value().name().to_string(),
            html: element.html(),
            text: rendered_text(element),
            attrs: element
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn is_displayed(&self) -> bool {
        if self.attr("hidden").is_some() || self.attr("aria-hidden") == Some("true") {
            return false;
        }
        let style = self
            .attr("style")
            .unwrap_or_default()
            .replace(' ', "")
            .to_ascii_lowercase();
        !style.contains("display:none") && !style.contains("visibility:hidden")
    }

    fn is_enabled(&self) -> bool {
        self.attr("disabled").is_none() && self.attr("aria-disabled") != Some("true")
    }

    /// Whether activating this element turns the page.
    fn is_page_control(&self) -> bool {
        let label = self.attr("aria-label").unwrap_or_default().to_lowercase();
        let text = self.text.trim();
        label.contains("next")
            || text.to_lowercase().contains("next")
            || (!text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
    }

    fn describe(&self) -> String {
        let label = self.attr("aria-label").unwrap_or(self.text.trim());
        format!("<{}> {}", self.tag, label)
    }
}

/// A [`PageSession`] over a fixed sequence of HTML pages.
pub struct SnapshotSession {
    pages: Vec<String>,
    current: Mutex<usize>,
    opened: Mutex<Vec<String>>,
    activations: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl SnapshotSession {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            current: Mutex::new(0),
            opened: Mutex::new(Vec::new()),
            activations: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Load snapshot pages from files, in the order given.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> std::io::Result<Self> {
        let pages = paths
            .iter()
            .map(std::fs::read_to_string)
            .collect::<std::io::Result<Vec<_>>>()?;
        Ok(Self::new(pages))
    }

    /// Zero-based index of the page currently shown.
    pub fn page_index(&self) -> usize {
        *lock(&self.current)
    }

    /// URLs passed to [`PageSession::open`].
    pub fn opened_urls(&self) -> Vec<String> {
        lock(&self.opened).clone()
    }

    /// Descriptions of every activated element, in order.
    pub fn activations(&self) -> Vec<String> {
        lock(&self.activations).clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn current_page(&self) -> Result<Html, LocatorError> {
        let index = self.page_index();
        self.pages
            .get(index)
            .map(|html| Html::parse_document(html))
            .ok_or_else(|| LocatorError::Navigation(format!("no snapshot page {}", index + 1)))
    }

    /// Run `f` over the elements selected in the current page or in `scope`.
    fn select<T>(
        &self,
        scope: Option<&SnapshotElement>,
        selector: &str,
        f: impl Fn(ElementRef<'_>) -> Option<T>,
    ) -> Result<Vec<T>, LocatorError> {
        let selector = parse_selector(selector)?;
        match scope {
            None => {
                let document = self.current_page()?;
                Ok(document.select(&selector).filter_map(f).collect())
            }
            Some(scope) => {
                let fragment = Html::parse_fragment(&scope.html);
                let root = fragment
                    .root_element()
                    .children()
                    .find_map(ElementRef::wrap)
                    .map(|e| e.id());
                // Like querySelectorAll, the scope element itself never matches.
                Ok(fragment
                    .select(&selector)
                    .filter(|e| Some(e.id()) != root)
                    .filter_map(f)
                    .collect())
            }
        }
    }
}

#[async_trait]
impl ElementLocator for SnapshotSession {
    type Element = SnapshotElement;

    async fn find_by_marker(
        &self,
        scope: Option<&SnapshotElement>,
        selector: &str,
    ) -> Result<Vec<SnapshotElement>, LocatorError> {
        self.select(scope, selector, |e| Some(SnapshotElement::from_ref(e)))
    }

    async fn find_by_label(
        &self,
        tags: &[&str],
        label: &str,
    ) -> Result<Vec<SnapshotElement>, LocatorError> {
        let elements = self.select(None, &tags.join(", "), |e| {
            Some(SnapshotElement::from_ref(e))
        })?;
        Ok(elements
            .into_iter()
            .filter(|e| {
                e.attr("aria-label").is_some_and(|l| l.contains(label)) || e.text.contains(label)
            })
            .collect())
    }

    async fn text_blocks(
        &self,
        scope: Option<&SnapshotElement>,
    ) -> Result<Vec<String>, LocatorError> {
        self.select(scope, "*", |e| {
            let name = e.value().name();
            if name == "script" || name == "style" {
                return None;
            }
            let owns_text = e
                .children()
                .filter_map(|c| c.value().as_text())
                .any(|t| !t.trim().is_empty());
            let element = SnapshotElement::from_ref(e);
            (owns_text && element.is_displayed()).then_some(element.text)
        })
    }

    async fn text(&self, element: &SnapshotElement) -> Result<String, LocatorError> {
        Ok(element.text.clone())
    }

    async fn is_interactable(&self, element: &SnapshotElement) -> Result<bool, LocatorError> {
        Ok(element.is_displayed() && element.is_enabled())
    }

    async fn activate(&self, element: &SnapshotElement) -> Result<(), LocatorError> {
        lock(&self.activations).push(element.describe());
        if !element.is_page_control() {
            return Ok(());
        }
        let mut current = lock(&self.current);
        if *current + 1 >= self.pages.len() {
            return Err(LocatorError::NotInteractable(element.describe()));
        }
        *current += 1;
        Ok(())
    }
}

#[async_trait]
impl PageSession for SnapshotSession {
    async fn open(&self, url: &str) -> Result<(), LocatorError> {
        lock(&self.opened).push(url.to_string());
        if self.pages.is_empty() {
            return Err(LocatorError::Navigation(format!("nothing to render for {}", url)));
        }
        *lock(&self.current) = 0;
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn parse_selector(selector: &str) -> Result<Selector, LocatorError> {
    Selector::parse(selector)
        .map_err(|e| LocatorError::NotFound(format!("invalid selector {}: {:?}", selector, e)))
}

/// Approximate `innerText`: trimmed text nodes joined by newlines.
fn rendered_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
