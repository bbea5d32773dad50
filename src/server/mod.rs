//! Web front-end for the review scraper.
//!
//! Serves a form page that scrapes a listing and reports where the CSV
//! went, plus a JSON endpoint returning the reviews themselves.

mod handlers;
mod routes;
mod template_structs;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Settings;
use crate::error::ScrapeError;
use crate::scrapers::reviews::{ReviewScraper, ReviewSource, ScrapeReport};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ReviewSource>,
    /// Held for the length of a scrape so only one runs at a time.
    scrape_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self::with_source(Arc::new(ReviewScraper::new(settings.clone())))
    }

    pub fn with_source(source: Arc<dyn ReviewSource>) -> Self {
        Self {
            source,
            scrape_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Scrape a listing, waiting for any scrape already running.
    pub async fn scrape(
        &self,
        url: &str,
        max_reviews: Option<u64>,
    ) -> Result<ScrapeReport, ScrapeError> {
        let _guard = self.scrape_lock.lock().await;
        self.source.scrape(url, max_reviews).await
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    use crate::listing::PropertyInfo;
    use crate::models::{ReviewCollection, ReviewRecord};
    use crate::scrapers::reviews::CrawlOutcome;

    const LISTING: &str = "https://www.booking.com/hotel/gb/london-visitors.html";

    /// Returns `reviews` canned reviews, or fails when `fail` is set.
    struct StubSource {
        reviews: usize,
        fail: bool,
        /// Report the CSV write as failed.
        unsaved: bool,
        calls: AtomicUsize,
        last_max: std::sync::Mutex<Option<Option<u64>>>,
    }

    impl StubSource {
        fn new(reviews: usize) -> Self {
            Self {
                reviews,
                fail: false,
                unsaved: false,
                calls: AtomicUsize::new(0),
                last_max: std::sync::Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(0)
            }
        }
    }

    #[async_trait]
    impl ReviewSource for StubSource {
        async fn scrape(
            &self,
            url: &str,
            max_reviews: Option<u64>,
        ) -> Result<ScrapeReport, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_max.lock().unwrap() = Some(max_reviews);
            if self.fail {
                return Err(ScrapeError::Session("browser crashed".to_string()));
            }

            let mut collection = ReviewCollection::new();
            collection.extend((0..self.reviews).map(|i| ReviewRecord {
                review_title: format!("Review {}", i + 1),
                ..Default::default()
            }));
            let reviews = collection.finalize();
            let csv_path = (!reviews.is_empty() && !self.unsaved)
                .then(|| PathBuf::from("/tmp/booking_reviews_london-visitors.csv"));

            Ok(ScrapeReport {
                url: url.to_string(),
                property: PropertyInfo::from_url(url),
                target: None,
                reviews,
                outcome: CrawlOutcome::TargetMet,
                pages_visited: 1,
                csv_path,
            })
        }
    }

    fn app(source: Arc<StubSource>) -> axum::Router {
        create_router(AppState::with_source(source))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    async fn post_form(source: Arc<StubSource>, body: &str) -> String {
        let response = app(source)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_string(response).await
    }

    async fn post_json(source: Arc<StubSource>, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app(source)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/booking")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let json = serde_json::from_str(&body_string(response).await).unwrap();
        (status, json)
    }

    fn encoded(url: &str) -> String {
        url.replace(':', "%3A").replace('/', "%2F")
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Arc::new(StubSource::new(0)))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let response = app(Arc::new(StubSource::new(0)))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("<form"));
        assert!(html.contains("max_reviews"));
    }

    #[tokio::test]
    async fn test_form_invalid_url() {
        let source = Arc::new(StubSource::new(5));
        let html = post_form(source.clone(), "url=https%3A%2F%2Fexample.com%2F").await;
        assert!(html.contains("Invalid Booking.com URL."));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_form_success() {
        let source = Arc::new(StubSource::new(3));
        let body = format!("url={}&max_reviews=20", encoded(LISTING));
        let html = post_form(source.clone(), &body).await;

        assert!(html.contains(
            "Successfully scraped 3 reviews for london-visitors. Check booking_reviews_london-visitors.csv"
        ));
        assert_eq!(*source.last_max.lock().unwrap(), Some(Some(20)));
    }

    #[tokio::test]
    async fn test_form_reports_failed_save() {
        let source = Arc::new(StubSource {
            unsaved: true,
            ..StubSource::new(3)
        });
        let body = format!("url={}", encoded(LISTING));
        let html = post_form(source, &body).await;

        assert!(html.contains(
            "Scraped 3 reviews for london-visitors, but saving the CSV file failed."
        ));
        assert!(!html.contains("Check booking_reviews_london-visitors.csv"));
        assert!(html.contains("(not saved)"));
    }

    #[tokio::test]
    async fn test_form_ignores_non_numeric_max() {
        let source = Arc::new(StubSource::new(3));
        let body = format!("url={}&max_reviews=lots", encoded(LISTING));
        post_form(source.clone(), &body).await;
        assert_eq!(*source.last_max.lock().unwrap(), Some(None));
    }

    #[tokio::test]
    async fn test_form_no_reviews() {
        let body = format!("url={}", encoded(LISTING));
        let html = post_form(Arc::new(StubSource::new(0)), &body).await;
        assert!(html.contains("No reviews were found or an error occurred during scraping."));
    }

    #[tokio::test]
    async fn test_form_error_still_renders_page() {
        let body = format!("url={}", encoded(LISTING));
        let html = post_form(Arc::new(StubSource::failing()), &body).await;
        assert!(html.contains("An error occurred: "));
        assert!(html.contains("browser crashed"));
    }

    #[tokio::test]
    async fn test_api_missing_payload() {
        let (status, json) = post_json(Arc::new(StubSource::new(1)), "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No JSON payload provided.");

        let (status, json) = post_json(Arc::new(StubSource::new(1)), "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No JSON payload provided.");
    }

    #[tokio::test]
    async fn test_api_missing_url() {
        let (status, json) =
            post_json(Arc::new(StubSource::new(1)), r#"{"max_reviews": 5}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Booking.com URL is required.");
    }

    #[tokio::test]
    async fn test_api_invalid_url() {
        let source = Arc::new(StubSource::new(1));
        let (status, json) = post_json(
            source.clone(),
            r#"{"url": "https://www.booking.com/hotel/london.html"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid Booking.com URL format.");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_api_no_reviews() {
        let body = format!(r#"{{"url": "{}"}}"#, LISTING);
        let (status, json) = post_json(Arc::new(StubSource::new(0)), &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["error"], "No reviews found or an error occurred.");
    }

    #[tokio::test]
    async fn test_api_success() {
        let body = format!(r#"{{"url": "{}", "max_reviews": 2}}"#, LISTING);
        let (status, json) = post_json(Arc::new(StubSource::new(2)), &body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["url"], LISTING);
        assert_eq!(json["property_name"], "london-visitors");
        assert_eq!(json["max_reviews_requested"], 2);
        assert_eq!(json["reviews_returned"], 2);

        let reviews = json["reviews"].as_array().unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0]["id"], 1);
        assert_eq!(reviews[1]["review_title"], "Review 2");
        assert_eq!(reviews[0].as_object().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn test_api_scrape_failure_is_500() {
        let body = format!(r#"{{"url": "{}"}}"#, LISTING);
        let (status, json) = post_json(Arc::new(StubSource::failing()), &body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("browser crashed"));
    }

    #[tokio::test]
    async fn test_scrapes_run_one_at_a_time() {
        let state = AppState::with_source(Arc::new(StubSource::new(1)));
        let held = state.scrape_lock.clone().lock_owned().await;

        let pending = tokio::spawn({
            let state = state.clone();
            async move { state.scrape(LISTING, None).await.map(|r| r.reviews.len()) }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        drop(held);
        assert_eq!(pending.await.unwrap().unwrap(), 1);
    }
}
