//! JSON API handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use super::super::AppState;
use super::parse_max_reviews;
use crate::listing::{is_valid_listing_url, PropertyInfo};
use crate::models::ReviewRow;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(Serialize)]
struct BookingResponse<'a> {
    success: bool,
    url: &'a str,
    property_name: Option<String>,
    /// Echoed back exactly as sent.
    max_reviews_requested: &'a Value,
    reviews_returned: usize,
    reviews: &'a [ReviewRow],
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Whether a payload counts as missing (`null`, `{}`, `[]`, `""`).
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Scrape a listing: `{"url": "...", "max_reviews": 100}`.
pub async fn api_booking(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let data = match payload {
        Ok(Json(value)) if !is_empty_payload(&value) => value,
        _ => return error_response(StatusCode::BAD_REQUEST, "No JSON payload provided."),
    };

    let Some(url) = data
        .get("url")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
    else {
        return error_response(StatusCode::BAD_REQUEST, "Booking.com URL is required.");
    };

    if !is_valid_listing_url(url) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid Booking.com URL format.");
    }

    let requested = data.get("max_reviews").unwrap_or(&Value::Null);
    let max_reviews = match requested {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_max_reviews(s),
        _ => None,
    };

    match state.scrape(url, max_reviews).await {
        Ok(report) if report.reviews.is_empty() => error_response(
            StatusCode::OK,
            "No reviews found or an error occurred.",
        ),
        Ok(report) => Json(BookingResponse {
            success: true,
            url,
            property_name: PropertyInfo::from_url(url).property_name,
            max_reviews_requested: requested,
            reviews_returned: report.reviews.len(),
            reviews: report.reviews.rows(),
        })
        .into_response(),
        Err(e) => {
            error!("/api/booking failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}
