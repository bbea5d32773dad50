//! Harvesting every review card on the rendered page.

use tracing::{info, warn};

use super::extract::FieldExtractor;
use super::selectors as sel;
use crate::models::ReviewRecord;
use crate::scrapers::locator::ElementLocator;

/// Extract all reviews currently rendered.
///
/// Cards that cannot be read are logged and skipped. A page without cards,
/// or one where the card lookup itself fails, yields no records.
pub async fn harvest_page<L: ElementLocator>(locator: &L) -> Vec<ReviewRecord> {
    let cards = match locator.find_by_marker(None, sel::REVIEW_CARD).await {
        Ok(cards) => cards,
        Err(e) => {
            warn!("Could not list review cards: {}", e);
            return Vec::new();
        }
    };
    info!("Found {} review containers", cards.len());

    let extractor = FieldExtractor::new(locator);
    let mut records = Vec::with_capacity(cards.len());
    for (idx, card) in cards.iter().enumerate() {
        match extractor.extract(card).await {
            Ok(record) => records.push(record),
            Err(e) => warn!("Error extracting review {}: {}", idx, e),
        }
    }
    records
}
