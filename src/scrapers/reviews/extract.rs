//! Field extraction from a single review card.
//!
//! Every field is looked up on its own: a primary marker, then one or two
//! fallbacks, then a pattern over the card's text. A field that cannot be
//! found gets its default and never stops the rest of the card.

use tracing::debug;

use super::selectors as sel;
use crate::models::{ReviewRecord, ANONYMOUS_REVIEWER};
use crate::scrapers::locator::{ElementLocator, LocatorError};

/// Extracts [`ReviewRecord`]s from review cards.
pub struct FieldExtractor<'a, L: ElementLocator> {
    locator: &'a L,
}

impl<'a, L: ElementLocator> FieldExtractor<'a, L> {
    pub fn new(locator: &'a L) -> Self {
        Self { locator }
    }

    /// Extract one review.
    ///
    /// Fails only when the card itself can no longer be read (for example a
    /// node detached by a re-render); individual fields always fall back.
    pub async fn extract(&self, card: &L::Element) -> Result<ReviewRecord, LocatorError> {
        let card_text = self.locator.text(card).await?;

        let pros = self.pros(card).await;
        let cons = self.cons(card).await;

        Ok(ReviewRecord {
            reviewer_name: self
                .first_text(card, sel::REVIEWER_NAME)
                .await
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| ANONYMOUS_REVIEWER.to_string()),
            reviewer_country: self
                .first_text(card, sel::REVIEWER_COUNTRY)
                .await
                .unwrap_or_default(),
            stay_date: self.first_text(card, sel::STAY_DATE).await.unwrap_or_default(),
            review_type: self.review_type(card, &card_text).await,
            review_date: self.review_date(card).await,
            room_type: self.room_type(card).await,
            nights_stayed: self.nights_stayed(card, &card_text).await,
            rating: self.rating(card).await,
            review_title: self
                .first_text(card, sel::REVIEW_TITLE)
                .await
                .unwrap_or_default(),
            review_text: ReviewRecord::compose_text(&pros, &cons),
        })
    }

    /// Trimmed text of the first element matched by any of `selectors`.
    ///
    /// The first selector that finds an element wins, even if its text is
    /// empty.
    async fn first_text(&self, card: &L::Element, selectors: &[&str]) -> Option<String> {
        for selector in selectors {
            match self.element_text(card, selector).await {
                Ok(Some(text)) => return Some(text),
                Ok(None) => {}
                Err(e) => debug!("Selector {} failed: {}", selector, e),
            }
        }
        None
    }

    async fn element_text(
        &self,
        card: &L::Element,
        selector: &str,
    ) -> Result<Option<String>, LocatorError> {
        match self.locator.first_by_marker(Some(card), selector).await? {
            Some(element) => Ok(Some(self.locator.text(&element).await?.trim().to_string())),
            None => Ok(None),
        }
    }

    async fn review_date(&self, card: &L::Element) -> String {
        let text = self
            .first_text(card, sel::REVIEW_DATE)
            .await
            .unwrap_or_default();
        match text.strip_prefix(sel::REVIEW_DATE_PREFIX) {
            Some(rest) => rest.trim().to_string(),
            None => text,
        }
    }

    async fn rating(&self, card: &L::Element) -> String {
        if let Some(score) = self.first_text(card, &[sel::RATING]).await {
            return score;
        }
        self.first_text(card, &[sel::RATING_WRAPPER])
            .await
            .map(|text| text.replace(sel::SCORE_PREFIX, "").trim().to_string())
            .unwrap_or_default()
    }

    async fn room_type(&self, card: &L::Element) -> String {
        if let Some(room) = self.first_text(card, &[sel::ROOM_TYPE]).await {
            return room;
        }
        // The loose container also holds unrelated text; keep it only when it
        // reads like a room name.
        self.first_text(card, &[sel::ROOM_TYPE_LOOSE])
            .await
            .filter(|text| looks_like_room(text))
            .unwrap_or_default()
    }

    async fn nights_stayed(&self, card: &L::Element, card_text: &str) -> String {
        match self.first_text(card, sel::NIGHTS).await {
            Some(text) if text.contains("night") => nights_in(&text).unwrap_or(text),
            Some(text) => text,
            None => nights_in(card_text).unwrap_or_default(),
        }
    }

    async fn review_type(&self, card: &L::Element, card_text: &str) -> String {
        if let Some(kind) = self.first_text(card, sel::TRAVELER_TYPE).await {
            return kind;
        }
        traveler_type_in(card_text).unwrap_or_default().to_string()
    }

    async fn pros(&self, card: &L::Element) -> String {
        if let Some(text) = self.first_text(card, &[sel::PROS]).await {
            return text;
        }
        self.review_block(card, 0).await
    }

    async fn cons(&self, card: &L::Element) -> String {
        if let Some(text) = self.first_text(card, &[sel::CONS]).await {
            return text;
        }
        self.review_block(card, 1).await
    }

    /// Untagged pros/cons block by position.
    async fn review_block(&self, card: &L::Element, index: usize) -> String {
        let blocks = match self
            .locator
            .find_by_marker(Some(card), sel::REVIEW_BLOCKS)
            .await
        {
            Ok(blocks) => blocks,
            Err(e) => {
                debug!("Review blocks unavailable: {}", e);
                return String::new();
            }
        };
        match blocks.get(index) {
            Some(block) => self
                .locator
                .text(block)
                .await
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            None => String::new(),
        }
    }
}

fn looks_like_room(text: &str) -> bool {
    sel::ROOM_KEYWORDS.iter().any(|k| text.contains(k))
}

fn nights_in(text: &str) -> Option<String> {
    sel::NIGHTS_COUNT
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// First known traveler category mentioned in `text`.
pub fn traveler_type_in(text: &str) -> Option<&'static str> {
    sel::TRAVELER_TYPES
        .iter()
        .copied()
        .find(|kind| text.contains(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::COLUMNS;
    use crate::scrapers::locator::PageSession;
    use crate::scrapers::snapshot::SnapshotSession;

    const FULL_CARD: &str = r#"
        <div data-testid="review-card">
          <div class="a3332d346a e6208ee469">Maria</div>
          <span class="afac1f68d9 a1ad95c055">Portugal</span>
          <span data-testid="review-room-name">Deluxe King Room</span>
          <span data-testid="review-num-nights">3 nights</span>
          <span data-testid="review-stay-date">May 2024</span>
          <span data-testid="review-traveler-type">Couple</span>
          <span data-testid="review-date">Reviewed: 12 May 2024</span>
          <h3 data-testid="review-title">Lovely stay</h3>
          <div class="a3b8729ab1"><div>Scored</div><div>9.0</div></div>
          <div data-testid="review-positive-text"><div class="a53cbfa6de">Great breakfast</div></div>
          <div data-testid="review-negative-text"><div class="a53cbfa6de">Thin walls</div></div>
        </div>
    "#;

    const FALLBACK_CARD: &str = r#"
        <div data-testid="review-card">
          <span class="abf093bdfe">Double Room with View</span>
          <span class="d88f1120c1">June 2023</span>
          <p>Stayed 2 nights · Solo traveller</p>
          <div class="f6431b446c c5811cad6b ee8547574e">Fine</div>
          <div class="a3b8729ab1">Scored 7.5</div>
          <div class="c402354066">
            <div class="a53cbfa6de">Location</div>
            <div class="a53cbfa6de">Parking</div>
          </div>
        </div>
    "#;

    async fn extract_from(card_html: &str) -> ReviewRecord {
        let page = format!("<html><body>{}</body></html>", card_html);
        let session = SnapshotSession::new(vec![page]);
        session.open("https://example.test").await.unwrap();
        let card = session
            .first_by_marker(None, sel::REVIEW_CARD)
            .await
            .unwrap()
            .unwrap();
        FieldExtractor::new(&session).extract(&card).await.unwrap()
    }

    #[tokio::test]
    async fn test_extract_primary_selectors() {
        let record = extract_from(FULL_CARD).await;
        assert_eq!(record.reviewer_name, "Maria");
        assert_eq!(record.reviewer_country, "Portugal");
        assert_eq!(record.room_type, "Deluxe King Room");
        assert_eq!(record.nights_stayed, "3");
        assert_eq!(record.stay_date, "May 2024");
        assert_eq!(record.review_type, "Couple");
        assert_eq!(record.review_date, "12 May 2024");
        assert_eq!(record.review_title, "Lovely stay");
        assert_eq!(record.rating, "9.0");
        assert_eq!(record.review_text, "Pros: Great breakfast\nCons: Thin walls");
    }

    #[tokio::test]
    async fn test_extract_fallbacks() {
        let record = extract_from(FALLBACK_CARD).await;
        assert_eq!(record.reviewer_name, ANONYMOUS_REVIEWER);
        assert_eq!(record.reviewer_country, "");
        assert_eq!(record.room_type, "Double Room with View");
        assert_eq!(record.stay_date, "June 2023");
        assert_eq!(record.nights_stayed, "2");
        assert_eq!(record.review_type, "Solo traveller");
        assert_eq!(record.review_title, "Fine");
        assert_eq!(record.rating, "7.5");
        assert_eq!(record.review_text, "Pros: Location\nCons: Parking");
    }

    #[tokio::test]
    async fn test_extract_empty_card_has_every_field() {
        let record = extract_from(r#"<div data-testid="review-card"></div>"#).await;
        assert_eq!(record, ReviewRecord::default());

        let json = serde_json::to_value(&record).unwrap();
        for column in &COLUMNS[1..] {
            assert!(json.get(column).is_some(), "missing {}", column);
        }
    }

    #[tokio::test]
    async fn test_loose_room_text_is_filtered() {
        let record = extract_from(
            r#"<div data-testid="review-card"><span class="abf093bdfe">Helpful?</span></div>"#,
        )
        .await;
        assert_eq!(record.room_type, "");
    }

    #[tokio::test]
    async fn test_pros_only_has_no_cons_section() {
        let record = extract_from(
            r#"<div data-testid="review-card">
                 <div data-testid="review-positive-text"><div class="a53cbfa6de">Clean</div></div>
               </div>"#,
        )
        .await;
        assert_eq!(record.review_text, "Pros: Clean");
    }

    #[tokio::test]
    async fn test_nights_element_without_keyword_kept_verbatim() {
        let record = extract_from(
            r#"<div data-testid="review-card"><span data-testid="review-num-nights">·</span></div>"#,
        )
        .await;
        assert_eq!(record.nights_stayed, "·");
    }

    #[test]
    fn test_traveler_type_order() {
        assert_eq!(traveler_type_in("Family with young children"), Some("Family"));
        // Earlier categories win when several appear
        assert_eq!(traveler_type_in("Couple · Business trip"), Some("Couple"));
        assert_eq!(traveler_type_in("Group of Friends"), Some("Group"));
        assert_eq!(traveler_type_in("Solo traveler"), Some("Solo traveler"));
        assert_eq!(traveler_type_in("nothing here"), None);
    }

    #[test]
    fn test_looks_like_room() {
        assert!(looks_like_room("Superior King"));
        assert!(!looks_like_room("Translate"));
    }
}
