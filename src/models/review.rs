//! Review records, the growing collection, and the finalized table.

use serde::{Deserialize, Serialize};

/// Reviewer name used when the card carries none.
pub const ANONYMOUS_REVIEWER: &str = "Anonymous";

/// Output columns, in file order.
pub const COLUMNS: [&str; 11] = [
    "id",
    "reviewer_name",
    "reviewer_country",
    "stay_date",
    "review_type",
    "review_date",
    "room_type",
    "nights_stayed",
    "rating",
    "review_title",
    "review_text",
];

/// One guest review as extracted from a review card.
///
/// Every field is always present. Fields the card did not yield are empty
/// strings, except `reviewer_name` which falls back to [`ANONYMOUS_REVIEWER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub reviewer_name: String,
    pub reviewer_country: String,
    pub stay_date: String,
    pub review_type: String,
    pub review_date: String,
    pub room_type: String,
    pub nights_stayed: String,
    pub rating: String,
    pub review_title: String,
    pub review_text: String,
}

impl Default for ReviewRecord {
    fn default() -> Self {
        Self {
            reviewer_name: ANONYMOUS_REVIEWER.to_string(),
            reviewer_country: String::new(),
            stay_date: String::new(),
            review_type: String::new(),
            review_date: String::new(),
            room_type: String::new(),
            nights_stayed: String::new(),
            rating: String::new(),
            review_title: String::new(),
            review_text: String::new(),
        }
    }
}

impl ReviewRecord {
    /// Combine the positive and negative blocks into a single review text.
    ///
    /// Each block is included only when non-empty; with both present they are
    /// separated by a newline.
    pub fn compose_text(pros: &str, cons: &str) -> String {
        let pros = pros.trim();
        let cons = cons.trim();
        match (pros.is_empty(), cons.is_empty()) {
            (true, true) => String::new(),
            (false, true) => format!("Pros: {}", pros),
            (true, false) => format!("Cons: {}", cons),
            (false, false) => format!("Pros: {}\nCons: {}", pros, cons),
        }
    }
}

/// Reviews collected so far, in pagination order. No deduplication.
#[derive(Debug, Clone, Default)]
pub struct ReviewCollection {
    records: Vec<ReviewRecord>,
}

impl ReviewCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ReviewRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stamp 1-based ids in encounter order and freeze the collection.
    pub fn finalize(self) -> ReviewTable {
        let rows = self
            .records
            .into_iter()
            .enumerate()
            .map(|(i, record)| ReviewRow {
                id: i as u64 + 1,
                record,
            })
            .collect();
        ReviewTable { rows }
    }
}

/// A finalized review with its sequential id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub id: u64,
    #[serde(flatten)]
    pub record: ReviewRecord,
}

impl ReviewRow {
    /// Cell values in [`COLUMNS`] order.
    pub fn values(&self) -> [String; 11] {
        let r = &self.record;
        [
            self.id.to_string(),
            r.reviewer_name.clone(),
            r.reviewer_country.clone(),
            r.stay_date.clone(),
            r.review_type.clone(),
            r.review_date.clone(),
            r.room_type.clone(),
            r.nights_stayed.clone(),
            r.rating.clone(),
            r.review_title.clone(),
            r.review_text.clone(),
        ]
    }
}

/// The finalized dataset handed to persistence and the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewTable {
    rows: Vec<ReviewRow>,
}

impl ReviewTable {
    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[ReviewRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How many reviews a crawl will try to collect.
///
/// Fixed once the count has been resolved. The advertised total is only an
/// estimate, so the target is a soft bound; running out of pages ends the
/// crawl regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrawlTarget {
    pub total_reviews: u64,
    pub max_reviews: Option<u64>,
}

impl CrawlTarget {
    /// A maximum of zero counts as no maximum.
    pub fn new(total_reviews: u64, max_reviews: Option<u64>) -> Self {
        Self {
            total_reviews,
            max_reviews: max_reviews.filter(|m| *m > 0),
        }
    }

    pub fn effective(&self) -> u64 {
        match self.max_reviews {
            Some(max) => self.total_reviews.min(max),
            None => self.total_reviews,
        }
    }

    pub fn is_met(&self, collected: usize) -> bool {
        collected as u64 >= self.effective()
    }
}
