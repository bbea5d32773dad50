//! Data models for harvested reviews.

mod review;

pub use review::{
    CrawlTarget, ReviewCollection, ReviewRecord, ReviewRow, ReviewTable, ANONYMOUS_REVIEWER,
    COLUMNS,
};
