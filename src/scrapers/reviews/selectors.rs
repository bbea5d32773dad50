//! Layout selectors and text patterns for the listing's review pages.
//!
//! The site ships obfuscated class names that change without notice, so each
//! field has a stable `data-testid` marker first and class-based fallbacks
//! after it. Selector lists are tried in order.

use std::sync::LazyLock;

use regex::Regex;

/// One rendered review.
pub const REVIEW_CARD: &str = "[data-testid='review-card']";

pub const REVIEWER_NAME: &[&str] = &[".a3332d346a.e6208ee469"];
pub const REVIEWER_COUNTRY: &[&str] = &[".afac1f68d9.a1ad95c055"];
pub const REVIEW_DATE: &[&str] = &["[data-testid='review-date']"];
pub const REVIEW_TITLE: &[&str] = &[
    "[data-testid='review-title']",
    ".f6431b446c.c5811cad6b.ee8547574e",
];
pub const STAY_DATE: &[&str] = &["[data-testid='review-stay-date']", ".d88f1120c1"];
pub const TRAVELER_TYPE: &[&str] = &["[data-testid='review-traveler-type']"];
pub const NIGHTS: &[&str] = &["[data-testid='review-num-nights']"];

/// Score element; the first selector holds the bare number.
pub const RATING: &str = ".a3b8729ab1 div + div";
/// Score wrapper whose text reads "Scored 8.0".
pub const RATING_WRAPPER: &str = ".a3b8729ab1";

pub const ROOM_TYPE: &str = "[data-testid='review-room-name']";
/// Generic text container that sometimes holds the room name, sometimes not.
pub const ROOM_TYPE_LOOSE: &str =
    ".abf093bdfe:not(.d88f1120c1):not(.f45d8e4c32):not(.a1ad95c055)";

pub const PROS: &str = "[data-testid='review-positive-text'] .a53cbfa6de";
pub const CONS: &str = "[data-testid='review-negative-text'] .a53cbfa6de";
/// Untagged pros/cons blocks: first is pros, second is cons.
pub const REVIEW_BLOCKS: &str = ".c402354066 .a53cbfa6de";

/// Prefix the site puts before the review date.
pub const REVIEW_DATE_PREFIX: &str = "Reviewed:";
/// Prefix on the wrapper-based score text.
pub const SCORE_PREFIX: &str = "Scored";

/// Words that mark loose room-type text as really being a room name.
pub const ROOM_KEYWORDS: &[&str] = &["Double", "King", "Room"];

/// Traveler categories, matched in this order against the card text.
pub const TRAVELER_TYPES: &[&str] = &[
    "Family",
    "Solo traveler",
    "Solo traveller",
    "Couple",
    "Business",
    "Group",
    "Friends",
];

/// Cookie banner accept button.
pub const CONSENT_BUTTON_IDS: &str = "button[id*='accept']";
pub const CONSENT_LABEL: &str = "Accept";

/// Controls that switch the listing to its reviews tab.
pub const REVIEWS_TAB_LINK: &str = "a[href*='#tab-reviews']";
pub const REVIEWS_TAB_LABEL: &str = "Reviews";

/// Pagination.
pub const NEXT_LABEL: &str = "Next";
pub const NEXT_CLASS_LINK: &str = "a[class*='next']";
pub const ACTIVE_PAGE: &str = "li.bui-pagination__item--active, span.current";
pub const PAGE_LINKS: &str = "a.bui-pagination__link, a.page_link";

/// Heading used when no inline review count is found.
pub const GUEST_REVIEWS_HEADING: &str = "h2";
pub const GUEST_REVIEWS_LABEL: &str = "Guest reviews";

/// "1,234 reviews" anywhere in the page text.
pub static REVIEW_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,.]*)\s*reviews?\b").unwrap());

/// Leading number of the guest reviews heading.
pub static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,.]*)").unwrap());

/// Nights stayed, e.g. "3 nights".
pub static NIGHTS_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*nights?").unwrap());
