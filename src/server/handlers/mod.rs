//! HTTP request handlers for the web server.

mod api;
mod form;

pub use api::{api_booking, health};
pub use form::{index, submit_form};

/// Parse a requested review maximum given as text. Only plain digits count.
fn parse_max_reviews(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_max_reviews() {
        assert_eq!(parse_max_reviews("20"), Some(20));
        assert_eq!(parse_max_reviews(" 7 "), Some(7));
        assert_eq!(parse_max_reviews(""), None);
        assert_eq!(parse_max_reviews("-5"), None);
        assert_eq!(parse_max_reviews("1e3"), None);
        assert_eq!(parse_max_reviews("99999999999999999999999"), None);
    }
}
