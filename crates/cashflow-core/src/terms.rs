//! Payment-terms parsing.

/// Extracts the number of days granted by a free-text payment term.
///
/// Recognizes `Net N`, `N days`, a bare `N`, and the immediate-payment forms
/// (`Due on receipt`, `Due upon receipt`, `COD`). Anything else yields `None`.
pub fn parse_terms_days(text: &str) -> Option<u32> {
    let normalized = text.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if matches!(
        normalized.as_str(),
        "due on receipt" | "due upon receipt" | "upon receipt" | "cod" | "immediate"
    ) {
        return Some(0);
    }

    let tokens: Vec<&str> = normalized
        .split(|ch: char| ch.is_whitespace() || ch == '-')
        .filter(|token| !token.is_empty())
        .collect();
    match tokens.as_slice() {
        [days] => days.parse().ok(),
        ["net", days] => days.parse().ok(),
        ["net", days, "days" | "day"] => days.parse().ok(),
        [days, "days" | "day"] => days.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_terms_days;

    #[test]
    fn parses_net_terms() {
        assert_eq!(parse_terms_days("Net 30"), Some(30));
        assert_eq!(parse_terms_days("  net 15 "), Some(15));
        assert_eq!(parse_terms_days("NET-60"), Some(60));
        assert_eq!(parse_terms_days("Net 90 days"), Some(90));
    }

    #[test]
    fn parses_day_counts_and_receipt_terms() {
        assert_eq!(parse_terms_days("45 days"), Some(45));
        assert_eq!(parse_terms_days("10"), Some(10));
        assert_eq!(parse_terms_days("Due on receipt"), Some(0));
        assert_eq!(parse_terms_days("COD"), Some(0));
    }

    #[test]
    fn rejects_unrecognized_terms() {
        assert_eq!(parse_terms_days(""), None);
        assert_eq!(parse_terms_days("2/10 Net 30"), None);
        assert_eq!(parse_terms_days("end of month"), None);
        assert_eq!(parse_terms_days("Net thirty"), None);
    }
}
