//! Turn recognized text fragments into signed numeric tokens
//!
//! The magnitude and the sign are kept apart: the magnitude is always
//! non-negative and the sign lives in `is_negative`, so a user can flip the
//! sign of a token without re-parsing its text.

use crate::document::Token;
use crate::id::TokenId;

/// Normalize one recognized fragment into a token
pub fn build_token(text: &str, confidence: Option<f64>) -> Token {
    Token {
        id: TokenId::generate(),
        text: text.to_string(),
        normalized_value: parse_magnitude(text),
        is_negative: infers_negative(text),
        confidence,
        corrected_by_user: false,
    }
}

/// Split recognized text on whitespace and normalize every fragment
///
/// The recognizer reports a single confidence for the whole pass, so the
/// same value is attached to every token.
pub fn tokenize(text: &str, confidence: Option<f64>) -> Vec<Token> {
    text.split_whitespace()
        .map(|fragment| build_token(fragment, confidence))
        .collect()
}

/// Keep only digits, `.` and `-`, then parse what remains as a decimal
///
/// Returns `None` for fragments with no parseable number in them.
pub fn parse_magnitude(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(f64::abs)
}

/// Accounting notation: `(12.00)` or a leading minus marks a negative amount
pub fn infers_negative(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.starts_with('-') {
        return true;
    }
    match trimmed.find('(') {
        Some(open) => trimmed[open + 1..].contains(')'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_amount() {
        let token = build_token("12.50", Some(0.9));
        assert_eq!(token.normalized_value, Some(12.5));
        assert!(!token.is_negative);
        assert_eq!(token.confidence, Some(0.9));
        assert!(!token.corrected_by_user);
        assert_eq!(token.text, "12.50");
    }

    #[test]
    fn test_parenthesized_amount_is_negative() {
        let token = build_token("(45.00)", None);
        assert_eq!(token.normalized_value, Some(45.0));
        assert!(token.is_negative);
    }

    #[test]
    fn test_leading_minus_is_negative_with_positive_magnitude() {
        let token = build_token("-7.25", None);
        assert_eq!(token.normalized_value, Some(7.25));
        assert!(token.is_negative);
    }

    #[test]
    fn test_noise_has_no_value() {
        let token = build_token("abc", Some(0.4));
        assert_eq!(token.normalized_value, None);
        assert!(!token.is_negative);
    }

    #[test]
    fn test_currency_and_separators_are_stripped() {
        assert_eq!(parse_magnitude("$1,234.56"), Some(1234.56));
        assert_eq!(parse_magnitude("USD100"), Some(100.0));
        assert_eq!(parse_magnitude("(3.00),"), Some(3.0));
    }

    #[test]
    fn test_unparseable_remainders() {
        assert_eq!(parse_magnitude("1.2.3"), None);
        assert_eq!(parse_magnitude("12-"), None);
        assert_eq!(parse_magnitude("-"), None);
        assert_eq!(parse_magnitude("."), None);
        assert_eq!(parse_magnitude(""), None);
    }

    #[test]
    fn test_unbalanced_parenthesis_is_not_negative() {
        assert!(!infers_negative("(12.00"));
        assert!(!infers_negative("12.00)"));
        assert!(infers_negative(" (12.00)"));
    }

    #[test]
    fn test_tokenize_splits_on_whitespace() {
        let tokens = tokenize("  12.50\n(3.00)\t\ttotal  ", Some(88.0));
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["12.50", "(3.00)", "total"]);
        assert!(tokens.iter().all(|t| t.confidence == Some(88.0)));
        assert_eq!(tokens[2].normalized_value, None);
    }

    #[test]
    fn test_tokenize_empty_text() {
        assert!(tokenize("   \n", None).is_empty());
    }
}
