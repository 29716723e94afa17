//! Region aggregation
//!
//! Always recomputed from the full token list; never patched incrementally.

use crate::document::Token;

/// Signed sum of a token list
///
/// Tokens without a usable value are skipped. The stored magnitude is
/// treated as unsigned and the sign comes only from `is_negative`.
pub fn sum_tokens(tokens: &[Token]) -> f64 {
    tokens.iter().filter_map(Token::signed_value).sum()
}
