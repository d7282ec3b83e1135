use serde::Serialize;

use crate::error::Result;

/// Characters per token for the estimate
const CHARS_PER_TOKEN: usize = 4;

/// Deterministic token estimate for a piece of text
pub fn estimate_text_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Token estimate of a value's compact JSON serialization
pub fn estimate_tokens<T: Serialize + ?Sized>(value: &T) -> Result<usize> {
    let json = serde_json::to_string(value)?;
    Ok(estimate_text_tokens(&json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_rounds_up() {
        assert_eq!(estimate_text_tokens(""), 0);
        assert_eq!(estimate_text_tokens("abcd"), 1);
        assert_eq!(estimate_text_tokens("abcde"), 2);
        assert_eq!(estimate_text_tokens("ééé"), 1);
    }

    #[test]
    fn test_estimate_uses_compact_json() {
        // {"a":1} is 7 characters
        let value = serde_json::json!({ "a": 1 });
        assert_eq!(estimate_tokens(&value).unwrap(), 2);
    }
}
