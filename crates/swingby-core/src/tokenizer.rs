//! Token estimation for context-budget management.
//!
//! The retrieval orchestrator assembles context under a token budget; an
//! exact count is not needed, only a stable estimate to decide which
//! entries fit.

/// Quickly estimate token count without tokenization.
///
/// Uses a heuristic ratio of ~3.7 characters per token for English text.
pub fn estimate_tokens(text: &str) -> usize {
    (text.len() as f32 / 3.7).ceil() as usize
}

/// Check if text likely exceeds a token limit using estimation.
pub fn likely_exceeds_limit(text: &str, limit: usize) -> bool {
    estimate_tokens(text) > limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens_empty() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_estimate_tokens_scales_with_length() {
        let short = estimate_tokens("a short sentence");
        let long = estimate_tokens(&"a short sentence ".repeat(100));
        assert!(long > short * 50);
    }

    #[test]
    fn test_likely_exceeds_limit() {
        assert!(!likely_exceeds_limit("small", 100));
        assert!(likely_exceeds_limit(&"x".repeat(1000), 100));
    }
}
