//! Abbreviated commit hash comparison.

/// Shortest abbreviation accepted as a commit reference.
pub const MIN_SHA_LEN: usize = 7;

/// True if `candidate` is a case-sensitive prefix of `full` of at least
/// [`MIN_SHA_LEN`] characters.
pub fn sha_matches(candidate: &str, full: &str) -> bool {
    candidate.len() >= MIN_SHA_LEN && full.get(..candidate.len()) == Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "f259660b128ae59133dff123998ee9b643aff050";

    #[test]
    fn abbreviated_prefix_matches() {
        assert!(sha_matches("f259660", FULL));
    }

    #[test]
    fn full_hash_matches_itself() {
        assert!(sha_matches(FULL, FULL));
    }

    #[test]
    fn different_prefix_does_not_match() {
        assert!(!sha_matches("aaabbb12", FULL));
    }

    #[test]
    fn short_prefix_is_rejected() {
        assert!(!sha_matches("f25", FULL));
        assert!(!sha_matches("f25966", FULL));
        assert!(!sha_matches("", FULL));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        assert!(!sha_matches("F259660", FULL));
    }

    #[test]
    fn candidate_longer_than_full_does_not_match() {
        assert!(!sha_matches("abcd1234", "abcd123"));
    }
}
