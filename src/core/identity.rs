use sha2::{Digest, Sha256};

/// Derive the stable content-addressed identifier for a match from its
/// canonical detail-page URL.
///
/// The digest is a pure function of the trimmed URL bytes, so the same page
/// maps to the same id across runs and across sources that happen to link
/// the same post. Path case is preserved: `/Match` and `/match` are
/// different pages on some of these sites.
pub fn compute_match_id(canonical_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_url.trim().as_bytes());
    let digest = hex::encode(hasher.finalize());
    // 128 bits of hex is plenty for a primary key over a few thousand posts.
    digest[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_deterministic() {
        let url = "https://www.footballorgin.com/arsenal-vs-chelsea-full-match/";
        assert_eq!(compute_match_id(url), compute_match_id(url));
        assert_eq!(compute_match_id(url).len(), 32);
    }

    #[test]
    fn test_id_trims_whitespace_only() {
        assert_eq!(
            compute_match_id("  https://example.com/a \n"),
            compute_match_id("https://example.com/a")
        );
        // Path case is identity-relevant.
        assert_ne!(
            compute_match_id("https://example.com/Match"),
            compute_match_id("https://example.com/match")
        );
    }

    #[test]
    fn test_id_is_lowercase_hex() {
        let id = compute_match_id("https://example.com/x");
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
