use sha2::{Digest, Sha256};

use super::text::{normalize, strip_html_tags};

/// Generate a content hash for duplicate detection.
///
/// Uses SHA256 of normalized text to detect when content has changed.
/// Normalization rules:
/// - Strip HTML tags
/// - Convert to lowercase
/// - Remove all non-alphanumeric characters (except spaces)
/// - Collapse multiple spaces into single spaces
/// - Trim leading/trailing whitespace
///
/// This makes the hash robust against markup and formatting changes while
/// still detecting meaningful content changes.
pub fn generate_content_hash(content: &str) -> String {
    let normalized = normalize(&strip_html_tags(content));

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_same_hash() {
        let text = "<p>Renewing a passport takes two weeks.</p>";
        assert_eq!(generate_content_hash(text), generate_content_hash(text));
    }

    #[test]
    fn markup_variation_same_hash() {
        let text1 = "<h2>Renewing a passport</h2><p>takes two weeks.</p>";
        let text2 = "Renewing a passport takes two weeks.";
        assert_eq!(generate_content_hash(text1), generate_content_hash(text2));
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let text1 = "Renewing a   PASSPORT takes two weeks";
        let text2 = "  renewing a passport takes two weeks  ";
        assert_eq!(generate_content_hash(text1), generate_content_hash(text2));
    }

    #[test]
    fn different_content_different_hash() {
        let text1 = "Renewing a passport takes two weeks.";
        let text2 = "Renewing a visa takes two weeks.";
        assert_ne!(generate_content_hash(text1), generate_content_hash(text2));
    }

    #[test]
    fn hash_is_sixty_four_hex_characters() {
        let hash = generate_content_hash("Test content");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
