//! Near-duplicate detection for resubmitted snippets.
//!
//! A new snippet is a duplicate of a stored one when both come from the same
//! user for the same file inside the dedup window, and the normalized new code
//! is a case-insensitive prefix of the normalized stored code.

pub const DEFAULT_DEDUP_WINDOW_MINUTES: i64 = 60;
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;

/// Flattens line breaks and collapses double spaces.
///
/// Each step is a single left-to-right pass, so a run of three spaces comes
/// out as two. Stored rows were compared this way from the start, so the
/// result must stay byte-for-byte the same.
pub fn normalize(code: &str) -> String {
    code.replace('\n', " ").replace('\r', " ").replace("  ", " ")
}

/// Whether `normalized_new` duplicates `stored_code`.
///
/// `normalized_new` must already have gone through [`normalize`]; the stored
/// code is normalized here.
pub fn is_similar(normalized_new: &str, stored_code: &str) -> bool {
    normalize(stored_code)
        .to_lowercase()
        .starts_with(&normalized_new.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_become_spaces() {
        assert_eq!(normalize("a\nb"), "a b");
        assert_eq!(normalize("a\rb"), "a b");
        assert_eq!(normalize("a\nb"), normalize("a\rb"));
    }

    #[test]
    fn crlf_collapses_to_one_space() {
        assert_eq!(normalize("a\r\nb"), "a b");
    }

    #[test]
    fn double_space_collapses_once() {
        assert_eq!(normalize("a  b"), "a b");

        let three = normalize("a   b");
        assert_eq!(three, "a  b");
        assert_ne!(three, "a b");

        // four spaces are two pairs
        assert_eq!(normalize("a    b"), "a  b");
    }

    #[test]
    fn not_idempotent_on_long_runs() {
        let once = normalize("x     y");
        assert_ne!(normalize(&once), once);
    }

    #[test]
    fn prefix_match_ignores_case() {
        let new = normalize("CONST x = 1");
        assert!(is_similar(&new, "const x = 1;\nconsole.log(x)"));
        assert!(is_similar(&new, "const x = 1"));
        assert!(!is_similar(&new, "let x = 1"));
    }

    #[test]
    fn longer_new_code_is_not_similar_to_shorter_stored() {
        let new = normalize("const x = 1; const y = 2");
        assert!(!is_similar(&new, "const x = 1"));
    }

    #[test]
    fn pattern_characters_are_literal() {
        let new = normalize("a%");
        assert!(!is_similar(&new, "abc"));
        assert!(is_similar(&new, "a%bc"));

        let new = normalize("a_c");
        assert!(!is_similar(&new, "abc"));
    }
}
