/// Key normalization utilities
///
/// This module derives canonical lookup keys from free-text identifiers:
/// client names become project slugs, transaction-event codes become
/// uniqueness keys, and invited email addresses are folded to their
/// canonical form before storage and comparison.
///
/// # Contract
///
/// - Output is lowercase.
/// - Runs of whitespace and separator punctuation collapse to a single `-`.
/// - `@`, `.` and `+` survive so a normalized email still matches the
///   email stored on the user row.
/// - Normalization is idempotent: `normalize_key(normalize_key(x)) ==
///   normalize_key(x)`.
/// - Empty or whitespace-only input normalizes to the empty string;
///   callers must reject empty keys wherever uniqueness matters.
///
/// # Example
///
/// ```
/// use verto_shared::keys::normalize_key;
///
/// assert_eq!(normalize_key("  Acme Corp  "), "acme-corp");
/// assert_eq!(normalize_key("Dev / Staging"), "dev-staging");
/// assert_eq!(normalize_key("Jane.Doe@Example.COM"), "jane.doe@example.com");
/// assert_eq!(normalize_key("   "), "");
/// ```

/// Derives a canonical lowercase key from free text
///
/// Suitable both as a uniqueness key and as a URL segment. See the
/// module docs for the full contract.
pub fn normalize_key(input: &str) -> String {
    let mut key = String::with_capacity(input.len());
    let mut pending_separator = false;

    for ch in input.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+') {
            if pending_separator && !key.is_empty() {
                key.push('-');
            }
            pending_separator = false;
            key.push(ch);
        } else {
            // Whitespace and every other punctuation character act as
            // separators; runs collapse into one hyphen.
            pending_separator = true;
        }
    }

    key
}

/// Returns true if the input normalizes to a non-empty key
///
/// Convenience guard for callers that must reject blank identifiers
/// before hitting a uniqueness constraint.
pub fn is_normalizable(input: &str) -> bool {
    !normalize_key(input).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_hyphenates() {
        assert_eq!(normalize_key("Acme Corp"), "acme-corp");
        assert_eq!(normalize_key("PROD"), "prod");
        assert_eq!(normalize_key("Dev Environment 2"), "dev-environment-2");
    }

    #[test]
    fn test_collapses_separator_runs() {
        assert_eq!(normalize_key("a   b"), "a-b");
        assert_eq!(normalize_key("a--b"), "a-b");
        assert_eq!(normalize_key("a -_- b"), "a-b");
        assert_eq!(normalize_key("Dev / Staging"), "dev-staging");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(normalize_key("  acme  "), "acme");
        assert_eq!(normalize_key("--acme--"), "acme");
    }

    #[test]
    fn test_preserves_email_characters() {
        assert_eq!(normalize_key("Jane.Doe@Example.COM"), "jane.doe@example.com");
        assert_eq!(normalize_key("jane+invites@example.com"), "jane+invites@example.com");
        assert_eq!(normalize_key("b@my-co.com"), "b@my-co.com");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("   "), "");
        assert_eq!(normalize_key("!!!"), "");
        assert!(!is_normalizable("   "));
        assert!(is_normalizable("acme"));
    }

    #[test]
    fn test_idempotent() {
        for input in ["Acme Corp", "  a -- b  ", "Jane.Doe@Example.COM", "!!!", "a b c"] {
            let once = normalize_key(input);
            assert_eq!(normalize_key(&once), once, "not idempotent for {:?}", input);
        }
    }
}
