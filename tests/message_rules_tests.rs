//! Message post-processing and validation rules, end to end.

use epigram::hooks::validate::{improve_message, validate_message};
use epigram::pipeline::clean_message;

#[test]
fn test_truncation_law_over_72_chars() {
    // Anything longer than 72 chars after cleanup comes back at exactly 72,
    // ending in the three-character ellipsis marker.
    for extra in [1usize, 10, 100, 1000] {
        let raw = "x".repeat(72 + extra);
        let cleaned = clean_message(&raw);
        assert_eq!(cleaned.chars().count(), 72);
        assert!(cleaned.ends_with("..."));
    }
}

#[test]
fn test_truncation_law_at_or_under_72_chars() {
    for len in [1usize, 40, 71, 72] {
        let raw = "x".repeat(len);
        let cleaned = clean_message(&raw);
        assert_eq!(cleaned, raw);
    }
}

#[test]
fn test_cleanup_only_normalizes_short_messages() {
    // Under the limit: whitespace collapsing and quote stripping, nothing else.
    assert_eq!(
        clean_message("  \"feat:  add   thing\"  "),
        "feat: add thing"
    );
}

#[test]
fn test_cleaned_messages_with_prefix_validate() {
    let cleaned = clean_message("\"feat: Add the new parser\"");
    assert!(validate_message(&cleaned).is_valid());
}

#[test]
fn test_improver_output_always_validates() {
    for input in [
        "fix bug.",
        "add new feature for users",
        "update the readme documentation",
        "feat: add thing.",
        "refactor cleanup of the module",
    ] {
        let improved = improve_message(input, None).unwrap_or_else(|| input.to_string());
        let checks = validate_message(&improved);
        assert!(
            checks.is_valid(),
            "'{input}' improved to '{improved}' which is still invalid"
        );
    }
}
