//! Post-processing of raw provider output into a commit subject.

/// Maximum length of the returned message.
pub const MAX_MESSAGE_LENGTH: usize = 72;

/// Messages over the maximum are cut here before the ellipsis is appended.
const TRUNCATED_LENGTH: usize = 69;

const ELLIPSIS: &str = "...";

/// Clean a raw provider response into a single-line commit subject.
///
/// Collapses internal whitespace runs to single spaces, strips wrapping
/// quote characters, and truncates anything beyond [`MAX_MESSAGE_LENGTH`]
/// characters to [`TRUNCATED_LENGTH`] plus a three-character ellipsis.
/// Counts are in characters, so multi-byte text never splits mid-scalar.
pub fn clean_message(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = collapsed
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string();

    if stripped.chars().count() > MAX_MESSAGE_LENGTH {
        let mut truncated: String = stripped.chars().take(TRUNCATED_LENGTH).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        stripped
    }
}
