//! Commit message shape validation and local heuristic improvement.
//!
//! Validation is advisory: it never blocks a commit, it only feeds the
//! improver and the logs. The improver is deliberately non-AI; trailing
//! period, capitalization, and a keyword-classified type prefix are all it
//! touches.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::classify::{CommitType, CommitTypeHint, classify};
use crate::pipeline::cleanup::MAX_MESSAGE_LENGTH;

fn type_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(feat|fix|docs|style|refactor|perf|test|chore)(\([a-z0-9_./-]+\))?: ")
            .expect("type prefix regex is valid")
    })
}

/// Individual shape checks for a commit message's first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChecks {
    pub length_ok: bool,
    pub has_type: bool,
    pub capitalized: bool,
    pub no_period: bool,
}

impl MessageChecks {
    pub fn is_valid(&self) -> bool {
        self.length_ok && self.has_type && self.capitalized && self.no_period
    }
}

/// Locate a recognized `type:` / `type(scope):` prefix. Returns the type and
/// the byte offset where the description starts.
pub fn parse_type_prefix(line: &str) -> Option<(CommitType, usize)> {
    let captures = type_prefix_re().captures(line)?;
    let matched = captures.get(0)?;
    let commit_type = captures.get(1)?.as_str().parse().ok()?;
    Some((commit_type, matched.end()))
}

/// Validate the shape of a candidate commit message.
///
/// Checks the first line only: length ceiling, recognized type prefix,
/// capitalized first character after the prefix, no trailing period.
pub fn validate_message(message: &str) -> MessageChecks {
    let first_line = message.lines().next().unwrap_or("").trim_end();

    let prefix = parse_type_prefix(first_line);
    let description = match prefix {
        Some((_, end)) => &first_line[end..],
        None => first_line,
    };

    MessageChecks {
        length_ok: first_line.chars().count() <= MAX_MESSAGE_LENGTH,
        has_type: prefix.is_some(),
        capitalized: description.chars().next().is_some_and(char::is_uppercase),
        no_period: !first_line.ends_with('.'),
    }
}

/// Apply local heuristic fixes to an invalid commit message.
///
/// Strips the trailing period, prepends a keyword-classified type when the
/// prefix is missing, and capitalizes the first description character. The
/// body, if any, is preserved untouched. Returns `None` when nothing
/// changed.
///
/// `diff_hint` is the type suggestion persisted by the pre-stage analysis;
/// it breaks the tie when the message text itself matches no keywords.
pub fn improve_message(message: &str, diff_hint: Option<&CommitTypeHint>) -> Option<String> {
    let mut lines = message.lines();
    let first_line = lines.next().unwrap_or("").trim().to_string();
    if first_line.is_empty() {
        return None;
    }

    let mut improved = first_line.trim_end_matches('.').trim_end().to_string();

    let (prefix, mut description) = match parse_type_prefix(&improved) {
        Some((commit_type, end)) => (commit_type, improved[end..].to_string()),
        None => {
            let message_hint = classify(&improved);
            let label = if message_hint.score > 0 {
                message_hint.label
            } else if let Some(hint) = diff_hint.filter(|h| h.score > 0) {
                hint.label
            } else {
                message_hint.label
            };
            let mut description = improved.clone();

            // "fix bug" classified as fix would otherwise become
            // "fix: fix bug"; drop the leading duplicate of the label.
            let label_word = format!("{} ", label);
            if description.to_lowercase().starts_with(&label_word) {
                description = description[label_word.len()..].to_string();
            }

            (label, description)
        }
    };

    description = capitalize_first(description.trim());
    improved = format!("{}: {}", prefix, description);

    if improved == first_line {
        return None;
    }

    let body: Vec<&str> = lines.collect();
    if body.is_empty() {
        Some(improved)
    } else {
        Some(format!("{}\n{}", improved, body.join("\n")))
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
