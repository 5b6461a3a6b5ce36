//! Prompt construction for commit message generation.

use crate::classify::{CommitType, CommitTypeHint};
use crate::git::DiffPayload;

/// Hard ceiling for the generated subject line.
pub const MAX_SUBJECT_LENGTH: usize = 72;

/// Maximum characters of sanitized diff included in the prompt.
const MAX_DIFF_PROMPT_LENGTH: usize = 30_000;

/// Up to two example subjects per type, shown when the classifier has a
/// suggestion for the diff.
const EXAMPLE_SUBJECTS: &[(CommitType, [&str; 2])] = &[
    (
        CommitType::Feat,
        [
            "feat: add session timeout handling",
            "feat(auth): introduce token refresh",
        ],
    ),
    (
        CommitType::Fix,
        [
            "fix: handle empty input in parser",
            "fix(api): correct timeout on large payloads",
        ],
    ),
    (
        CommitType::Docs,
        [
            "docs: document cache eviction behavior",
            "docs(readme): add installation steps",
        ],
    ),
    (
        CommitType::Style,
        [
            "style: normalize import ordering",
            "style: fix indentation in config module",
        ],
    ),
    (
        CommitType::Refactor,
        [
            "refactor: extract retry logic into helper",
            "refactor(store): simplify schema setup",
        ],
    ),
    (
        CommitType::Perf,
        [
            "perf: cache compiled validation regex",
            "perf(diff): avoid quadratic path dedup",
        ],
    ),
    (
        CommitType::Test,
        [
            "test: cover expired cache lookups",
            "test(hooks): add non-blocking invariant cases",
        ],
    ),
    (
        CommitType::Chore,
        [
            "chore: bump git2 to 0.19",
            "chore: update release profile settings",
        ],
    ),
];

/// Build the generation prompt: a fixed-structure instruction block
/// followed by the sanitized diff, optionally augmented with the
/// classifier's suggested type and example subjects for it.
pub fn build_prompt(payload: &DiffPayload, hint: Option<&CommitTypeHint>) -> String {
    let files_section: String = payload
        .changed_files
        .iter()
        .map(|f| format!("- {} ({})", f.path, f.status))
        .collect::<Vec<_>>()
        .join("\n");

    let type_list = CommitType::all()
        .iter()
        .map(|t| format!("- {}: {}", t, type_description(*t)))
        .collect::<Vec<_>>()
        .join("\n");

    let hint_section = hint
        .filter(|h| h.score > 0)
        .map(|h| {
            let mut section = format!("\nSUGGESTED TYPE (from a heuristic scan): {}\n", h.label);
            if let Some(examples) = examples_for(h.label) {
                section.push_str("Examples of well-formed subjects for this type:\n");
                for example in examples {
                    section.push_str(&format!("- {example}\n"));
                }
            }
            section
        })
        .unwrap_or_default();

    let sanitized_diff = sanitize_diff(&payload.diff_text, MAX_DIFF_PROMPT_LENGTH);

    let truncation_note = if payload.truncated {
        "\n\nNote: The diff was truncated due to size. Focus on the visible changes."
    } else {
        ""
    };

    format!(
        r#"Analyze the following staged Git changes and generate a concise, descriptive commit message.

RULES FOR THE MESSAGE:
1. At most {MAX_SUBJECT_LENGTH} characters
2. Format: `type: description` or `type(scope): description`
3. Description starts with a capitalized imperative verb (Add, Fix, Remove)
4. Be specific about what changed; no long explanations
5. No trailing period

VALID TYPES:
{type_list}
{hint_section}
STAGED FILES ({additions} additions, {deletions} deletions):
{files_section}

DIFF:
```
{sanitized_diff}
```{truncation_note}

COMMIT MESSAGE:"#,
        additions = payload.additions,
        deletions = payload.deletions,
    )
}

fn type_description(t: CommitType) -> &'static str {
    match t {
        CommitType::Feat => "new functionality",
        CommitType::Fix => "bug fix",
        CommitType::Docs => "documentation",
        CommitType::Style => "formatting",
        CommitType::Refactor => "restructuring without behavior change",
        CommitType::Perf => "performance improvement",
        CommitType::Test => "tests",
        CommitType::Chore => "maintenance tasks",
    }
}

fn examples_for(t: CommitType) -> Option<&'static [&'static str; 2]> {
    EXAMPLE_SUBJECTS
        .iter()
        .find(|(kind, _)| *kind == t)
        .map(|(_, examples)| examples)
}

/// Sanitize diff text for inclusion in a prompt: strip control characters
/// (keeping newlines and tabs) and cap the length at a char boundary.
fn sanitize_diff(text: &str, max_len: usize) -> String {
    let mut result: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    if result.len() > max_len {
        let mut end = max_len;
        while end > 0 && !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{ChangedFile, FileStatus};

    fn payload(diff_text: &str) -> DiffPayload {
        DiffPayload {
            diff_text: diff_text.to_string(),
            changed_files: vec![ChangedFile {
                path: "src/lib.rs".to_string(),
                status: FileStatus::Modified,
                old_path: None,
            }],
            truncated: false,
            additions: 3,
            deletions: 1,
        }
    }

    #[test]
    fn test_prompt_includes_diff_and_files() {
        let prompt = build_prompt(&payload("+pub fn added() {}\n"), None);
        assert!(prompt.contains("pub fn added()"));
        assert!(prompt.contains("src/lib.rs (Modified)"));
    }

    #[test]
    fn test_prompt_enumerates_all_types() {
        let prompt = build_prompt(&payload("+x\n"), None);
        for t in CommitType::all() {
            assert!(prompt.contains(&format!("- {}:", t)));
        }
    }

    #[test]
    fn test_prompt_states_length_ceiling() {
        let prompt = build_prompt(&payload("+x\n"), None);
        assert!(prompt.contains("72 characters"));
    }

    #[test]
    fn test_hint_adds_suggestion_and_examples() {
        let hint = CommitTypeHint {
            label: CommitType::Fix,
            score: 5,
        };
        let prompt = build_prompt(&payload("+x\n"), Some(&hint));
        assert!(prompt.contains("SUGGESTED TYPE"));
        assert!(prompt.contains("fix: handle empty input in parser"));
    }

    #[test]
    fn test_zero_score_hint_is_omitted() {
        let hint = CommitTypeHint {
            label: CommitType::Feat,
            score: 0,
        };
        let prompt = build_prompt(&payload("+x\n"), Some(&hint));
        assert!(!prompt.contains("SUGGESTED TYPE"));
    }

    #[test]
    fn test_truncation_note() {
        let mut p = payload("+x\n");
        p.truncated = true;
        let prompt = build_prompt(&p, None);
        assert!(prompt.contains("truncated due to size"));
    }

    #[test]
    fn test_sanitize_strips_control_chars() {
        let sanitized = sanitize_diff("+line\x1b[31m one\x07\n\tkeep\n", 1000);
        assert!(!sanitized.contains('\x1b'));
        assert!(!sanitized.contains('\x07'));
        assert!(sanitized.contains("\n\tkeep"));
    }

    #[test]
    fn test_sanitize_caps_length_at_char_boundary() {
        let text = "é".repeat(20_000); // 2 bytes each
        let sanitized = sanitize_diff(&text, 30_000);
        assert!(sanitized.len() <= 30_000);
        assert!(sanitized.is_char_boundary(sanitized.len()));
    }

    #[test]
    fn test_every_type_has_examples() {
        for t in CommitType::all() {
            assert!(examples_for(*t).is_some(), "{} has no examples", t);
        }
    }
}
