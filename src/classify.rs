//! Heuristic commit type classification from diff text.
//!
//! Keyword-count scoring: each conventional commit type has a keyword list,
//! the type whose keywords occur most often in the lowercased diff wins.
//! The result is a best-effort hint, not an oracle.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Conventional commit types recognized by the validator and classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Chore,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Perf => "perf",
            CommitType::Test => "test",
            CommitType::Chore => "chore",
        }
    }

    /// All recognized types, in validator/prompt enumeration order.
    pub fn all() -> &'static [CommitType] {
        &[
            CommitType::Feat,
            CommitType::Fix,
            CommitType::Docs,
            CommitType::Style,
            CommitType::Refactor,
            CommitType::Perf,
            CommitType::Test,
            CommitType::Chore,
        ]
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feat" => Ok(Self::Feat),
            "fix" => Ok(Self::Fix),
            "docs" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "refactor" => Ok(Self::Refactor),
            "perf" => Ok(Self::Perf),
            "test" => Ok(Self::Test),
            "chore" => Ok(Self::Chore),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

/// A suggested commit type with its keyword score.
///
/// Persisted transiently between the pre-stage and message-validation hook
/// points (single slot, overwritten each cycle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitTypeHint {
    pub label: CommitType,
    pub score: u32,
}

/// Keywords per type. Specific types come before `feat` so that a tie on a
/// generic word like "add" does not drown out a test- or docs-heavy diff.
const KEYWORDS: &[(CommitType, &[&str])] = &[
    (
        CommitType::Test,
        &["test", "spec", "unittest", "assert", ".test.", "_test", "testing"],
    ),
    (
        CommitType::Docs,
        &["readme", "doc", "documentation", "changelog", ".md", "comment"],
    ),
    (
        CommitType::Style,
        &["format", "lint", "eslint", "prettier", "style", "indent", "whitespace"],
    ),
    (
        CommitType::Fix,
        &["fix", "bug", "error", "issue", "problem", "resolve", "patch"],
    ),
    (
        CommitType::Perf,
        &["performance", "perf", "speed", "optimize", "cache", "memory"],
    ),
    (
        CommitType::Refactor,
        &["refactor", "cleanup", "simplify", "restructure", "reorganize"],
    ),
    (
        CommitType::Chore,
        &["dependency", "deps", "package.json", "cargo.toml", "requirements", "config", "build"],
    ),
    (
        CommitType::Feat,
        &["add", "new", "feature", "implement", "create", "introduce"],
    ),
];

/// Count non-overlapping occurrences of `needle` in `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> u32 {
    haystack.matches(needle).count() as u32
}

/// Classify diff text into the most likely commit type.
///
/// Falls back to `feat` with score 0 when no keyword matches at all.
pub fn classify(text: &str) -> CommitTypeHint {
    let lower = text.to_lowercase();

    let mut best = CommitTypeHint {
        label: CommitType::Feat,
        score: 0,
    };

    for (commit_type, words) in KEYWORDS {
        let score: u32 = words.iter().map(|w| count_occurrences(&lower, w)).sum();
        if score > best.score {
            best = CommitTypeHint {
                label: *commit_type,
                score,
            };
        }
    }

    debug!(
        "Classified diff as '{}' (score: {})",
        best.label, best.score
    );
    best
}
