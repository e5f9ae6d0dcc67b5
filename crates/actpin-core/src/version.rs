//! Version-spec classification and the `# <version> <suffix>` comment helpers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// SpecKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    /// `major.minor.patch`, optionally with a pre-release/build suffix.
    Exact,
    /// `major.minor`
    Minor,
    /// `major`
    Major,
    /// Anything else; matched by literal equality only.
    Unknown,
}

impl std::fmt::Display for SpecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SpecKind::Exact => "exact",
            SpecKind::Minor => "minor",
            SpecKind::Major => "major",
            SpecKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static COMMIT_SHA_RE: OnceLock<Regex> = OnceLock::new();
static EXACT_RE: OnceLock<Regex> = OnceLock::new();
static MINOR_RE: OnceLock<Regex> = OnceLock::new();
static MAJOR_RE: OnceLock<Regex> = OnceLock::new();

fn commit_sha_re() -> &'static Regex {
    COMMIT_SHA_RE.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{40}$").unwrap())
}

fn exact_re() -> &'static Regex {
    EXACT_RE.get_or_init(|| Regex::new(r"^[vV]?\d+\.\d+\.\d+([-+][0-9A-Za-z_.-]+)?$").unwrap())
}

fn minor_re() -> &'static Regex {
    MINOR_RE.get_or_init(|| Regex::new(r"^[vV]?\d+\.\d+$").unwrap())
}

fn major_re() -> &'static Regex {
    MAJOR_RE.get_or_init(|| Regex::new(r"^[vV]?\d+$").unwrap())
}

/// True for a full 40-character hexadecimal commit hash, in either case.
pub fn is_full_commit_sha(reference: &str) -> bool {
    commit_sha_re().is_match(reference)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify a free-form version spec and return its normalized form.
///
/// Recognized kinds are lowercased and always carry a leading `v`; an
/// unrecognized spec is returned trimmed but otherwise untouched.
pub fn classify(spec: &str) -> (SpecKind, String) {
    let spec = spec.trim();
    if spec.is_empty() {
        return (SpecKind::Unknown, String::new());
    }

    let lower = spec.to_lowercase();
    if exact_re().is_match(&lower) {
        (SpecKind::Exact, ensure_leading_v(&lower))
    } else if minor_re().is_match(&lower) {
        (SpecKind::Minor, ensure_leading_v(&lower))
    } else if major_re().is_match(&lower) {
        (SpecKind::Major, ensure_leading_v(&lower))
    } else {
        (SpecKind::Unknown, spec.to_string())
    }
}

/// Prefix a lowercase `v` to a numeric version, folding a leading `V`.
pub fn ensure_leading_v(spec: &str) -> String {
    if spec.starts_with('v') {
        return spec.to_string();
    }
    if let Some(rest) = spec.strip_prefix('V') {
        return format!("v{rest}");
    }
    if spec.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("v{spec}");
    }
    spec.to_string()
}

/// Does `tag` satisfy the normalized spec of the given kind?
///
/// Minor and major specs match the bare number or any tag that continues it
/// with a `.`, so `v2` matches `v2.3.4` but not `v20.0.0`.
pub fn matches(tag: &str, normalized: &str, kind: SpecKind) -> bool {
    let tag_lower = tag.to_lowercase();
    let spec_lower = normalized.to_lowercase();
    let tag_digits = tag_lower.strip_prefix('v').unwrap_or(&tag_lower);
    let spec_digits = spec_lower.strip_prefix('v').unwrap_or(&spec_lower);

    match kind {
        SpecKind::Exact => tag_digits == spec_digits,
        SpecKind::Minor | SpecKind::Major => {
            tag_digits == spec_digits
                || tag_digits
                    .strip_prefix(spec_digits)
                    .is_some_and(|rest| rest.starts_with('.'))
        }
        SpecKind::Unknown => tag_lower == spec_lower,
    }
}

// ---------------------------------------------------------------------------
// Comment helpers
// ---------------------------------------------------------------------------

/// Split a usage comment into its leading version spec and free-text suffix.
pub fn split_comment(comment: &str) -> (String, String) {
    let comment = comment.trim();
    let Some(version) = comment.split_whitespace().next() else {
        return (String::new(), String::new());
    };
    let suffix = comment[version.len()..].trim();
    (version.to_string(), suffix.to_string())
}

/// Inverse of [`split_comment`].
pub fn join_comment(version: &str, suffix: &str) -> String {
    let suffix = suffix.trim();
    match (version.is_empty(), suffix.is_empty()) {
        (true, _) => suffix.to_string(),
        (false, true) => version.to_string(),
        (false, false) => format!("{version} {suffix}"),
    }
}
