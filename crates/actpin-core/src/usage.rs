//! Parsing of single `uses:` lines into structured action references.

use serde::{Deserialize, Serialize};

const USES_KEYWORD: &str = "uses:";

// ---------------------------------------------------------------------------
// ActionSpec
// ---------------------------------------------------------------------------

/// A remote action independent of its version: `owner/repo[/subpath]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub owner: String,
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
}

impl ActionSpec {
    /// Lowercase `owner/repo`; two specs share a repository iff their keys match.
    pub fn repo_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo).to_lowercase()
    }

    /// `owner/repo[/subpath]` as written in the workflow.
    pub fn full_path(&self) -> String {
        match &self.subpath {
            Some(sub) => format!("{}/{}/{}", self.owner, self.repo, sub),
            None => format!("{}/{}", self.owner, self.repo),
        }
    }
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quote {
    #[default]
    None,
    Single,
    Double,
}

impl Quote {
    pub fn wrap(self, value: &str) -> String {
        match self {
            Quote::None => value.to_string(),
            Quote::Single => format!("'{value}'"),
            Quote::Double => format!("\"{value}\""),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionUsage
// ---------------------------------------------------------------------------

/// One `uses:` reference found in a line buffer.
///
/// `line` is the zero-based index into the owning buffer; rewriting writes that
/// index back, so it stays valid for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionUsage {
    pub line: usize,
    pub indent: String,
    pub separator: String,
    pub quoted: Quote,
    pub spec: ActionSpec,
    /// Text after the last `@`, lowercased.
    pub reference: String,
    /// Trimmed text after the first unquoted `#`.
    pub comment: String,
}

impl ActionUsage {
    /// One-based line number for reporting.
    pub fn line_number(&self) -> usize {
        self.line + 1
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse one line of a workflow or action manifest.
///
/// Returns `None` for anything that is not a remote action reference: lines
/// without `uses:`, expressions, local paths, `docker://` images, and values
/// missing an `owner/repo@ref` shape. The returned usage has `line == 0`;
/// callers set the real index.
pub fn parse_line(line: &str) -> Option<ActionUsage> {
    let idx = line.find(USES_KEYWORD)?;
    let indent = &line[..idx];
    let after = &line[idx + USES_KEYWORD.len()..];
    let rest = after.trim_start_matches([' ', '\t']);
    let separator = &after[..after.len() - rest.len()];

    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }

    let (mut value, comment) = split_value_and_comment(rest);
    if value.is_empty() {
        return None;
    }

    let mut quoted = Quote::None;
    if value.len() >= 2 {
        if value.starts_with('"') && value.ends_with('"') {
            quoted = Quote::Double;
        } else if value.starts_with('\'') && value.ends_with('\'') {
            quoted = Quote::Single;
        }
        if quoted != Quote::None {
            value = &value[1..value.len() - 1];
        }
    }

    if value.contains("${{")
        || value.starts_with("./")
        || value.starts_with("../")
        || value.starts_with('/')
        || value.starts_with("docker://")
    {
        return None;
    }

    let (spec_path, reference) = value.rsplit_once('@')?;
    if reference.is_empty() {
        return None;
    }

    let mut pieces = spec_path.split('/');
    let owner = pieces.next().filter(|s| !s.is_empty())?;
    let repo = pieces.next().filter(|s| !s.is_empty())?;
    let subpath: Vec<&str> = pieces.collect();
    let subpath = (!subpath.is_empty()).then(|| subpath.join("/"));

    Some(ActionUsage {
        line: 0,
        indent: indent.to_string(),
        separator: separator.to_string(),
        quoted,
        spec: ActionSpec {
            owner: owner.to_string(),
            repo: repo.to_string(),
            subpath,
        },
        reference: reference.to_lowercase(),
        comment: comment.trim().to_string(),
    })
}

/// Split `value # comment` at the first `#` outside single or double quotes.
/// Both halves are trimmed.
pub fn split_value_and_comment(text: &str) -> (&str, &str) {
    let mut in_single = false;
    let mut in_double = false;
    for (i, c) in text.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => {
                return (text[..i].trim(), text[i + 1..].trim());
            }
            _ => {}
        }
    }
    (text.trim(), "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subpath_and_comment() {
        let usage = parse_line("  - uses: owner/repo/path@ref # note").unwrap();
        assert_eq!(usage.spec.owner, "owner");
        assert_eq!(usage.spec.repo, "repo");
        assert_eq!(usage.spec.subpath.as_deref(), Some("path"));
        assert_eq!(usage.reference, "ref");
        assert_eq!(usage.comment, "note");
        assert_eq!(usage.indent, "  - ");
        assert_eq!(usage.separator, " ");
        assert_eq!(usage.quoted, Quote::None);
    }

    #[test]
    fn keeps_tab_separator_and_lowercases_ref() {
        let usage = parse_line("    uses:\t\tActions/Checkout@V4").unwrap();
        assert_eq!(usage.separator, "\t\t");
        assert_eq!(usage.spec.owner, "Actions");
        assert_eq!(usage.reference, "v4");
        assert_eq!(usage.comment, "");
    }

    #[test]
    fn nested_subpath_is_joined() {
        let usage = parse_line("uses: github/codeql-action/init/sub@v3").unwrap();
        assert_eq!(usage.spec.subpath.as_deref(), Some("init/sub"));
        assert_eq!(usage.spec.full_path(), "github/codeql-action/init/sub");
    }

    #[test]
    fn quote_aware_comment_split() {
        assert_eq!(
            split_value_and_comment("actions/checkout@v3 # use latest v3"),
            ("actions/checkout@v3", "use latest v3")
        );
        assert_eq!(
            split_value_and_comment(r#""owner/repo@v1#x" # keep"#),
            (r#""owner/repo@v1#x""#, "keep")
        );
        assert_eq!(
            split_value_and_comment("'owner/repo@v1#tag'"),
            ("'owner/repo@v1#tag'", "")
        );
    }

    #[test]
    fn quoted_values_record_their_style() {
        let usage = parse_line(r#"- uses: "owner/repo@v1" # keep"#).unwrap();
        assert_eq!(usage.quoted, Quote::Double);
        assert_eq!(usage.reference, "v1");
        assert_eq!(usage.comment, "keep");

        let usage = parse_line("- uses: 'owner/repo@v1'").unwrap();
        assert_eq!(usage.quoted, Quote::Single);
        assert_eq!(usage.comment, "");
    }

    #[test]
    fn hash_inside_quotes_stays_in_the_ref() {
        let usage = parse_line("uses: 'owner/repo@v1#tag'").unwrap();
        assert_eq!(usage.reference, "v1#tag");
        assert_eq!(usage.comment, "");
    }

    #[test]
    fn rejects_non_remote_references() {
        for line in [
            "name: build",
            "  - uses:",
            "  - uses:   # only a comment",
            "  - uses: ./.github/actions/local",
            "  - uses: ../shared/action@v1",
            "  - uses: /abs/action@v1",
            "  - uses: docker://alpine:3.19",
            "  - uses: ${{ matrix.action }}@v1",
            "  - uses: owner/repo",
            "  - uses: owner/repo@",
            "  - uses: repo@v1",
            "  - uses: /repo@v1",
            "  - uses: owner//x@v1",
        ] {
            assert!(parse_line(line).is_none(), "expected rejection: {line}");
        }
    }

    #[test]
    fn repository_identity_is_case_insensitive() {
        let a = parse_line("uses: Actions/Checkout@v4").unwrap().spec;
        let b = parse_line("uses: actions/checkout/sub@v4").unwrap().spec;
        assert_eq!(a.repo_key(), b.repo_key());
        assert_eq!(a.repo_key(), "actions/checkout");
    }
}
