//! In-place reconstruction of `uses:` lines.

use crate::usage::ActionUsage;

/// The ordered lines of one file plus a flag recording whether any line was
/// rewritten since load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    dirty: bool,
}

impl LineBuffer {
    /// Split `content` into lines, treating `\r\n` as `\n`.
    pub fn from_content(content: &str) -> Self {
        let normalized = content.replace("\r\n", "\n");
        Self {
            lines: normalized.split('\n').map(str::to_string).collect(),
            dirty: false,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Overwrite one line; the buffer is only marked dirty when the text changes.
    pub fn set_line(&mut self, index: usize, text: String) {
        if let Some(slot) = self.lines.get_mut(index) {
            if *slot != text {
                *slot = text;
                self.dirty = true;
            }
        }
    }

    /// Joined content, always ending in a newline.
    pub fn render(&self) -> String {
        let mut content = self.lines.join("\n");
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content
    }
}

/// Build the full replacement line for `usage` pinned to `reference` with `comment`.
pub fn render_line(usage: &ActionUsage, reference: &str, comment: &str) -> String {
    let value = format!("{}@{}", usage.spec.full_path(), reference.to_lowercase());
    let value = usage.quoted.wrap(&value);
    let separator = if usage.separator.is_empty() {
        " "
    } else {
        usage.separator.as_str()
    };
    let mut line = format!("{}uses:{}{}", usage.indent, separator, value);
    if !comment.is_empty() {
        line.push_str(" # ");
        line.push_str(comment);
    }
    line
}

/// Rewrite the line owned by `usage` inside `buffer` and record the new
/// ref/comment on the usage. Returns true when the line text changed.
pub fn apply(buffer: &mut LineBuffer, usage: &mut ActionUsage, reference: &str, comment: &str) -> bool {
    let line = render_line(usage, reference, comment);
    let changed = buffer.line(usage.line) != Some(line.as_str());
    buffer.set_line(usage.line, line);
    usage.reference = reference.to_lowercase();
    usage.comment = comment.to_string();
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::{parse_line, Quote};

    const SHA: &str = "08c6903cd8c0fde910a37f88322edcfb5dd907a8";

    fn load(line: &str) -> (LineBuffer, ActionUsage) {
        let buffer = LineBuffer::from_content(&format!("steps:\n{line}\n"));
        let mut usage = parse_line(line).unwrap();
        usage.line = 1;
        (buffer, usage)
    }

    #[test]
    fn pins_ref_and_appends_comment() {
        let (mut buffer, mut usage) = load("      - uses: actions/checkout@v5");
        assert!(apply(&mut buffer, &mut usage, SHA, "v5"));
        assert_eq!(
            buffer.line(1),
            Some(format!("      - uses: actions/checkout@{SHA} # v5").as_str())
        );
        assert!(buffer.is_dirty());
        assert_eq!(usage.reference, SHA);
        assert_eq!(usage.comment, "v5");
        assert_eq!(buffer.line(0), Some("steps:"));
    }

    #[test]
    fn unchanged_pair_does_not_dirty_the_buffer() {
        let line = format!("      - uses: actions/checkout@{SHA} # v5");
        let (mut buffer, mut usage) = load(&line);
        assert!(!apply(&mut buffer, &mut usage, SHA, "v5"));
        assert!(!buffer.is_dirty());
        assert_eq!(buffer.line(1), Some(line.as_str()));
    }

    #[test]
    fn preserves_quote_style_and_separator() {
        let (mut buffer, mut usage) = load("  uses:\t'owner/repo/sub@v1' # v1 keep");
        apply(&mut buffer, &mut usage, &SHA.to_uppercase(), "v1 keep");
        assert_eq!(
            buffer.line(1),
            Some(format!("  uses:\t'owner/repo/sub@{SHA}' # v1 keep").as_str())
        );

        let (mut buffer, mut usage) = load(r#"  uses: "owner/repo@v1""#);
        apply(&mut buffer, &mut usage, SHA, "");
        assert_eq!(
            buffer.line(1),
            Some(format!(r#"  uses: "owner/repo@{SHA}""#).as_str())
        );
        assert_eq!(usage.quoted, Quote::Double);
    }

    #[test]
    fn missing_separator_becomes_one_space() {
        let (mut buffer, mut usage) = load("- uses:owner/repo@v1");
        apply(&mut buffer, &mut usage, SHA, "v1");
        assert_eq!(buffer.line(1), Some(format!("- uses: owner/repo@{SHA} # v1").as_str()));
    }

    #[test]
    fn rewritten_line_parses_back_to_the_same_usage() {
        let (mut buffer, mut usage) = load(r#"    - uses: "Owner/Repo/path@v2" # v2 pinned"#);
        apply(&mut buffer, &mut usage, SHA, "v2.1.0 pinned");
        let mut reparsed = parse_line(buffer.line(1).unwrap()).unwrap();
        reparsed.line = 1;
        assert_eq!(reparsed, usage);
    }

    #[test]
    fn render_keeps_trailing_newline_and_normalizes_crlf() {
        let buffer = LineBuffer::from_content("a\r\nb\r\n");
        assert_eq!(buffer.lines(), ["a", "b", ""]);
        assert_eq!(buffer.render(), "a\nb\n");
        assert_eq!(LineBuffer::from_content("a\nb").render(), "a\nb\n");
    }
}
