//! A workflow or action manifest held in memory with its parsed usages.

use crate::error::{PinError, Result};
use crate::paths;
use crate::rewrite::{self, LineBuffer};
use crate::usage::{self, ActionUsage};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct WorkflowFile {
    pub path: PathBuf,
    pub buffer: LineBuffer,
    pub usages: Vec<ActionUsage>,
}

impl WorkflowFile {
    /// Parse `content` line by line, recording every remote action usage.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Self {
        let buffer = LineBuffer::from_content(content);
        let usages = buffer
            .lines()
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                usage::parse_line(line).map(|mut u| {
                    u.line = idx;
                    u
                })
            })
            .collect();
        Self {
            path: path.into(),
            buffer,
            usages,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(path, &content))
    }

    /// Rewrite usage `index` to `reference` / `comment`. Returns true when the
    /// line text changed.
    pub fn apply(&mut self, index: usize, reference: &str, comment: &str) -> bool {
        match self.usages.get_mut(index) {
            Some(usage) => rewrite::apply(&mut self.buffer, usage, reference, comment),
            None => false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer.is_dirty()
    }

    /// Write the buffer back to `path` if any line changed. Returns whether a
    /// write happened.
    pub fn save(&self) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        crate::io::atomic_write(&self.path, self.buffer.render().as_bytes())?;
        tracing::debug!(path = %self.path.display(), "saved workflow");
        Ok(true)
    }
}

/// Load every workflow and composite action manifest under `root`. Files that
/// are not valid UTF-8 are skipped.
pub fn load_all(root: &Path) -> Result<Vec<WorkflowFile>> {
    let mut files = Vec::new();
    for path in paths::discover(root)? {
        match WorkflowFile::load(&path) {
            Ok(file) => files.push(file),
            Err(PinError::Io(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(path = %path.display(), "skipping file that is not valid UTF-8");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(files)
}

pub fn usage_count(files: &[WorkflowFile]) -> usize {
    files.iter().map(|f| f.usages.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WORKFLOW: &str = "\
name: ci
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v5
      - uses: ./.github/actions/local
      - name: cache
        uses: actions/cache@v4 # v4
      - run: echo done
";

    #[test]
    fn parse_records_line_indices() {
        let wf = WorkflowFile::parse("ci.yml", WORKFLOW);
        assert_eq!(wf.usages.len(), 2);
        assert_eq!(wf.usages[0].line, 6);
        assert_eq!(wf.usages[0].line_number(), 7);
        assert_eq!(wf.usages[1].line, 9);
        assert_eq!(wf.usages[1].comment, "v4");
    }

    #[test]
    fn unchanged_file_is_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ci.yml");
        std::fs::write(&path, WORKFLOW).unwrap();
        let mut wf = WorkflowFile::load(&path).unwrap();
        let (r, c) = (wf.usages[1].reference.clone(), wf.usages[1].comment.clone());
        assert!(!wf.apply(1, &r, &c));
        assert!(!wf.save().unwrap());
    }

    #[test]
    fn apply_and_save_touch_only_the_usage_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ci.yml");
        std::fs::write(&path, WORKFLOW).unwrap();

        let mut wf = WorkflowFile::load(&path).unwrap();
        let sha = "08c6903cd8c0fde910a37f88322edcfb5dd907a8";
        assert!(wf.apply(0, sha, "v5"));
        assert!(wf.save().unwrap());

        let written = std::fs::read_to_string(&path).unwrap();
        let expected = WORKFLOW.replace(
            "      - uses: actions/checkout@v5",
            &format!("      - uses: actions/checkout@{sha} # v5"),
        );
        assert_eq!(written, expected);
    }

    #[test]
    fn load_all_reads_discovered_files() {
        let dir = TempDir::new().unwrap();
        let wf_dir = dir.path().join(".github/workflows");
        std::fs::create_dir_all(&wf_dir).unwrap();
        std::fs::write(wf_dir.join("ci.yml"), WORKFLOW).unwrap();
        let action_dir = dir.path().join(".github/actions/setup");
        std::fs::create_dir_all(&action_dir).unwrap();
        std::fs::write(
            action_dir.join("action.yml"),
            "runs:\n  using: composite\n  steps:\n    - uses: actions/setup-node@v4\n",
        )
        .unwrap();

        let files = load_all(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(usage_count(&files), 3);
    }

    #[test]
    fn load_all_skips_binary_files() {
        let dir = TempDir::new().unwrap();
        let wf_dir = dir.path().join(".github/workflows");
        std::fs::create_dir_all(&wf_dir).unwrap();
        std::fs::write(wf_dir.join("ci.yml"), WORKFLOW).unwrap();
        std::fs::write(wf_dir.join("junk.yml"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();

        let files = load_all(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("ci.yml"));
    }
}
