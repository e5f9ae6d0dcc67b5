//! The verify / fix / upgrade / update operations.
//!
//! Each operation works on already-loaded [`WorkflowFile`]s and leaves saving
//! to the caller, which writes each dirty buffer once.

use crate::config::Config;
use crate::error::{PinError, Result};
use crate::resolver::TagResolver;
use crate::version::{is_full_commit_sha, join_comment, split_comment};
use crate::workflow::WorkflowFile;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NotPinned,
    MissingVersion,
    Unresolved,
    Mismatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub path: PathBuf,
    pub line: usize,
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.path.display(), self.line, self.message)
    }
}

/// A usage that was skipped; the rest of the run continues.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub path: PathBuf,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.path.display(), self.line, self.message)
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    /// Lowercase `owner/repo`.
    Repository(String),
}

impl Target {
    pub fn repository(arg: &str) -> Result<Self> {
        let key = arg.trim().to_lowercase();
        let parts: Vec<&str> = key.split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(PinError::InvalidRepository(arg.to_string()));
        }
        Ok(Target::Repository(key))
    }

    fn includes(&self, repo_key: &str) -> bool {
        match self {
            Target::All => true,
            Target::Repository(key) => key == repo_key,
        }
    }
}

fn count_dirty(files: &[WorkflowFile]) -> usize {
    files.iter().filter(|f| f.is_dirty()).count()
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

/// Check that every usage is pinned to the commit its version comment names.
pub fn verify(resolver: &mut TagResolver<'_>, files: &[WorkflowFile], config: &Config) -> Vec<Issue> {
    let mut issues = Vec::new();

    for file in files {
        for usage in &file.usages {
            if config.is_ignored(&usage.spec) {
                continue;
            }
            let full = usage.spec.full_path();
            let mut issue = |kind, message| {
                issues.push(Issue {
                    path: file.path.clone(),
                    line: usage.line_number(),
                    kind,
                    message,
                })
            };

            if !is_full_commit_sha(&usage.reference) {
                issue(
                    IssueKind::NotPinned,
                    format!(
                        "uses {full} is not pinned to a full commit SHA ({})",
                        usage.reference
                    ),
                );
                continue;
            }

            let (version, _) = split_comment(&usage.comment);
            if version.is_empty() {
                issue(
                    IssueKind::MissingVersion,
                    format!("uses {full} is missing a version comment"),
                );
                continue;
            }

            match resolver.resolve_spec(&usage.spec.owner, &usage.spec.repo, &version) {
                Err(e) => issue(
                    IssueKind::Unresolved,
                    format!("failed to resolve {full} spec {version}: {e}"),
                ),
                Ok(r) if !r.commit.eq_ignore_ascii_case(&usage.reference) => issue(
                    IssueKind::Mismatch,
                    format!(
                        "pinned SHA {} does not match {} ({}) for {full} spec {version}",
                        usage.reference, r.tag, r.commit
                    ),
                ),
                Ok(_) => {}
            }
        }
    }

    issues.sort_by(|a, b| a.path.cmp(&b.path).then(a.line.cmp(&b.line)));
    issues
}

// ---------------------------------------------------------------------------
// fix
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize)]
pub struct FixReport {
    pub updated: usize,
    pub files_changed: usize,
    pub warnings: Vec<Warning>,
}

/// Pin every usage to the commit of its version comment. A usage with no
/// comment uses its current ref as the version and gains it as a comment.
pub fn fix(resolver: &mut TagResolver<'_>, files: &mut [WorkflowFile], config: &Config) -> FixReport {
    let mut report = FixReport::default();

    for file in files.iter_mut() {
        for idx in 0..file.usages.len() {
            let usage = &file.usages[idx];
            if config.is_ignored(&usage.spec) {
                continue;
            }

            let (mut version, mut suffix) = split_comment(&usage.comment);
            if version.is_empty() {
                if is_full_commit_sha(&usage.reference) {
                    continue;
                }
                version = usage.reference.clone();
                suffix = String::new();
            }

            let resolution =
                match resolver.resolve_spec(&usage.spec.owner, &usage.spec.repo, &version) {
                    Ok(r) => r,
                    Err(e) => {
                        report.warnings.push(Warning {
                            path: file.path.clone(),
                            line: usage.line_number(),
                            message: format!(
                                "unable to resolve {} version {version}: {e}",
                                usage.spec.full_path()
                            ),
                        });
                        continue;
                    }
                };

            let comment = join_comment(&version, &suffix);
            if resolution.commit.eq_ignore_ascii_case(&usage.reference)
                && comment.eq_ignore_ascii_case(&usage.comment)
            {
                continue;
            }

            file.apply(idx, &resolution.commit, &comment);
            report.updated += 1;
        }
    }

    report.files_changed = count_dirty(files);
    report
}

// ---------------------------------------------------------------------------
// upgrade
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RepoUpgrade {
    pub repository: String,
    pub tag: String,
    pub commit: String,
    pub updated: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct UpgradeReport {
    pub repos: Vec<RepoUpgrade>,
    pub updated: usize,
    pub files_changed: usize,
}

/// Usages of one repository, addressed as (file index, usage index).
struct RepoUsages {
    key: String,
    owner: String,
    repo: String,
    locations: Vec<(usize, usize)>,
}

fn group_by_repository(files: &[WorkflowFile], config: &Config) -> Vec<RepoUsages> {
    let mut groups: Vec<RepoUsages> = Vec::new();
    for (fi, file) in files.iter().enumerate() {
        for (ui, usage) in file.usages.iter().enumerate() {
            if config.is_ignored(&usage.spec) {
                continue;
            }
            let key = usage.spec.repo_key();
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.locations.push((fi, ui)),
                None => groups.push(RepoUsages {
                    key,
                    owner: usage.spec.owner.clone(),
                    repo: usage.spec.repo.clone(),
                    locations: vec![(fi, ui)],
                }),
            }
        }
    }
    groups
}

/// Move every usage of the targeted repositories to their latest release
/// (or to `version` when given), rewriting the comment's version field.
///
/// Any resolution failure aborts the whole upgrade.
pub fn upgrade(
    resolver: &mut TagResolver<'_>,
    files: &mut [WorkflowFile],
    config: &Config,
    target: &Target,
    version: Option<&str>,
) -> Result<UpgradeReport> {
    let groups = group_by_repository(files, config);
    if let Target::Repository(key) = target {
        if !groups.iter().any(|g| &g.key == key) {
            return Err(PinError::RepositoryNotReferenced(key.clone()));
        }
    }

    let mut report = UpgradeReport::default();
    for group in groups.iter().filter(|g| target.includes(&g.key)) {
        let resolution = resolver.latest(&group.owner, &group.repo, version)?;

        let mut modified = 0;
        for &(fi, ui) in &group.locations {
            let usage = &files[fi].usages[ui];
            let (_, suffix) = split_comment(&usage.comment);
            let comment = join_comment(&resolution.tag, &suffix);
            if usage.reference.eq_ignore_ascii_case(&resolution.commit)
                && usage.comment.eq_ignore_ascii_case(&comment)
            {
                continue;
            }
            files[fi].apply(ui, &resolution.commit, &comment);
            modified += 1;
        }

        report.updated += modified;
        report.repos.push(RepoUpgrade {
            repository: format!("{}/{}", group.owner, group.repo),
            tag: resolution.tag,
            commit: resolution.commit,
            updated: modified,
        });
    }

    report.files_changed = count_dirty(files);
    Ok(report)
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct UpdateRecord {
    pub repository: String,
    pub spec: String,
    pub tag: String,
    pub commit: String,
    pub updated: usize,
    pub unchanged: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateReport {
    pub records: Vec<UpdateRecord>,
    pub updated: usize,
    pub files_changed: usize,
    pub warnings: Vec<Warning>,
}

/// Re-resolve each usage's existing version comment and move its pin to the
/// newest commit that still satisfies it.
pub fn update(
    resolver: &mut TagResolver<'_>,
    files: &mut [WorkflowFile],
    config: &Config,
    target: &Target,
) -> Result<UpdateReport> {
    let mut report = UpdateReport::default();
    let mut records: BTreeMap<String, UpdateRecord> = BTreeMap::new();
    let mut found = matches!(target, Target::All);

    for file in files.iter_mut() {
        for idx in 0..file.usages.len() {
            let usage = &file.usages[idx];
            let repo_key = usage.spec.repo_key();
            if !target.includes(&repo_key) || config.is_ignored(&usage.spec) {
                continue;
            }
            found = true;

            let (version, suffix) = split_comment(&usage.comment);
            if version.is_empty() {
                report.warnings.push(Warning {
                    path: file.path.clone(),
                    line: usage.line_number(),
                    message: format!("missing version comment for {}", usage.spec.full_path()),
                });
                continue;
            }

            let resolution =
                match resolver.resolve_spec(&usage.spec.owner, &usage.spec.repo, &version) {
                    Ok(r) => r,
                    Err(e) => {
                        report.warnings.push(Warning {
                            path: file.path.clone(),
                            line: usage.line_number(),
                            message: format!(
                                "unable to resolve {} spec {version}: {e}",
                                usage.spec.full_path()
                            ),
                        });
                        continue;
                    }
                };

            let record = records
                .entry(format!("{repo_key}|{}", version.to_lowercase()))
                .or_insert_with(|| UpdateRecord {
                    repository: format!("{}/{}", usage.spec.owner, usage.spec.repo),
                    spec: version.clone(),
                    tag: String::new(),
                    commit: String::new(),
                    updated: 0,
                    unchanged: 0,
                });
            record.tag = resolution.tag.clone();
            record.commit = resolution.commit.clone();

            let comment = join_comment(&version, &suffix);
            if resolution.commit.eq_ignore_ascii_case(&usage.reference)
                && comment.eq_ignore_ascii_case(&usage.comment)
            {
                record.unchanged += 1;
                continue;
            }

            record.updated += 1;
            file.apply(idx, &resolution.commit, &comment);
            report.updated += 1;
        }
    }

    if !found {
        if let Target::Repository(key) = target {
            return Err(PinError::RepositoryNotReferenced(key.clone()));
        }
    }

    report.records = records.into_values().collect();
    report.files_changed = count_dirty(files);
    Ok(report)
}
