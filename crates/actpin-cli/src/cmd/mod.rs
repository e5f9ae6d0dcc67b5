pub mod fix;
pub mod update;
pub mod upgrade;
pub mod verify;

use crate::auth;
use crate::output::{display_path, print_json};
use actpin_core::config::{Config, WarnLevel};
use actpin_core::github::GitHubClient;
use actpin_core::pin::Warning;
use actpin_core::workflow::{self, WorkflowFile};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

pub const NO_USAGES: &str = "No workflow or composite action usages found.";

/// Global flags shared by every command.
pub struct Options<'a> {
    pub root: &'a Path,
    pub json: bool,
    pub api_url: Option<&'a str>,
    pub token: Option<&'a str>,
}

/// Loaded config and workflow files for one command run.
pub struct Project {
    pub config: Config,
    pub files: Vec<WorkflowFile>,
}

impl Project {
    /// Load config and workflows. Returns `None` when the project has no
    /// remote action usages.
    pub fn load(opts: &Options<'_>) -> anyhow::Result<Option<Self>> {
        let mut config = Config::load(opts.root).context("failed to load .github/actpin.yaml")?;
        if let Some(url) = opts.api_url {
            config.api_url = url.to_string();
        }

        for warning in config.validate() {
            match warning.level {
                WarnLevel::Error => anyhow::bail!("invalid config: {}", warning.message),
                WarnLevel::Warning => eprintln!("warning: {}", warning.message),
            }
        }

        let files = workflow::load_all(opts.root).context("failed to load workflow files")?;
        if workflow::usage_count(&files) == 0 {
            return Ok(None);
        }
        tracing::debug!(files = files.len(), "loaded workflows");

        Ok(Some(Self { config, files }))
    }

    pub fn client(&self, opts: &Options<'_>) -> anyhow::Result<GitHubClient> {
        let token = auth::discover_token(opts.token);
        if token.is_none() {
            tracing::debug!("no token found; using unauthenticated requests");
        }
        GitHubClient::new(&self.config.api_url, token.as_deref(), self.config.timeout())
            .context("failed to create GitHub client")
    }

    /// Write every dirty file once.
    pub fn save(&self, root: &Path) -> anyhow::Result<()> {
        for file in &self.files {
            file.save()
                .with_context(|| format!("failed to write {}", display_path(root, &file.path)))?;
        }
        Ok(())
    }
}

/// Report a project without usages: the empty report under `--json`, a
/// plain notice otherwise.
pub fn no_usages<T: Serialize>(opts: &Options<'_>, empty: &T) -> anyhow::Result<()> {
    if opts.json {
        return print_json(empty);
    }
    println!("{NO_USAGES}");
    Ok(())
}

pub fn print_warnings(root: &Path, warnings: &[Warning]) {
    for w in warnings {
        eprintln!("{}:{} {}", display_path(root, &w.path), w.line, w.message);
    }
}

pub fn print_summary(updated: usize, files_changed: usize) {
    if updated == 0 {
        println!("No changes were required.");
    } else {
        println!("Updated {updated} action reference(s) across {files_changed} file(s).");
    }
}
