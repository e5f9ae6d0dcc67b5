use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const GITHUB_DIR: &str = ".github";
pub const WORKFLOWS_DIR: &str = ".github/workflows";
pub const ACTIONS_DIR: &str = ".github/actions";
pub const CONFIG_FILE: &str = ".github/actpin.yaml";

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn workflows_dir(root: &Path) -> PathBuf {
    root.join(WORKFLOWS_DIR)
}

pub fn actions_dir(root: &Path) -> PathBuf {
    root.join(ACTIONS_DIR)
}

// ---------------------------------------------------------------------------
// File predicates
// ---------------------------------------------------------------------------

/// Any `.yml` / `.yaml` file under the workflows directory.
pub fn is_workflow_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

/// A composite action manifest: `action.yml` or `action.yaml`.
pub fn is_action_manifest(path: &Path) -> bool {
    matches!(
        path.file_name().and_then(|n| n.to_str()),
        Some("action.yml") | Some("action.yaml")
    )
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Every workflow and composite action manifest under `root`, sorted.
/// Missing directories contribute nothing. Symlinked directories below the
/// scanned roots are not followed.
pub fn discover(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(&workflows_dir(root), is_workflow_file, &mut found)?;
    walk(&actions_dir(root), is_action_manifest, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, keep: fn(&Path) -> bool, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && keep(entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(())
}
