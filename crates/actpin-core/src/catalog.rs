//! The remote tag/release catalog the resolver reads from.
//!
//! A catalog answers `get(path)` with decoded JSON. Paths are relative to the
//! API root, e.g. `repos/actions/checkout/releases?per_page=100&page=1`. A 404
//! must surface as [`PinError::NotFound`] so the resolver can fall back.

use crate::error::{PinError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub trait Catalog {
    /// # Errors
    ///
    /// `PinError::NotFound` for a 404; any other failure is a transport error.
    fn get(&self, path: &str) -> Result<serde_json::Value>;
}

/// GET `path` and decode the body into `T`.
pub fn fetch<T: DeserializeOwned>(catalog: &dyn Catalog, path: &str) -> Result<T> {
    let value = catalog.get(path)?;
    serde_json::from_value(value).map_err(|source| PinError::Decode {
        path: path.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// `git/ref/tags/{ref}` and `git/tags/{sha}` responses.
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    pub object: GitObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub commit: Option<TagCommit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagCommit {
    pub sha: String,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

pub const PAGE_SIZE: usize = 100;

pub fn tag_ref_path(owner: &str, repo: &str, reference: &str) -> String {
    format!("repos/{owner}/{repo}/git/ref/tags/{}", escape_ref(reference))
}

pub fn tag_object_path(owner: &str, repo: &str, sha: &str) -> String {
    format!("repos/{owner}/{repo}/git/tags/{sha}")
}

pub fn releases_path(owner: &str, repo: &str, page: usize) -> String {
    format!("repos/{owner}/{repo}/releases?per_page={PAGE_SIZE}&page={page}")
}

pub fn tags_path(owner: &str, repo: &str, page: usize) -> String {
    format!("repos/{owner}/{repo}/tags?per_page={PAGE_SIZE}&page={page}")
}

pub fn latest_release_path(owner: &str, repo: &str) -> String {
    format!("repos/{owner}/{repo}/releases/latest")
}

pub fn newest_tag_path(owner: &str, repo: &str) -> String {
    format!("repos/{owner}/{repo}/tags?per_page=1")
}

/// Percent-encode a reference for use as URL path segments, keeping `/`.
/// Unlike Go's `url.PathEscape`, `+` is encoded too; GitHub decodes both forms
/// to the same ref.
fn escape_ref(reference: &str) -> String {
    let mut out = String::with_capacity(reference.len());
    for b in reference.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryCatalog;
    use serde_json::json;

    #[test]
    fn ref_paths_escape_but_keep_slashes() {
        assert_eq!(
            tag_ref_path("o", "r", "release/v1.0+build"),
            "repos/o/r/git/ref/tags/release/v1.0%2Bbuild"
        );
        assert_eq!(
            tag_ref_path("o", "r", "v1 beta"),
            "repos/o/r/git/ref/tags/v1%20beta"
        );
    }

    #[test]
    fn fetch_decodes_payload() {
        let catalog = MemoryCatalog::new().with_json(
            "repos/o/r/git/ref/tags/v1",
            json!({"object": {"sha": "abc", "type": "commit"}}),
        );
        let r: GitRef = fetch(&catalog, "repos/o/r/git/ref/tags/v1").unwrap();
        assert_eq!(r.object.sha, "abc");
        assert_eq!(r.object.kind, "commit");
    }

    #[test]
    fn fetch_reports_decode_errors_with_path() {
        let catalog = MemoryCatalog::new().with_json("repos/o/r/tags?per_page=1", json!({"x": 1}));
        let err = fetch::<Vec<Tag>>(&catalog, "repos/o/r/tags?per_page=1").unwrap_err();
        assert!(matches!(err, PinError::Decode { ref path, .. } if path == "repos/o/r/tags?per_page=1"));
    }
}
