//! In-memory catalog used by unit tests.

use crate::catalog::Catalog;
use crate::error::{PinError, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;

enum Canned {
    Json(Value),
    Status(u16),
}

/// Serves canned responses by exact path and counts every call. Any path
/// without a canned response panics so unexpected fetches fail the test.
#[derive(Default)]
pub struct MemoryCatalog {
    responses: HashMap<String, Canned>,
    calls: RefCell<HashMap<String, usize>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), Canned::Json(body));
        self
    }

    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.responses.insert(path.to_string(), Canned::Status(status));
        self
    }

    /// Shorthand for a `git/ref/tags/{tag}` response pointing at a commit.
    pub fn with_commit_tag(self, owner: &str, repo: &str, tag: &str, sha: &str) -> Self {
        self.with_json(
            &format!("repos/{owner}/{repo}/git/ref/tags/{tag}"),
            serde_json::json!({"object": {"sha": sha, "type": "commit"}}),
        )
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.borrow().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }
}

impl Catalog for MemoryCatalog {
    fn get(&self, path: &str) -> Result<Value> {
        *self.calls.borrow_mut().entry(path.to_string()).or_default() += 1;
        match self.responses.get(path) {
            Some(Canned::Json(body)) => Ok(body.clone()),
            Some(Canned::Status(404)) => Err(PinError::NotFound {
                path: path.to_string(),
            }),
            Some(Canned::Status(status)) => Err(PinError::Http {
                status: *status,
                path: path.to_string(),
                message: "canned failure".to_string(),
            }),
            None => panic!("unexpected GET {path:?}"),
        }
    }
}
