use thiserror::Error;

#[derive(Debug, Error)]
pub enum PinError {
    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("HTTP {status} for {path}: {message}")]
    Http {
        status: u16,
        path: String,
        message: String,
    },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("failed to decode response for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tag {reference} resolved to unsupported type {kind}")]
    UnsupportedObject { reference: String, kind: String },

    #[error("no release found for {owner}/{repo} with tag {spec}")]
    NoReleaseFound {
        owner: String,
        repo: String,
        spec: String,
    },

    #[error("no release found matching {spec} for {owner}/{repo}")]
    NoMatchingRelease {
        owner: String,
        repo: String,
        spec: String,
    },

    #[error("no release or tag found for {owner}/{repo}")]
    NoRelease { owner: String, repo: String },

    #[error("empty version specification")]
    EmptySpec,

    #[error("repository argument must be in the form owner/repo: '{0}'")]
    InvalidRepository(String),

    #[error("repository {0} not referenced in workflows or composite actions")]
    RepositoryNotReferenced(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

}

impl PinError {
    /// True when the catalog answered with a 404. The resolver uses this to
    /// move on to the next candidate or listing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PinError::NotFound { .. })
    }

    /// True when every candidate, page and listing was tried without a match.
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            PinError::NoReleaseFound { .. }
                | PinError::NoMatchingRelease { .. }
                | PinError::NoRelease { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PinError>;
