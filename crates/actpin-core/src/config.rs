use crate::error::Result;
use crate::github::DEFAULT_API_URL;
use crate::paths;
use crate::usage::ActionSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Project settings read from `.github/actpin.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `owner/repo` or `owner/*` patterns whose usages are left alone.
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            ignore: Vec::new(),
        }
    }
}

impl Config {
    /// Load the project config, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when `spec` matches one of the `ignore` patterns.
    pub fn is_ignored(&self, spec: &ActionSpec) -> bool {
        let owner = spec.owner.to_lowercase();
        let key = spec.repo_key();
        self.ignore.iter().any(|pattern| {
            let pattern = pattern.trim().to_lowercase();
            match pattern.strip_suffix("/*") {
                Some(pattern_owner) => pattern_owner == owner,
                None => pattern == key,
            }
        })
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "timeout_secs is 0; requests will use a 1 second timeout".to_string(),
            });
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("api_url '{}' is not an http(s) URL", self.api_url),
            });
        }

        for pattern in &self.ignore {
            let parts: Vec<&str> = pattern.trim().split('/').collect();
            if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) || parts[0] == "*" {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "ignore pattern '{pattern}' should be 'owner/repo' or 'owner/*'"
                    ),
                });
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn spec(owner: &str, repo: &str) -> ActionSpec {
        ActionSpec {
            owner: owner.into(),
            repo: repo.into(),
            subpath: None,
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.api_url, "https://api.github.com");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".github")).unwrap();
        std::fs::write(
            paths::config_path(dir.path()),
            "ignore:\n  - my-org/*\n  - actions/cache\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.ignore.len(), 2);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn full_file_overrides_every_default() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".github")).unwrap();
        std::fs::write(
            paths::config_path(dir.path()),
            "api_url: https://ghe.example.com/api/v3\ntimeout_secs: 5\nignore: ['acme/*']\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(
            cfg,
            Config {
                api_url: "https://ghe.example.com/api/v3".into(),
                timeout_secs: 5,
                ignore: vec!["acme/*".into()],
            }
        );
    }

    #[test]
    fn ignore_patterns_match_case_insensitively() {
        let cfg = Config {
            ignore: vec!["My-Org/*".into(), "actions/cache".into()],
            ..Config::default()
        };
        assert!(cfg.is_ignored(&spec("my-org", "anything")));
        assert!(cfg.is_ignored(&spec("Actions", "Cache")));
        assert!(!cfg.is_ignored(&spec("actions", "checkout")));
    }

    #[test]
    fn validate_flags_bad_settings() {
        let cfg = Config {
            api_url: "api.github.com".into(),
            timeout_secs: 0,
            ignore: vec!["just-a-name".into(), "*/repo".into()],
        };
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 4);
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
    }
}
