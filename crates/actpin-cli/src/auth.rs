use std::process::Command;

const TOKEN_VARS: &[&str] = &["GH_TOKEN", "GITHUB_TOKEN"];

/// Find an API token.
///
/// Priority:
/// 1. `--token` flag / `ACTPIN_TOKEN` env var (passed in as `explicit`)
/// 2. `GH_TOKEN`, then `GITHUB_TOKEN`
/// 3. `gh auth token`, when `gh` is on `PATH`
///
/// `None` means requests go out unauthenticated.
pub fn discover_token(explicit: Option<&str>) -> Option<String> {
    if let Some(token) = non_empty(explicit) {
        return Some(token);
    }
    for &var in TOKEN_VARS {
        if let Some(token) = non_empty(std::env::var(var).ok().as_deref()) {
            tracing::debug!(var, "using token from environment");
            return Some(token);
        }
    }
    gh_auth_token()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn gh_auth_token() -> Option<String> {
    let gh = which::which("gh").ok()?;
    let output = match Command::new(&gh).args(["auth", "token"]).output() {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(error = %e, "failed to run gh auth token");
            return None;
        }
    };
    if !output.status.success() {
        tracing::debug!(status = %output.status, "gh auth token returned no token");
        return None;
    }
    non_empty(Some(&String::from_utf8_lossy(&output.stdout)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_token_is_trimmed_and_wins() {
        assert_eq!(discover_token(Some("  abc123\n")).as_deref(), Some("abc123"));
    }

    #[test]
    fn blank_values_are_ignored() {
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
