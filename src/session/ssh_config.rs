//! Minimal `~/.ssh/config` resolution.
//!
//! Supports the subset of directives the session layer honors: `Host`
//! patterns with `*`/`?` globs, and per-host `HostName`, `User`, `Port`,
//! `IdentityFile` and `ProxyCommand` values. As in OpenSSH, the first
//! obtained value for each parameter wins, so more specific blocks should
//! come first in the file.

use std::path::{Path, PathBuf};

use crate::error::RemoteRelayError;
use crate::Result;

/// Per-host values resolved from an ssh config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshHostConfig {
    /// Real host name to connect to (`HostName`).
    pub host_name: Option<String>,
    /// Login user (`User`).
    pub user: Option<String>,
    /// Port (`Port`).
    pub port: Option<u16>,
    /// Private key path (`IdentityFile`), tilde-expanded.
    pub identity_file: Option<PathBuf>,
    /// Proxy command (`ProxyCommand`). Detected but not honored; see
    /// [`crate::session::RemoteSession::connect`].
    pub proxy_command: Option<String>,
}

/// Resolve the configuration for `host` from the ssh config file at `path`.
pub fn resolve(path: &Path, host: &str) -> Result<SshHostConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        RemoteRelayError::Config(format!("cannot read ssh config {}: {}", path.display(), e))
    })?;
    Ok(resolve_from_str(&contents, host))
}

/// Resolve from already-loaded config contents.
pub fn resolve_from_str(contents: &str, host: &str) -> SshHostConfig {
    let mut resolved = SshHostConfig::default();
    let mut in_matching_block = false;

    for line in contents.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let (keyword, value) = match split_directive(line) {
            Some(pair) => pair,
            None => continue,
        };

        if keyword.eq_ignore_ascii_case("host") {
            // A block applies when a positive pattern matches and no negated
            // pattern does.
            let mut matched = false;
            let mut negated = false;
            for pattern in value.split_whitespace() {
                match pattern.strip_prefix('!') {
                    Some(p) => negated |= pattern_matches(p, host),
                    None => matched |= pattern_matches(pattern, host),
                }
            }
            in_matching_block = matched && !negated;
            continue;
        }

        if !in_matching_block {
            continue;
        }

        // First obtained value wins, as in OpenSSH.
        match keyword.to_ascii_lowercase().as_str() {
            "hostname" => {
                resolved.host_name.get_or_insert_with(|| value.to_string());
            }
            "user" => {
                resolved.user.get_or_insert_with(|| value.to_string());
            }
            "port" => {
                if resolved.port.is_none() {
                    resolved.port = value.parse().ok();
                }
            }
            "identityfile" => {
                resolved
                    .identity_file
                    .get_or_insert_with(|| expand_tilde(value));
            }
            "proxycommand" => {
                resolved
                    .proxy_command
                    .get_or_insert_with(|| value.to_string());
            }
            _ => {}
        }
    }

    resolved
}

/// Split a config line into keyword and value.
///
/// Accepts both `Keyword value` and `Keyword=value` forms.
fn split_directive(line: &str) -> Option<(&str, &str)> {
    let (keyword, rest) = line.split_once(|c: char| c.is_whitespace() || c == '=')?;
    let value = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '=');
    let value = value.trim().trim_matches('"');
    if value.is_empty() {
        return None;
    }
    Some((keyword, value))
}

/// Glob match with `*` and `?`, the two wildcards ssh config supports.
fn pattern_matches(pattern: &str, host: &str) -> bool {
    fn matches(p: &[u8], h: &[u8]) -> bool {
        match (p.first(), h.first()) {
            (None, None) => true,
            (Some(b'*'), _) => {
                matches(&p[1..], h) || (!h.is_empty() && matches(p, &h[1..]))
            }
            (Some(b'?'), Some(_)) => matches(&p[1..], &h[1..]),
            (Some(pc), Some(hc)) if pc == hc => matches(&p[1..], &h[1..]),
            _ => false,
        }
    }
    matches(pattern.as_bytes(), host.as_bytes())
}

/// Expand a leading `~/` to the user's home directory.
pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# build farm
Host lab*
    HostName lab.internal.example.com
    User tai
    Port 2200
    IdentityFile ~/.ssh/id_lab

Host bastion
    HostName 10.0.0.1
    ProxyCommand ssh -W %h:%p jump

Host *
    User fallback
"#;

    #[test]
    fn test_resolve_glob_host() {
        let cfg = resolve_from_str(SAMPLE, "lab04");
        assert_eq!(cfg.host_name.as_deref(), Some("lab.internal.example.com"));
        assert_eq!(cfg.user.as_deref(), Some("tai"));
        assert_eq!(cfg.port, Some(2200));
        assert!(cfg
            .identity_file
            .as_ref()
            .unwrap()
            .ends_with(".ssh/id_lab"));
    }

    #[test]
    fn test_resolve_proxy_command() {
        let cfg = resolve_from_str(SAMPLE, "bastion");
        assert_eq!(cfg.proxy_command.as_deref(), Some("ssh -W %h:%p jump"));
        assert_eq!(cfg.host_name.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_first_value_wins() {
        // "lab04" matches both "lab*" and "*"; User from the first block wins.
        let cfg = resolve_from_str(SAMPLE, "lab04");
        assert_eq!(cfg.user.as_deref(), Some("tai"));
    }

    #[test]
    fn test_wildcard_fallback() {
        let cfg = resolve_from_str(SAMPLE, "unknown-host");
        assert_eq!(cfg.user.as_deref(), Some("fallback"));
        assert!(cfg.host_name.is_none());
    }

    #[test]
    fn test_no_match() {
        let cfg = resolve_from_str("Host exact\n  Port 2022\n", "other");
        assert_eq!(cfg, SshHostConfig::default());
    }

    #[test]
    fn test_equals_form() {
        let cfg = resolve_from_str("Host box\nPort=2022\n", "box");
        assert_eq!(cfg.port, Some(2022));
    }

    #[test]
    fn test_pattern_matching() {
        assert!(pattern_matches("*", "anything"));
        assert!(pattern_matches("lab??", "lab04"));
        assert!(!pattern_matches("lab??", "lab004"));
        assert!(pattern_matches("*.example.com", "a.example.com"));
        assert!(!pattern_matches("*.example.com", "example.com"));
    }

    #[test]
    fn test_resolve_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let cfg = resolve(file.path(), "lab04").unwrap();
        assert_eq!(cfg.port, Some(2200));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = resolve(Path::new("/nonexistent/ssh_config"), "x").unwrap_err();
        assert!(matches!(err, RemoteRelayError::Config(_)));
    }
}
