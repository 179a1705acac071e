//! Settings file and flag overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mailnest_core::{Credentials, EngineConfig};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OrganizeArgs};

/// Contents of `config.json`. Every field is optional.
///
/// Passwords are never read from or written to this file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default mailbox login.
    pub user: Option<String>,
    /// Engine tunables.
    #[serde(flatten)]
    pub engine: EngineConfig,
}

impl Settings {
    /// Default location, `<config dir>/mailnest/config.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mailnest").join("config.json"))
    }

    /// Loads settings.
    ///
    /// An explicit path must exist. A missing file at the default location
    /// gives defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Applies command-line overrides.
    pub fn apply(&mut self, cli: &Cli, organize: Option<&OrganizeArgs>) {
        if let Some(user) = &cli.user {
            self.user = Some(user.clone());
        }
        if let Some(host) = &cli.host {
            self.engine.server.host.clone_from(host);
        }
        if let Some(port) = cli.port {
            self.engine.server.port = port;
        }
        if let Some(args) = organize {
            if let Some(limit) = args.limit {
                self.engine.limit = limit;
            }
            if args.no_purge {
                self.engine.purge_inbox = false;
            }
        }
    }

    /// Builds credentials from the login and the password variable.
    pub fn credentials(&self, password_env: &str) -> Result<Credentials> {
        let Some(user) = self.user.as_deref().filter(|u| !u.trim().is_empty()) else {
            bail!("no mailbox login: pass --user or set \"user\" in the settings file");
        };
        let secret = std::env::var(password_env)
            .with_context(|| format!("reading the password from ${password_env}"))?;
        if secret.is_empty() {
            bail!("${password_env} is empty");
        }
        Ok(Credentials::new(user, secret))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_flat_json() {
        let settings: Settings = serde_json::from_str(
            r#"{"user": "me@gmail.com", "limit": 300, "server": {"port": 1993}}"#,
        )
        .unwrap();
        assert_eq!(settings.user.as_deref(), Some("me@gmail.com"));
        assert_eq!(settings.engine.limit, 300);
        assert_eq!(settings.engine.server.port, 1993);
        assert_eq!(settings.engine.server.host, "imap.gmail.com");
        assert!(settings.engine.purge_inbox);
    }

    #[test]
    fn test_flags_override_file() {
        let mut settings = Settings {
            user: Some("file@gmail.com".into()),
            ..Settings::default()
        };
        let cli = Cli::try_parse_from([
            "mailnest", "--host", "imap.example.com", "organize", "--limit", "5", "--no-purge",
        ])
        .unwrap();
        let crate::cli::Command::Organize(args) = &cli.command else {
            panic!("expected organize");
        };
        settings.apply(&cli, Some(args));
        assert_eq!(settings.user.as_deref(), Some("file@gmail.com"));
        assert_eq!(settings.engine.server.host, "imap.example.com");
        assert_eq!(settings.engine.limit, 5);
        assert!(!settings.engine.purge_inbox);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let path = std::env::temp_dir().join("mailnest-test-no-such-settings.json");
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_credentials_require_user() {
        let settings = Settings::default();
        assert!(settings.credentials("MAILNEST_TEST_UNSET_PASSWORD").is_err());
    }

    #[test]
    fn test_credentials_require_password_variable() {
        let settings = Settings {
            user: Some("me@gmail.com".into()),
            ..Settings::default()
        };
        let err = settings
            .credentials("MAILNEST_TEST_SURELY_UNSET_VARIABLE")
            .unwrap_err();
        assert!(err.to_string().contains("MAILNEST_TEST_SURELY_UNSET_VARIABLE"));
    }
}
