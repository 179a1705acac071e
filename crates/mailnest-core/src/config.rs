//! Engine configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Mail server location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IMAP host.
    pub host: String,
    /// IMAP port (implicit TLS).
    pub port: u16,
    /// Bound on TCP connect, TLS handshake and greeting, in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "imap.gmail.com".to_string(),
            port: 993,
            connect_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Connection settings for the IMAP client.
    #[must_use]
    pub fn imap_config(&self) -> mailnest_imap::Config {
        mailnest_imap::Config::builder(self.host.clone())
            .port(self.port)
            .connect_timeout(self.connect_timeout())
            .build()
    }
}

/// Tunables for organize and dedupe runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mail server.
    pub server: ServerConfig,
    /// Most recent inbox messages to organize per run.
    pub limit: usize,
    /// Expunge the inbox after moving.
    pub purge_inbox: bool,
    /// Messages between keepalive NOOPs.
    pub keepalive_every: usize,
    /// Consecutive fetch failures that end listing early.
    pub max_consecutive_fetch_errors: u32,
    /// Most recent inbox messages indexed by duplicate detection.
    pub dedup_scan_cap: usize,
    /// Failures tolerated while indexing or removing duplicates.
    pub max_dedup_errors: u32,
    /// Folder names never scanned for duplicates.
    pub reserved_folders: Vec<String>,
    /// Folder name prefixes never scanned for duplicates.
    pub reserved_prefixes: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            limit: 2000,
            purge_inbox: true,
            keepalive_every: 100,
            max_consecutive_fetch_errors: 10,
            dedup_scan_cap: 1000,
            max_dedup_errors: 10,
            reserved_folders: vec!["INBOX".to_string(), "[Gmail]".to_string()],
            reserved_prefixes: vec!["[Gmail]/".to_string()],
        }
    }
}

impl EngineConfig {
    /// True for the inbox and system folders, which are never treated as
    /// organized folders. Names compare case-insensitively.
    #[must_use]
    pub fn is_reserved(&self, folder: &str) -> bool {
        folder.eq_ignore_ascii_case(crate::INBOX)
            || self
                .reserved_folders
                .iter()
                .any(|reserved| reserved.eq_ignore_ascii_case(folder))
            || self.reserved_prefixes.iter().any(|prefix| {
                folder
                    .get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
            })
    }

    /// True if `count` processed messages is a keepalive point.
    #[must_use]
    pub const fn keepalive_due(&self, count: usize) -> bool {
        self.keepalive_every > 0 && count > 0 && count % self.keepalive_every == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.server.host, "imap.gmail.com");
        assert_eq!(config.server.port, 993);
        assert_eq!(config.server.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.limit, 2000);
        assert!(config.purge_inbox);
        assert_eq!(config.dedup_scan_cap, 1000);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"limit": 50, "server": {"host": "imap.example.com"}}"#)
                .unwrap();
        assert_eq!(config.limit, 50);
        assert_eq!(config.server.host, "imap.example.com");
        assert_eq!(config.server.port, 993);
        assert_eq!(config.keepalive_every, 100);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_reserved_folders() {
        let config = EngineConfig::default();
        assert!(config.is_reserved("INBOX"));
        assert!(config.is_reserved("Inbox"));
        assert!(config.is_reserved("[Gmail]"));
        assert!(config.is_reserved("[Gmail]/All Mail"));
        assert!(config.is_reserved("[gmail]/Spam"));
        assert!(!config.is_reserved("Faturas"));
        assert!(!config.is_reserved("[Gmail]Stuff"));
        assert!(!config.is_reserved("Ação"));
    }

    #[test]
    fn test_keepalive_due() {
        let config = EngineConfig::default();
        assert!(!config.keepalive_due(0));
        assert!(!config.keepalive_due(99));
        assert!(config.keepalive_due(100));
        assert!(config.keepalive_due(200));

        let never = EngineConfig {
            keepalive_every: 0,
            ..EngineConfig::default()
        };
        assert!(!never.keepalive_due(100));
    }

    #[test]
    fn test_imap_config() {
        let server = ServerConfig {
            connect_timeout_secs: 5,
            ..ServerConfig::default()
        };
        let imap = server.imap_config();
        assert_eq!(imap.host, "imap.gmail.com");
        assert_eq!(imap.port, 993);
        assert_eq!(imap.connect_timeout, Duration::from_secs(5));
    }
}
