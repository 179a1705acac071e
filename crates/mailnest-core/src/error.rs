//! Error types for the organizer engine.

use thiserror::Error;

/// Server reason fragments that identify rejected credentials.
const AUTH_FAILURE_MARKERS: [&str; 3] = [
    "authentication failed",
    "invalid credentials",
    "authenticationfailed",
];

/// Guidance attached to recognised credential rejections.
pub const APP_PASSWORD_HINT: &str = "Check that the address and password are correct. \
If two-step verification is enabled, generate an App Password at \
https://myaccount.google.com/apppasswords (app: \"Mail\") and use it instead of \
your regular password.";

/// Longest error text written to the run log.
pub const MAX_LOGGED_ERROR_LEN: usize = 100;

/// Errors raised by the engine.
///
/// Only [`Error::Connection`], [`Error::Auth`], [`Error::List`] and
/// [`Error::Reconnect`] end a run. The others are recorded and the run
/// carries on.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure: DNS, TCP, TLS, timeout or greeting.
    #[error("could not connect to the mail server: {0}")]
    Connection(String),

    /// The server rejected the credentials.
    #[error("authentication failed: {reason}")]
    Auth {
        /// Server text, including its response code.
        reason: String,
        /// What the user can do about it, when the cause is recognised.
        remediation: Option<&'static str>,
    },

    /// The inbox could not be opened or searched.
    #[error("could not list inbox messages: {0}")]
    List(String),

    /// One message could not be fetched, classified or moved.
    #[error("message {id}: {reason}")]
    Message {
        /// Protocol identifier of the message.
        id: String,
        /// What went wrong.
        reason: String,
    },

    /// One folder could not be scanned.
    #[error("folder {folder}: {reason}")]
    Folder {
        /// Folder name.
        folder: String,
        /// What went wrong.
        reason: String,
    },

    /// EXPUNGE failed.
    #[error("purge failed: {0}")]
    Purge(String),

    /// NOOP failed.
    #[error("keepalive failed: {0}")]
    Keepalive(String),

    /// The replacement session after a dropped connection could not be
    /// established.
    #[error("reconnect failed: {0}")]
    Reconnect(String),
}

impl Error {
    /// Builds an [`Error::Auth`], attaching remediation when the server
    /// reason carries a known credential-failure marker.
    #[must_use]
    pub fn auth(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let lower = reason.to_lowercase();
        let remediation = AUTH_FAILURE_MARKERS
            .iter()
            .any(|marker| lower.contains(marker))
            .then_some(APP_PASSWORD_HINT);
        Self::Auth {
            reason,
            remediation,
        }
    }

    /// Maps a failed connect-and-login attempt.
    #[must_use]
    pub fn from_connect(error: mailnest_imap::Error) -> Self {
        match error {
            mailnest_imap::Error::Auth(reason) => Self::auth(reason),
            other => Self::Connection(other.to_string()),
        }
    }

    /// True if the run cannot continue after this error.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Auth { .. } | Self::List(_) | Self::Reconnect(_)
        )
    }

    /// Text for the terminal error event: the error plus any remediation.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth {
                remediation: Some(hint),
                ..
            } => format!("{self}\n\n{hint}"),
            Self::Connection(_) => format!("{self}\n\nCheck your internet connection."),
            _ => self.to_string(),
        }
    }
}

/// Shortens error text for log lines.
#[must_use]
pub fn truncate_for_log(text: &str) -> String {
    match text.char_indices().nth(MAX_LOGGED_ERROR_LEN) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_marker_attaches_remediation() {
        let err = Error::auth("[AUTHENTICATIONFAILED] Invalid credentials (Failure)");
        let Error::Auth { remediation, .. } = &err else {
            panic!("expected Auth");
        };
        assert_eq!(*remediation, Some(APP_PASSWORD_HINT));
        assert!(err.user_message().contains("myaccount.google.com/apppasswords"));
        assert!(err.user_message().contains("\"Mail\""));
    }

    #[test]
    fn test_auth_marker_case_insensitive() {
        let err = Error::auth("LOGIN failed: Authentication Failed.");
        assert!(matches!(err, Error::Auth { remediation: Some(_), .. }));
    }

    #[test]
    fn test_auth_without_marker_is_generic() {
        let err = Error::auth("[ALERT] Please log in via your web browser");
        assert!(matches!(err, Error::Auth { remediation: None, .. }));
        assert_eq!(
            err.user_message(),
            "authentication failed: [ALERT] Please log in via your web browser"
        );
    }

    #[test]
    fn test_from_connect() {
        let err = Error::from_connect(mailnest_imap::Error::Auth("Invalid credentials".into()));
        assert!(matches!(err, Error::Auth { remediation: Some(_), .. }));

        let err = Error::from_connect(mailnest_imap::Error::Timeout(
            std::time::Duration::from_secs(30),
        ));
        assert!(matches!(err, Error::Connection(_)));
        assert!(err.user_message().ends_with("Check your internet connection."));
    }

    #[test]
    fn test_fatality() {
        assert!(Error::List("x".into()).is_fatal());
        assert!(Error::Reconnect("x".into()).is_fatal());
        assert!(!Error::Purge("x".into()).is_fatal());
        assert!(!Error::Keepalive("x".into()).is_fatal());
        assert!(
            !Error::Folder {
                folder: "Faturas".into(),
                reason: "x".into()
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short"), "short");
        let long = "é".repeat(150);
        assert_eq!(truncate_for_log(&long).chars().count(), MAX_LOGGED_ERROR_LEN);
    }
}
