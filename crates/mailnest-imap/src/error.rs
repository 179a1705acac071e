//! Error types for the IMAP client.

use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong on an IMAP connection.
#[derive(Debug, Error)]
pub enum Error {
    /// Socket failure.
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or record failure.
    #[error("tls: {0}")]
    Tls(#[from] rustls::Error),

    /// Host is not usable as a TLS server name.
    #[error("bad server name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Unparseable server response.
    #[error("malformed response at byte {position}: {message}")]
    Parse {
        /// Offset into the response line.
        position: usize,
        /// What the parser expected.
        message: String,
    },

    /// The server rejected the credentials. Carries the server's reason,
    /// including any bracketed response code.
    #[error("login rejected: {0}")]
    Auth(String),

    /// Tagged NO.
    #[error("NO: {0}")]
    No(String),

    /// Tagged BAD.
    #[error("BAD: {0}")]
    Bad(String),

    /// Server closed the session.
    #[error("BYE: {0}")]
    Bye(String),

    /// Connect, handshake or greeting took longer than the connect timeout.
    #[error("no answer within {0:?}")]
    Timeout(Duration),

    /// Command issued in the wrong session state; nothing was sent.
    #[error("not allowed now: {0}")]
    InvalidState(String),

    /// Protocol violation or an argument that cannot be encoded.
    #[error("protocol: {0}")]
    Protocol(String),
}

impl Error {
    /// True if the connection cannot be used any more.
    #[must_use]
    pub const fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Tls(_) | Self::Bye(_) | Self::Timeout(_)
        )
    }
}

/// IMAP result.
pub type Result<T> = std::result::Result<T, Error>;
