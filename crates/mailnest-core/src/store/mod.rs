//! The mailbox operations the engine needs, behind a trait.
//!
//! Engine code is generic over [`Connector`] and [`MailStore`], so the
//! whole organize and dedupe flow can run against an in-memory mailbox in
//! tests. [`ImapConnector`] is the real implementation.

mod imap;
#[cfg(test)]
pub mod memory;

use std::fmt;
use std::future::Future;

use mailnest_imap::{Result, SeqNum};

use crate::message::MessageIdentifier;

pub use imap::{ImapConnector, ImapMailbox};

/// Login name and secret for one mailbox.
///
/// The secret never appears in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    user: String,
    secret: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
        }
    }

    /// Login name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Password or app password.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// One authenticated connection to a mailbox.
///
/// Message identifiers are sequence numbers of the selected folder.
pub trait MailStore: Send {
    /// Opens a folder read-write; returns its message count.
    fn select(&mut self, folder: &str) -> impl Future<Output = Result<u32>> + Send;

    /// Opens a folder read-only; returns its message count.
    fn examine(&mut self, folder: &str) -> impl Future<Output = Result<u32>> + Send;

    /// Every message in the open folder, ascending.
    fn search_all(&mut self) -> impl Future<Output = Result<Vec<SeqNum>>> + Send;

    /// Full message bytes, without setting `\Seen`.
    fn fetch_message(&mut self, id: SeqNum) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// The message's `Message-ID`, if it has a non-blank one.
    fn fetch_message_id(
        &mut self,
        id: SeqNum,
    ) -> impl Future<Output = Result<Option<MessageIdentifier>>> + Send;

    /// Names of every selectable folder.
    fn list_folders(&mut self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Creates a folder. Fails if it already exists.
    fn create_folder(&mut self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Copies a message of the open folder into `folder`.
    fn copy(&mut self, id: SeqNum, folder: &str) -> impl Future<Output = Result<()>> + Send;

    /// Marks a message `\Deleted`.
    fn flag_deleted(&mut self, id: SeqNum) -> impl Future<Output = Result<()>> + Send;

    /// Removes `\Deleted` messages from the open folder.
    fn expunge(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Does nothing, keeping the connection alive.
    fn noop(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Ends the session.
    fn logout(self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens authenticated [`MailStore`] connections.
pub trait Connector: Send + Sync {
    /// Connection type.
    type Store: MailStore;

    /// Connects and logs in. Credential rejection is
    /// [`mailnest_imap::Error::Auth`].
    fn connect(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Self::Store>> + Send;

    /// Server shown in log lines.
    fn server_name(&self) -> &str;
}
