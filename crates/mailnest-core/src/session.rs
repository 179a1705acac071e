//! Session manager: owns the one authenticated connection of a run.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::store::{Connector, Credentials, MailStore};

/// A run's mailbox connection, plus what is needed to re-establish it.
///
/// Tracks the selected folder so a replacement connection can reopen it.
pub struct MailSession<'a, C: Connector> {
    connector: &'a C,
    credentials: &'a Credentials,
    store: C::Store,
    selected: Option<(String, bool)>,
}

impl<C: Connector> std::fmt::Debug for MailSession<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSession")
            .field("server", &self.connector.server_name())
            .field("user", &self.credentials.user())
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl<'a, C: Connector> MailSession<'a, C> {
    /// Connects and logs in.
    ///
    /// # Errors
    ///
    /// [`Error::Auth`] if the credentials are rejected, otherwise
    /// [`Error::Connection`].
    pub async fn connect(connector: &'a C, credentials: &'a Credentials) -> Result<Self> {
        let store = connector
            .connect(credentials)
            .await
            .map_err(Error::from_connect)?;
        info!(
            server = connector.server_name(),
            user = credentials.user(),
            "session established"
        );
        Ok(Self {
            connector,
            credentials,
            store,
            selected: None,
        })
    }

    /// Server name for log lines.
    #[must_use]
    pub fn server_name(&self) -> &str {
        self.connector.server_name()
    }

    /// Opens a folder read-write; returns its message count.
    ///
    /// # Errors
    ///
    /// Returns the protocol error if the folder cannot be opened.
    pub async fn select(&mut self, folder: &str) -> mailnest_imap::Result<u32> {
        self.open(folder, false).await
    }

    /// Opens a folder read-only; returns its message count.
    ///
    /// # Errors
    ///
    /// Returns the protocol error if the folder cannot be opened.
    pub async fn examine(&mut self, folder: &str) -> mailnest_imap::Result<u32> {
        self.open(folder, true).await
    }

    async fn open(&mut self, folder: &str, read_only: bool) -> mailnest_imap::Result<u32> {
        self.selected = None;
        let count = if read_only {
            self.store.examine(folder).await?
        } else {
            self.store.select(folder).await?
        };
        self.selected = Some((folder.to_string(), read_only));
        Ok(count)
    }

    /// The underlying connection.
    pub const fn store(&mut self) -> &mut C::Store {
        &mut self.store
    }

    /// Sends a NOOP.
    ///
    /// # Errors
    ///
    /// [`Error::Keepalive`] if the server does not answer.
    pub async fn keepalive(&mut self) -> Result<()> {
        self.store
            .noop()
            .await
            .map_err(|e| Error::Keepalive(e.to_string()))?;
        debug!("keepalive ok");
        Ok(())
    }

    /// Replaces the connection with a fresh one and reopens the folder that
    /// was selected.
    ///
    /// # Errors
    ///
    /// [`Error::Reconnect`] if connecting, logging in or reopening fails.
    pub async fn reconnect(&mut self) -> Result<()> {
        warn!(server = self.connector.server_name(), "reconnecting");
        let store = self
            .connector
            .connect(self.credentials)
            .await
            .map_err(|e| Error::Reconnect(e.to_string()))?;
        let old = std::mem::replace(&mut self.store, store);
        // The old connection is usually dead already.
        if let Err(e) = old.logout().await {
            debug!(?e, "logout of replaced connection failed");
        }
        if let Some((folder, read_only)) = self.selected.take() {
            self.open(&folder, read_only)
                .await
                .map_err(|e| Error::Reconnect(format!("reopening {folder}: {e}")))?;
        }
        info!("reconnected");
        Ok(())
    }

    /// Logs out, ignoring failures.
    pub async fn disconnect(self) {
        match self.store.logout().await {
            Ok(()) => info!("session closed"),
            Err(e) => debug!(?e, "logout failed"),
        }
    }
}
