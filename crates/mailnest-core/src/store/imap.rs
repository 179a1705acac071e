//! [`MailStore`] over a real IMAP connection.

use mailnest_imap::{Client, Config, FetchAttribute, ImapStream, Result, SeqNum, SessionState};

use super::{Connector, Credentials, MailStore};
use crate::message::MessageIdentifier;

/// Connects to an IMAP server over implicit TLS.
#[derive(Debug, Clone)]
pub struct ImapConnector {
    config: Config,
}

impl ImapConnector {
    /// Creates a connector for the given server settings.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Connector for ImapConnector {
    type Store = ImapMailbox;

    async fn connect(&self, credentials: &Credentials) -> Result<ImapMailbox> {
        let mut client = Client::connect(&self.config).await?;
        if client.state() == &SessionState::NotAuthenticated {
            client.login(credentials.user(), credentials.secret()).await?;
        }
        tracing::info!(host = %self.config.host, user = credentials.user(), "IMAP session established");
        Ok(ImapMailbox { client })
    }

    fn server_name(&self) -> &str {
        &self.config.host
    }
}

/// An authenticated IMAP connection.
#[derive(Debug)]
pub struct ImapMailbox {
    client: Client<ImapStream>,
}

impl MailStore for ImapMailbox {
    async fn select(&mut self, folder: &str) -> Result<u32> {
        Ok(self.client.select(folder).await?.exists)
    }

    async fn examine(&mut self, folder: &str) -> Result<u32> {
        Ok(self.client.examine(folder).await?.exists)
    }

    async fn search_all(&mut self) -> Result<Vec<SeqNum>> {
        self.client.search_all().await
    }

    async fn fetch_message(&mut self, id: SeqNum) -> Result<Vec<u8>> {
        self.client
            .fetch_body(id, FetchAttribute::full_message())
            .await
    }

    async fn fetch_message_id(&mut self, id: SeqNum) -> Result<Option<MessageIdentifier>> {
        let header = self
            .client
            .fetch_body(id, FetchAttribute::header_fields(&["MESSAGE-ID"]))
            .await?;
        Ok(MessageIdentifier::from_header_block(&header))
    }

    async fn list_folders(&mut self) -> Result<Vec<String>> {
        let folders = self.client.list("", "*").await?;
        Ok(folders
            .into_iter()
            .filter(|folder| folder.is_selectable())
            .map(|folder| folder.name)
            .collect())
    }

    async fn create_folder(&mut self, name: &str) -> Result<()> {
        self.client.create(name).await
    }

    async fn copy(&mut self, id: SeqNum, folder: &str) -> Result<()> {
        self.client.copy(id, folder).await
    }

    async fn flag_deleted(&mut self, id: SeqNum) -> Result<()> {
        self.client.store_deleted(id).await
    }

    async fn expunge(&mut self) -> Result<()> {
        let removed = self.client.expunge().await?;
        tracing::debug!(count = removed.len(), "expunged");
        Ok(())
    }

    async fn noop(&mut self) -> Result<()> {
        self.client.noop().await
    }

    async fn logout(self) -> Result<()> {
        self.client.logout().await
    }
}
