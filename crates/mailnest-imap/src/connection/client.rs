//! IMAP client connection.
//!
//! One [`Client`] owns one connection and issues one command at a time.
//! The protocol state (not authenticated, authenticated, selected) is
//! tracked at runtime: long-running callers reselect mailboxes and
//! reconnect freely, so a value that changes type on every transition
//! would only get in their way. Commands sent in the wrong state fail
//! with [`Error::InvalidState`] before touching the wire.

#![allow(clippy::missing_errors_doc)]

use tokio::io::{AsyncRead, AsyncWrite};

use super::config::Config;
use super::framed::FramedStream;
use super::stream::{ImapStream, open};
use crate::command::{Command, FetchAttribute, TagGenerator};
use crate::parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
use crate::types::{Flag, ListResponse, MailboxStatus, ResponseCode, SeqNum, Status};
use crate::{Error, Result};

/// Protocol state of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Greeting received, no login yet.
    NotAuthenticated,
    /// Logged in, no mailbox selected.
    Authenticated,
    /// A mailbox is open.
    Selected {
        /// Name of the open mailbox.
        mailbox: String,
        /// Opened with EXAMINE.
        read_only: bool,
    },
}

/// An IMAP connection.
pub struct Client<S> {
    stream: FramedStream<S>,
    tags: TagGenerator,
    state: SessionState,
}

impl<S> std::fmt::Debug for Client<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("tags", &self.tags)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Client<ImapStream> {
    /// Connects and reads the greeting, all within the configured connect
    /// timeout.
    pub async fn connect(config: &Config) -> Result<Self> {
        let attempt = async {
            let stream = open(config).await?;
            Self::from_stream(stream).await
        };
        tokio::time::timeout(config.connect_timeout, attempt)
            .await
            .map_err(|_| Error::Timeout(config.connect_timeout))?
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected stream and consumes the server greeting.
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut framed = FramedStream::new(stream);
        let greeting = framed.read_response().await?;

        let state = match ResponseParser::parse(&greeting)? {
            Response::Untagged(UntaggedResponse::Condition { status, text, .. }) => match status {
                Status::Ok => SessionState::NotAuthenticated,
                Status::PreAuth => SessionState::Authenticated,
                Status::Bye => return Err(Error::Bye(text)),
                Status::No | Status::Bad => {
                    return Err(Error::Protocol(format!("unexpected greeting: {text}")));
                }
            },
            other => return Err(Error::Protocol(format!("unexpected greeting: {other:?}"))),
        };

        tracing::debug!(?state, "IMAP greeting received");
        Ok(Self {
            stream: framed,
            tags: TagGenerator::default(),
            state,
        })
    }

    /// Current protocol state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Name of the selected mailbox, if any.
    #[must_use]
    pub fn selected_mailbox(&self) -> Option<&str> {
        match &self.state {
            SessionState::Selected { mailbox, .. } => Some(mailbox),
            _ => None,
        }
    }

    /// Logs in with user name and password.
    ///
    /// A `NO` completion becomes [`Error::Auth`] carrying the server text
    /// with its response code, so callers can look for markers such as
    /// `AUTHENTICATIONFAILED`.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if self.state != SessionState::NotAuthenticated {
            return Err(Error::InvalidState("LOGIN after authentication".into()));
        }
        match self.execute(&Command::Login { username, password }).await {
            Ok(_) => {
                self.state = SessionState::Authenticated;
                Ok(())
            }
            Err(Error::No(reason)) => Err(Error::Auth(reason)),
            Err(e) => Err(e),
        }
    }

    /// Lists mailboxes matching `pattern` under `reference`.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListResponse>> {
        self.require_authenticated("LIST")?;
        let untagged = self.execute(&Command::List { reference, pattern }).await?;
        Ok(untagged
            .into_iter()
            .filter_map(|r| match r {
                UntaggedResponse::List(list) => Some(list),
                _ => None,
            })
            .collect())
    }

    /// Creates a mailbox.
    pub async fn create(&mut self, mailbox: &str) -> Result<()> {
        self.require_authenticated("CREATE")?;
        self.execute(&Command::Create(mailbox)).await.map(drop)
    }

    /// Opens a mailbox read-write.
    pub async fn select(&mut self, mailbox: &str) -> Result<MailboxStatus> {
        self.open_mailbox(mailbox, false).await
    }

    /// Opens a mailbox read-only.
    pub async fn examine(&mut self, mailbox: &str) -> Result<MailboxStatus> {
        self.open_mailbox(mailbox, true).await
    }

    async fn open_mailbox(&mut self, mailbox: &str, read_only: bool) -> Result<MailboxStatus> {
        self.require_authenticated(if read_only { "EXAMINE" } else { "SELECT" })?;
        let command = if read_only {
            Command::Examine(mailbox)
        } else {
            Command::Select(mailbox)
        };

        let (untagged, completion) = match self.round_trip(&command).await {
            Ok(result) => result,
            Err(e) => {
                // A failed SELECT still closes the previously open mailbox.
                if !e.is_connection_lost() {
                    self.state = SessionState::Authenticated;
                }
                return Err(e);
            }
        };
        if let Err(e) = completion.check() {
            self.state = SessionState::Authenticated;
            return Err(e);
        }

        let mut status = MailboxStatus {
            read_only,
            ..MailboxStatus::default()
        };
        for response in untagged {
            match response {
                UntaggedResponse::Exists(n) => status.exists = n,
                UntaggedResponse::Recent(n) => status.recent = n,
                UntaggedResponse::Flags(flags) => status.flags = flags,
                _ => {}
            }
        }
        if completion.code == Some(ResponseCode::ReadOnly) {
            status.read_only = true;
        }

        self.state = SessionState::Selected {
            mailbox: mailbox.to_string(),
            read_only: status.read_only,
        };
        Ok(status)
    }

    /// Returns the sequence numbers of every message in the open mailbox,
    /// ascending.
    pub async fn search_all(&mut self) -> Result<Vec<SeqNum>> {
        self.require_selected("SEARCH")?;
        let untagged = self.execute(&Command::SearchAll).await?;
        let mut found: Vec<SeqNum> = untagged
            .into_iter()
            .filter_map(|r| match r {
                UntaggedResponse::Search(nums) => Some(nums),
                _ => None,
            })
            .flatten()
            .collect();
        found.sort_unstable();
        found.dedup();
        Ok(found)
    }

    /// Fetches data items for one message.
    ///
    /// Unsolicited FETCH responses for other messages are dropped.
    pub async fn fetch(&mut self, seq: SeqNum, items: &[FetchAttribute]) -> Result<Vec<FetchItem>> {
        self.require_selected("FETCH")?;
        let untagged = self.execute(&Command::Fetch { seq, items }).await?;
        Ok(untagged
            .into_iter()
            .filter_map(|r| match r {
                UntaggedResponse::Fetch { seq: got, items } if got == seq => Some(items),
                _ => None,
            })
            .flatten()
            .collect())
    }

    /// Fetches one body section and returns its bytes.
    ///
    /// A server answering without the section (or with `NIL`) is a
    /// protocol error.
    pub async fn fetch_body(&mut self, seq: SeqNum, attribute: FetchAttribute) -> Result<Vec<u8>> {
        let items = self.fetch(seq, std::slice::from_ref(&attribute)).await?;
        items
            .into_iter()
            .find_map(|item| match item {
                FetchItem::Body { data, .. } => data,
                _ => None,
            })
            .ok_or_else(|| Error::Protocol(format!("no body data returned for message {seq}")))
    }

    /// Copies a message to another mailbox.
    pub async fn copy(&mut self, seq: SeqNum, mailbox: &str) -> Result<()> {
        self.require_selected("COPY")?;
        self.execute(&Command::Copy { seq, mailbox }).await.map(drop)
    }

    /// Adds flags to a message without asking for the updated flags back.
    pub async fn add_flags(&mut self, seq: SeqNum, flags: &[Flag]) -> Result<()> {
        self.require_writable("STORE")?;
        self.execute(&Command::AddFlags {
            seq,
            flags,
            silent: true,
        })
        .await
        .map(drop)
    }

    /// Marks a message `\Deleted`.
    pub async fn store_deleted(&mut self, seq: SeqNum) -> Result<()> {
        self.add_flags(seq, &[Flag::Deleted]).await
    }

    /// Permanently removes `\Deleted` messages from the open mailbox and
    /// returns the expunged sequence numbers in server order.
    pub async fn expunge(&mut self) -> Result<Vec<SeqNum>> {
        self.require_writable("EXPUNGE")?;
        let untagged = self.execute(&Command::Expunge).await?;
        Ok(untagged
            .into_iter()
            .filter_map(|r| match r {
                UntaggedResponse::Expunge(seq) => Some(seq),
                _ => None,
            })
            .collect())
    }

    /// Sends NOOP; keeps the connection from idling out.
    pub async fn noop(&mut self) -> Result<()> {
        self.execute(&Command::Noop).await.map(drop)
    }

    /// Sends LOGOUT and closes the connection.
    pub async fn logout(mut self) -> Result<()> {
        self.execute(&Command::Logout).await.map(drop)
    }

    fn require_authenticated(&self, command: &str) -> Result<()> {
        if self.state == SessionState::NotAuthenticated {
            return Err(Error::InvalidState(format!("{command} requires login")));
        }
        Ok(())
    }

    fn require_selected(&self, command: &str) -> Result<()> {
        if self.selected_mailbox().is_none() {
            return Err(Error::InvalidState(format!("{command} requires a selected mailbox")));
        }
        Ok(())
    }

    fn require_writable(&self, command: &str) -> Result<()> {
        match &self.state {
            SessionState::Selected { read_only: false, .. } => Ok(()),
            SessionState::Selected { mailbox, .. } => Err(Error::InvalidState(format!(
                "{command} on read-only mailbox {mailbox}"
            ))),
            _ => Err(Error::InvalidState(format!("{command} requires a selected mailbox"))),
        }
    }

    /// Runs a command and returns its untagged data if it completed OK.
    async fn execute(&mut self, command: &Command<'_>) -> Result<Vec<UntaggedResponse>> {
        let (untagged, completion) = self.round_trip(command).await?;
        completion.check()?;
        Ok(untagged)
    }

    /// Sends a command and collects everything up to its completion.
    async fn round_trip(
        &mut self,
        command: &Command<'_>,
    ) -> Result<(Vec<UntaggedResponse>, Completion)> {
        let tag = self.tags.next_tag();
        let bytes = command.serialize(&tag)?;
        tracing::debug!(%tag, command = command.name(), "IMAP command");
        self.stream.write_command(&bytes).await?;

        let mut untagged = Vec::new();
        for raw in self.stream.read_until_tagged(&tag).await? {
            match ResponseParser::parse(&raw) {
                Ok(Response::Tagged {
                    status, code, text, ..
                }) => {
                    return Ok((untagged, Completion { status, code, text }));
                }
                Ok(Response::Untagged(response)) => untagged.push(response),
                Ok(Response::Continuation { .. }) => {
                    return Err(Error::Protocol(format!(
                        "unexpected continuation for {}",
                        command.name()
                    )));
                }
                Err(e) => {
                    tracing::debug!(error = %e, line = %String::from_utf8_lossy(&raw).trim_end(), "skipping unparsed response");
                }
            }
        }

        Err(Error::Protocol(format!("{} completed without a tagged response", command.name())))
    }
}

/// Tagged completion of a command.
struct Completion {
    status: Status,
    code: Option<ResponseCode>,
    text: String,
}

impl Completion {
    fn check(&self) -> Result<()> {
        let reason = || Response::describe(self.code.as_ref(), &self.text);
        match self.status {
            Status::Ok | Status::PreAuth => Ok(()),
            Status::No => Err(Error::No(reason())),
            Status::Bad => Err(Error::Bad(reason())),
            Status::Bye => Err(Error::Bye(reason())),
        }
    }
}
