//! In-memory mailbox for engine tests.
//!
//! A [`FakeServer`] holds folders of raw messages plus scripted failures,
//! and records every mutating command so tests can assert on what the
//! engine did.

#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use std::collections::{HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use mailnest_imap::{Error, Result, SeqNum};

use super::{Connector, Credentials, MailStore};
use crate::message::MessageIdentifier;

/// Builds a minimal RFC 5322 message.
pub fn mail(subject: &str, message_id: Option<&str>, body: &str) -> Vec<u8> {
    let mut raw = format!("From: sender@example.com\r\nSubject: {subject}\r\n");
    if let Some(id) = message_id {
        raw.push_str(&format!("Message-ID: {id}\r\n"));
    }
    raw.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
    raw.push_str(body);
    raw.into_bytes()
}

#[derive(Debug, Clone)]
struct StoredMessage {
    raw: Vec<u8>,
    deleted: bool,
}

#[derive(Debug)]
struct Folder {
    name: String,
    selectable: bool,
    messages: Vec<StoredMessage>,
}

/// A scripted connect outcome.
#[derive(Debug, Clone)]
pub enum ConnectFailure {
    /// Tagged NO to LOGIN with this text.
    Auth(String),
    /// Network failure.
    Network,
}

#[derive(Debug, Default)]
struct State {
    folders: Vec<Folder>,
    commands: Vec<String>,
    connect_script: VecDeque<Option<ConnectFailure>>,
    connections: usize,
    fail_fetch: HashSet<(String, u32)>,
    fail_header_fetch: HashSet<(String, u32)>,
    fail_select: HashSet<String>,
    fail_copy: HashSet<u32>,
    fail_flag: HashSet<u32>,
    fail_noops: usize,
    fail_search: bool,
    fail_list: bool,
    fail_expunge: bool,
}

impl State {
    fn folder(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }

    fn folder_mut(&mut self, name: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.name == name)
    }

    fn ensure_folder(&mut self, name: &str) -> &mut Folder {
        if let Some(i) = self.folders.iter().position(|f| f.name == name) {
            return &mut self.folders[i];
        }
        self.folders.push(Folder {
            name: name.to_string(),
            selectable: true,
            messages: Vec::new(),
        });
        let last = self.folders.len() - 1;
        &mut self.folders[last]
    }
}

/// Shared in-memory mail server.
#[derive(Debug, Clone, Default)]
pub struct FakeServer {
    state: Arc<Mutex<State>>,
}

impl FakeServer {
    /// A server with an empty INBOX.
    pub fn new() -> Self {
        let server = Self::default();
        server.add_folder("INBOX");
        server
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Connector for this server.
    pub fn connector(&self) -> FakeConnector {
        FakeConnector {
            server: self.clone(),
        }
    }

    /// Adds an empty folder.
    pub fn add_folder(&self, name: &str) {
        self.state().ensure_folder(name);
    }

    /// Adds a folder that cannot be selected, like Gmail's `[Gmail]`.
    pub fn add_noselect_folder(&self, name: &str) {
        self.state().ensure_folder(name).selectable = false;
    }

    /// Appends a message; its sequence number is returned.
    pub fn add_message(&self, folder: &str, raw: Vec<u8>) -> u32 {
        let mut state = self.state();
        let folder = state.ensure_folder(folder);
        folder.messages.push(StoredMessage {
            raw,
            deleted: false,
        });
        u32::try_from(folder.messages.len()).unwrap()
    }

    /// Queues a failing connection attempt.
    pub fn fail_connect(&self, failure: ConnectFailure) {
        self.state().connect_script.push_back(Some(failure));
    }

    /// Queues a succeeding connection attempt, so that a later queued
    /// failure hits a reconnect.
    pub fn allow_connect(&self) {
        self.state().connect_script.push_back(None);
    }

    /// Makes full fetches of one message fail.
    pub fn fail_fetch(&self, folder: &str, seq: u32) {
        self.state().fail_fetch.insert((folder.to_string(), seq));
    }

    /// Makes Message-ID fetches of one message fail.
    pub fn fail_header_fetch(&self, folder: &str, seq: u32) {
        self.state().fail_header_fetch.insert((folder.to_string(), seq));
    }

    /// Makes SELECT and EXAMINE of a folder fail.
    pub fn fail_select(&self, folder: &str) {
        self.state().fail_select.insert(folder.to_string());
    }

    /// Makes COPY of one message fail.
    pub fn fail_copy(&self, seq: u32) {
        self.state().fail_copy.insert(seq);
    }

    /// Makes STORE of one message fail.
    pub fn fail_flag(&self, seq: u32) {
        self.state().fail_flag.insert(seq);
    }

    /// Makes the next `count` NOOPs drop the connection.
    pub fn fail_noops(&self, count: usize) {
        self.state().fail_noops = count;
    }

    /// Makes SEARCH fail.
    pub fn fail_search(&self) {
        self.state().fail_search = true;
    }

    /// Makes LIST fail.
    pub fn fail_list(&self) {
        self.state().fail_list = true;
    }

    /// Makes EXPUNGE fail.
    pub fn fail_expunge(&self) {
        self.state().fail_expunge = true;
    }

    /// Mutating commands seen so far, such as `COPY 3 Faturas`.
    pub fn commands(&self) -> Vec<String> {
        self.state().commands.clone()
    }

    /// Successful connections so far.
    pub fn connections(&self) -> usize {
        self.state().connections
    }

    /// Number of messages in a folder, deleted ones included.
    pub fn count(&self, folder: &str) -> usize {
        self.state().folder(folder).map_or(0, |f| f.messages.len())
    }

    /// Message-IDs in a folder, in order.
    pub fn message_ids(&self, folder: &str) -> Vec<String> {
        self.state().folder(folder).map_or_else(Vec::new, |f| {
            f.messages
                .iter()
                .filter_map(|m| MessageIdentifier::from_header_block(&m.raw))
                .map(|id| id.to_string())
                .collect()
        })
    }

    /// Names of every folder.
    pub fn folder_names(&self) -> Vec<String> {
        self.state().folders.iter().map(|f| f.name.clone()).collect()
    }
}

/// [`Connector`] for a [`FakeServer`].
#[derive(Debug, Clone)]
pub struct FakeConnector {
    server: FakeServer,
}

impl Connector for FakeConnector {
    type Store = FakeStore;

    async fn connect(&self, _credentials: &Credentials) -> Result<FakeStore> {
        let mut state = self.server.state();
        match state.connect_script.pop_front().flatten() {
            Some(ConnectFailure::Auth(text)) => Err(Error::Auth(text)),
            Some(ConnectFailure::Network) => Err(connection_reset()),
            None => {
                state.connections += 1;
                Ok(FakeStore {
                    server: self.server.clone(),
                    selected: None,
                    alive: true,
                })
            }
        }
    }

    fn server_name(&self) -> &str {
        "fake.imap.test"
    }
}

fn connection_reset() -> Error {
    Error::Io(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"))
}

fn no(text: impl Into<String>) -> Error {
    Error::No(text.into())
}

/// One connection to a [`FakeServer`].
#[derive(Debug)]
pub struct FakeStore {
    server: FakeServer,
    selected: Option<(String, bool)>,
    alive: bool,
}

impl FakeStore {
    fn check_alive(&self) -> Result<()> {
        if self.alive {
            Ok(())
        } else {
            Err(connection_reset())
        }
    }

    fn selected(&self) -> Result<(String, bool)> {
        self.selected
            .clone()
            .ok_or_else(|| Error::InvalidState("no mailbox selected".into()))
    }

    fn open(&mut self, folder: &str, read_only: bool) -> Result<u32> {
        self.check_alive()?;
        self.selected = None;
        let state = self.server.state();
        if state.fail_select.contains(folder) {
            return Err(no(format!("[NONEXISTENT] cannot open {folder}")));
        }
        let count = match state.folder(folder) {
            Some(f) if f.selectable => f.messages.len(),
            _ => return Err(no(format!("[NONEXISTENT] Unknown Mailbox: {folder}"))),
        };
        drop(state);
        self.selected = Some((folder.to_string(), read_only));
        Ok(u32::try_from(count).unwrap())
    }

    fn message(&self, id: SeqNum) -> Result<(String, Vec<u8>)> {
        let (folder, _) = self.selected()?;
        let state = self.server.state();
        let raw = state
            .folder(&folder)
            .and_then(|f| f.messages.get(id.get() as usize - 1))
            .map(|m| m.raw.clone())
            .ok_or_else(|| Error::Bad(format!("invalid sequence number {id}")))?;
        Ok((folder, raw))
    }

    fn writable(&self) -> Result<String> {
        match self.selected()? {
            (folder, false) => Ok(folder),
            (folder, true) => Err(Error::InvalidState(format!("{folder} is read-only"))),
        }
    }
}

impl MailStore for FakeStore {
    async fn select(&mut self, folder: &str) -> Result<u32> {
        self.open(folder, false)
    }

    async fn examine(&mut self, folder: &str) -> Result<u32> {
        self.open(folder, true)
    }

    async fn search_all(&mut self) -> Result<Vec<SeqNum>> {
        self.check_alive()?;
        let (folder, _) = self.selected()?;
        let state = self.server.state();
        if state.fail_search {
            return Err(no("SEARCH failed"));
        }
        let count = state.folder(&folder).map_or(0, |f| f.messages.len());
        Ok((1..=u32::try_from(count).unwrap())
            .filter_map(SeqNum::new)
            .collect())
    }

    async fn fetch_message(&mut self, id: SeqNum) -> Result<Vec<u8>> {
        self.check_alive()?;
        let (folder, raw) = self.message(id)?;
        if self.server.state().fail_fetch.contains(&(folder, id.get())) {
            return Err(no("FETCH failed"));
        }
        Ok(raw)
    }

    async fn fetch_message_id(&mut self, id: SeqNum) -> Result<Option<MessageIdentifier>> {
        self.check_alive()?;
        let (folder, raw) = self.message(id)?;
        if self.server.state().fail_header_fetch.contains(&(folder, id.get())) {
            return Err(no("FETCH failed"));
        }
        Ok(MessageIdentifier::from_header_block(&raw))
    }

    async fn list_folders(&mut self) -> Result<Vec<String>> {
        self.check_alive()?;
        let state = self.server.state();
        if state.fail_list {
            return Err(no("LIST failed"));
        }
        Ok(state
            .folders
            .iter()
            .filter(|f| f.selectable)
            .map(|f| f.name.clone())
            .collect())
    }

    async fn create_folder(&mut self, name: &str) -> Result<()> {
        self.check_alive()?;
        let mut state = self.server.state();
        if state.folder(name).is_some() {
            return Err(no(format!("[ALREADYEXISTS] Duplicate folder name {name}")));
        }
        state.ensure_folder(name);
        state.commands.push(format!("CREATE {name}"));
        Ok(())
    }

    async fn copy(&mut self, id: SeqNum, folder: &str) -> Result<()> {
        self.check_alive()?;
        let (_, raw) = self.message(id)?;
        let mut state = self.server.state();
        if state.fail_copy.contains(&id.get()) {
            return Err(no("[OVERQUOTA] COPY failed"));
        }
        let Some(target) = state.folder_mut(folder) else {
            return Err(no(format!("[TRYCREATE] no folder {folder}")));
        };
        target.messages.push(StoredMessage {
            raw,
            deleted: false,
        });
        state.commands.push(format!("COPY {id} {folder}"));
        Ok(())
    }

    async fn flag_deleted(&mut self, id: SeqNum) -> Result<()> {
        self.check_alive()?;
        let folder = self.writable()?;
        let mut state = self.server.state();
        if state.fail_flag.contains(&id.get()) {
            return Err(no("STORE failed"));
        }
        let message = state
            .folder_mut(&folder)
            .and_then(|f| f.messages.get_mut(id.get() as usize - 1))
            .ok_or_else(|| Error::Bad(format!("invalid sequence number {id}")))?;
        message.deleted = true;
        state.commands.push(format!("STORE {id} {folder}"));
        Ok(())
    }

    async fn expunge(&mut self) -> Result<()> {
        self.check_alive()?;
        let folder = self.writable()?;
        let mut state = self.server.state();
        if state.fail_expunge {
            return Err(no("EXPUNGE failed"));
        }
        if let Some(f) = state.folder_mut(&folder) {
            f.messages.retain(|m| !m.deleted);
        }
        state.commands.push(format!("EXPUNGE {folder}"));
        Ok(())
    }

    async fn noop(&mut self) -> Result<()> {
        self.check_alive()?;
        let mut state = self.server.state();
        state.commands.push("NOOP".to_string());
        if state.fail_noops > 0 {
            state.fail_noops -= 1;
            self.alive = false;
            return Err(connection_reset());
        }
        Ok(())
    }

    async fn logout(self) -> Result<()> {
        self.check_alive()?;
        self.server.state().commands.push("LOGOUT".to_string());
        Ok(())
    }
}
