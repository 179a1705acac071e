//! # mailnest-imap
//!
//! A small async IMAP4rev1 client covering what a mailbox organizer needs:
//! login, folder listing and creation, SELECT/EXAMINE, `SEARCH ALL`,
//! FETCH of whole messages or single header fields, COPY, flagging for
//! deletion, EXPUNGE, NOOP and LOGOUT.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailnest_imap::{Client, Config, FetchAttribute};
//!
//! #[tokio::main]
//! async fn main() -> mailnest_imap::Result<()> {
//!     let mut client = Client::connect(&Config::new("imap.gmail.com")).await?;
//!     client.login("someone@gmail.com", "app password").await?;
//!
//!     client.select("INBOX").await?;
//!     for seq in client.search_all().await? {
//!         let raw = client.fetch_body(seq, FetchAttribute::full_message()).await?;
//!         println!("{seq}: {} bytes", raw.len());
//!     }
//!
//!     client.logout().await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: command builders and wire serialization
//! - [`connection`]: transport, framing and the [`Client`]
//! - [`parser`]: sans-I/O response parser
//! - [`types`]: flags, sequence numbers, mailbox data

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::{Command, FetchAttribute, TagGenerator};
pub use connection::{
    Client, Config, ConfigBuilder, FramedStream, ImapStream, Security, SessionState,
};
pub use error::{Error, Result};
pub use parser::{FetchItem, Response, ResponseParser, UntaggedResponse};
pub use types::{
    Flag, Flags, ListResponse, MailboxAttribute, MailboxStatus, ResponseCode, SeqNum, Status, Tag,
};
