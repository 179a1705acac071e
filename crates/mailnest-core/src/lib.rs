//! # mailnest-core
//!
//! The mailbox organizing engine.
//!
//! An organize run connects to the mail server, fetches the newest inbox
//! messages, sorts each into a category folder, expunges the inbox and then
//! removes inbox messages that already have a copy in an organized folder.
//! A dedupe run does only the last step.
//!
//! - [`classify`](mod@classify): keyword rules with a sentiment fallback
//! - [`session`]: the run's connection, keepalive and reconnect
//! - [`listing`]: bounded, failure-tolerant inbox fetch
//! - [`mover`]: copy to the category folder and flag
//! - [`dedup`]: `Message-ID` duplicate detection and removal
//! - [`orchestrator`]: the [`organize`] and [`dedupe`] entry points
//!
//! Callers observe a run through a [`RunObserver`], which receives log
//! lines, monotonic progress and exactly one terminal event.
//!
//! ```ignore
//! use mailnest_core::{Credentials, EngineConfig, ImapConnector, NullObserver, organize};
//!
//! let config = EngineConfig::default();
//! let connector = ImapConnector::new(config.server.imap_config());
//! let credentials = Credentials::new("someone@gmail.com", "app password");
//! let outcome = organize(&connector, &credentials, &config, &NullObserver).await?;
//! println!("{} organized", outcome.total());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod classify;
pub mod config;
pub mod dedup;
mod error;
pub mod listing;
pub mod message;
pub mod mover;
pub mod observer;
pub mod orchestrator;
pub mod outcome;
pub mod session;
pub mod store;

/// Name of the inbox folder.
pub const INBOX: &str = "INBOX";

pub use classify::{Category, classify};
pub use config::{EngineConfig, ServerConfig};
pub use dedup::deduplicate;
pub use error::{APP_PASSWORD_HINT, Error, MAX_LOGGED_ERROR_LEN, Result, truncate_for_log};
pub use message::{MessageIdentifier, MessageRecord, NO_SUBJECT};
pub use observer::{NullObserver, Reporter, RunObserver};
pub use orchestrator::{RunState, dedupe, organize};
pub use outcome::{DedupReport, DedupStatus, RunOutcome};
pub use session::MailSession;
pub use store::{Connector, Credentials, ImapConnector, ImapMailbox, MailStore};
