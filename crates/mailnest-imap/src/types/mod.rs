//! Core IMAP types.

#![allow(clippy::missing_const_for_fn)]

mod flags;
mod identifiers;
mod mailbox;
mod status;

pub use flags::{Flag, Flags};
pub use identifiers::{SeqNum, Tag};
pub use mailbox::{ListResponse, MailboxAttribute, MailboxStatus};
pub use status::{ResponseCode, Status};
