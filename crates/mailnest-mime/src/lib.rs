//! # mailnest-mime
//!
//! Lenient MIME message parsing for classifying mail.
//!
//! ## Features
//!
//! - **Message parsing**: never fails, tolerates missing separators,
//!   broken boundaries and bad encodings
//! - **Multipart walk**: nested `multipart/*` and attached `message/rfc822`
//! - **Decoding**: Base64, Quoted-Printable, RFC 2047 encoded words,
//!   UTF-8 and Latin-1 charsets
//!
//! ## Quick Start
//!
//! ```
//! use mailnest_mime::Message;
//!
//! let raw = b"From: sender@example.com\r\n\
//!             Subject: =?utf-8?Q?Reuni=C3=A3o?=\r\n\
//!             Message-ID: <1@example.com>\r\n\
//!             \r\n\
//!             Pauta em anexo.";
//!
//! let message = Message::parse(raw);
//! assert_eq!(message.subject().as_deref(), Some("Reunião"));
//! assert_eq!(message.message_id().as_deref(), Some("<1@example.com>"));
//! assert_eq!(message.plain_text(), "Pauta em anexo.");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Body, Message, Part, TransferEncoding};
