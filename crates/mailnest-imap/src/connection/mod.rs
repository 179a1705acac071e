//! Connection management: configuration, transport, framing and the
//! client itself.

mod client;
mod config;
mod framed;
mod stream;

pub use client::{Client, SessionState};
pub use config::{Config, ConfigBuilder, Security};
pub use framed::FramedStream;
pub use stream::{ImapStream, connect, create_tls_connector};
