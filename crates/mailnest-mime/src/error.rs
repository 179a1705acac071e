//! Errors from the standalone decoders.
//!
//! [`Message::parse`](crate::Message::parse) never fails; these surface only
//! from [`crate::encoding`] and [`ContentType::parse`](crate::ContentType::parse).

/// Decoder result.
pub type Result<T> = std::result::Result<T, Error>;

/// A value that could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input is not a single RFC 2047 encoded word.
    #[error("not an encoded word: {0}")]
    NotEncodedWord(String),

    /// Malformed base64 body.
    #[error("bad base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// `Content-Type` value without a `type/subtype`.
    #[error("bad content type: {0:?}")]
    ContentType(String),
}
