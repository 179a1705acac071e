//! Messages as the engine sees them.

use std::fmt;

use mailnest_imap::SeqNum;
use mailnest_mime::{Headers, Message};

/// Subject used when a message has none.
pub const NO_SUBJECT: &str = "(Sem assunto)";

/// One listed inbox message, ready to classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Sequence number in the inbox. Valid only until the next purge.
    pub id: SeqNum,
    /// Decoded subject, or [`NO_SUBJECT`].
    pub subject: String,
    /// Every `text/plain` part, concatenated.
    pub body: String,
}

impl MessageRecord {
    /// Builds a record from a full RFC 5322 message.
    #[must_use]
    pub fn from_raw(id: SeqNum, raw: &[u8]) -> Self {
        let message = Message::parse(raw);
        let subject = message
            .subject()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| NO_SUBJECT.to_string());
        Self {
            id,
            subject,
            body: message.plain_text(),
        }
    }

    /// Subject shortened for log lines.
    #[must_use]
    pub fn short_subject(&self) -> &str {
        match self.subject.char_indices().nth(50) {
            Some((cut, _)) => &self.subject[..cut],
            None => &self.subject,
        }
    }
}

/// A `Message-ID` value: the duplicate detection key.
///
/// Never empty. Two messages with equal identifiers are the same logical
/// message whatever folder they sit in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageIdentifier(String);

impl MessageIdentifier {
    /// Trims `value`; `None` if nothing is left.
    #[must_use]
    pub fn new(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Extracts the identifier from a header block such as the answer to
    /// `BODY.PEEK[HEADER.FIELDS (MESSAGE-ID)]`.
    #[must_use]
    pub fn from_header_block(raw: &[u8]) -> Option<Self> {
        let headers = Headers::parse(&String::from_utf8_lossy(raw));
        headers.get("message-id").and_then(Self::new)
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
