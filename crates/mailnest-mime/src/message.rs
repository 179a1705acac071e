//! MIME entity tree.

use crate::content_type::ContentType;
use crate::encoding::{decode_base64, decode_charset, decode_quoted_printable};
use crate::header::Headers;
use std::fmt;

/// Nesting depth past which bodies are kept as opaque leaves.
const MAX_DEPTH: usize = 32;

/// Content-Transfer-Encoding of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Raw binary.
    Binary,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Parses a transfer encoding name; unknown names are identity.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "binary" => Self::Binary,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::SevenBit,
        }
    }

    /// Undoes the encoding.
    ///
    /// Base64 that fails to decode is returned unchanged.
    #[must_use]
    pub fn decode(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Base64 => decode_base64(data).unwrap_or_else(|_| data.to_vec()),
            Self::QuotedPrintable => decode_quoted_printable(data),
            Self::SevenBit | Self::EightBit | Self::Binary => data.to_vec(),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Binary => write!(f, "binary"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
        }
    }
}

/// Body of a MIME entity.
#[derive(Debug, Clone)]
pub enum Body {
    /// Still transfer-encoded content.
    Leaf(Vec<u8>),
    /// Children of a `multipart/*` entity.
    Multipart(Vec<Part>),
    /// An attached `message/rfc822`.
    Message(Box<Part>),
}

/// A MIME entity: headers plus body.
#[derive(Debug, Clone)]
pub struct Part {
    /// Entity headers.
    pub headers: Headers,
    /// Entity body.
    pub body: Body,
}

impl Part {
    fn parse(raw: &[u8], depth: usize) -> Self {
        let (head, body) = split_header_body(raw);
        let headers = Headers::parse(&String::from_utf8_lossy(head));
        let content_type = content_type_of(&headers);

        let body = if depth >= MAX_DEPTH {
            Body::Leaf(body.to_vec())
        } else if let Some(boundary) = content_type.boundary().filter(|_| content_type.is_multipart()) {
            Body::Multipart(
                split_multipart(body, boundary)
                    .into_iter()
                    .map(|part| Self::parse(part, depth + 1))
                    .collect(),
            )
        } else if content_type.is_message() {
            let inner = transfer_encoding_of(&headers).decode(body);
            Body::Message(Box::new(Self::parse(&inner, depth + 1)))
        } else {
            Body::Leaf(body.to_vec())
        };

        Self { headers, body }
    }

    /// Content type, defaulting to `text/plain` when absent or malformed.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        content_type_of(&self.headers)
    }

    /// Content-Transfer-Encoding of this entity.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        transfer_encoding_of(&self.headers)
    }

    /// Decoded text of a leaf entity, `None` for containers.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let Body::Leaf(data) = &self.body else {
            return None;
        };
        let bytes = self.transfer_encoding().decode(data);
        Some(decode_charset(&bytes, self.content_type().charset()))
    }

    /// Appends the text of every `text/plain` leaf, depth first.
    fn collect_plain_text(&self, out: &mut String) {
        match &self.body {
            Body::Leaf(_) => {
                if self.content_type().is_text_plain()
                    && let Some(text) = self.text()
                {
                    out.push_str(&text);
                }
            }
            Body::Multipart(parts) => {
                for part in parts {
                    part.collect_plain_text(out);
                }
            }
            Body::Message(inner) => inner.collect_plain_text(out),
        }
    }
}

/// A parsed message.
#[derive(Debug, Clone)]
pub struct Message {
    root: Part,
}

impl Message {
    /// Parses raw RFC 5322 message bytes.
    ///
    /// Parsing never fails. Input without a blank line after the headers
    /// is all headers; a multipart without a usable boundary is kept as a
    /// single opaque body.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        Self {
            root: Part::parse(raw, 0),
        }
    }

    /// Top-level headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.root.headers
    }

    /// The top-level entity.
    #[must_use]
    pub const fn root(&self) -> &Part {
        &self.root
    }

    /// Decoded Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<String> {
        self.root.headers.get_decoded("subject")
    }

    /// Message-ID header, trimmed; `None` if absent or blank.
    #[must_use]
    pub fn message_id(&self) -> Option<String> {
        self.root
            .headers
            .get("message-id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string)
    }

    /// Concatenated text of every `text/plain` part, in document order.
    ///
    /// Attachments and forwarded messages are included. Empty when the
    /// message has no plain-text part.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.root.collect_plain_text(&mut out);
        out
    }
}

fn content_type_of(headers: &Headers) -> ContentType {
    headers
        .get("content-type")
        .and_then(|value| ContentType::parse(value).ok())
        .unwrap_or_default()
}

fn transfer_encoding_of(headers: &Headers) -> TransferEncoding {
    headers
        .get("content-transfer-encoding")
        .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
}

/// Splits an entity at the first empty line.
fn split_header_body(raw: &[u8]) -> (&[u8], &[u8]) {
    if let Some(body) = raw.strip_prefix(b"\r\n").or_else(|| raw.strip_prefix(b"\n")) {
        return (&[], body);
    }

    for (i, _) in raw.iter().enumerate().filter(|&(_, &b)| b == b'\n') {
        let rest = &raw[i + 1..];
        if rest.starts_with(b"\r\n") {
            return (&raw[..=i], &rest[2..]);
        }
        if rest.starts_with(b"\n") {
            return (&raw[..=i], &rest[1..]);
        }
    }

    (raw, &[])
}

/// Splits a multipart body into its raw parts.
///
/// The preamble and epilogue are dropped. A body whose closing delimiter
/// is missing keeps everything after the last delimiter as its final part.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{boundary}");
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;
    let mut pos = 0;

    while pos < body.len() {
        let line_end = body[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(body.len(), |i| pos + i + 1);
        let line = body[pos..line_end].trim_ascii_end();

        if let Some(rest) = line.strip_prefix(delimiter.as_bytes()) {
            let closing = rest.starts_with(b"--");
            if closing || rest.is_empty() {
                if let Some(s) = start {
                    parts.push(strip_line_break(&body[s..pos]));
                }
                if closing {
                    return parts;
                }
                start = Some(line_end);
            }
        }
        pos = line_end;
    }

    if let Some(s) = start {
        parts.push(&body[s..]);
    }
    parts
}

/// The line break before a delimiter belongs to the delimiter.
fn strip_line_break(part: &[u8]) -> &[u8] {
    part.strip_suffix(b"\r\n")
        .or_else(|| part.strip_suffix(b"\n"))
        .unwrap_or(part)
}
