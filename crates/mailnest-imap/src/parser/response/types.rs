//! Parsed response data.

use crate::types::{Flags, ListResponse, ResponseCode, SeqNum, Status};

/// One data item of a FETCH response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// `FLAGS (...)`
    Flags(Flags),
    /// `UID n`
    Uid(u32),
    /// `RFC822.SIZE n`
    Rfc822Size(u32),
    /// `BODY[section]` or `RFC822*` payload.
    Body {
        /// Section spec as sent by the server; `None` for the whole message.
        section: Option<String>,
        /// Payload; `None` when the server sent `NIL`.
        data: Option<Vec<u8>>,
    },
}

/// Untagged server data (`* ...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// `OK`, `NO`, `BAD`, `PREAUTH` or `BYE` with optional code and text.
    Condition {
        /// Status word.
        status: Status,
        /// Bracketed response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// `CAPABILITY ...`
    Capability(Vec<String>),
    /// `FLAGS (...)`
    Flags(Flags),
    /// `LIST ...`
    List(ListResponse),
    /// `SEARCH n n n`
    Search(Vec<SeqNum>),
    /// `n EXISTS`
    Exists(u32),
    /// `n RECENT`
    Recent(u32),
    /// `n EXPUNGE`
    Expunge(SeqNum),
    /// `n FETCH (...)`
    Fetch {
        /// Message the data belongs to.
        seq: SeqNum,
        /// Data items.
        items: Vec<FetchItem>,
    },
}
