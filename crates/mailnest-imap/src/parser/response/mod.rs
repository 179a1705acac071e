//! Response parser.
//!
//! Turns one framed response (as returned by the framing layer, literals
//! inlined) into a [`Response`].

#![allow(clippy::missing_errors_doc)]

mod fetch;
mod helpers;
mod types;

pub use types::{FetchItem, UntaggedResponse};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{ResponseCode, SeqNum, Status, Tag};
use crate::{Error, Result};

use helpers::{parse_capabilities, parse_flag_list, parse_list, parse_resp_text, parse_search};

/// A parsed IMAP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Command completion.
    Tagged {
        /// Tag of the completed command.
        tag: Tag,
        /// Completion status.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Server data.
    Untagged(UntaggedResponse),
    /// Continuation request (`+ ...`).
    Continuation {
        /// Text after the `+`, if any.
        text: Option<String>,
    },
}

impl Response {
    /// Text of a completion, prefixed with its response code if any, e.g.
    /// `[AUTHENTICATIONFAILED] Invalid credentials (Failure)`.
    #[must_use]
    pub fn describe(code: Option<&ResponseCode>, text: &str) -> String {
        match code {
            Some(code) if text.is_empty() => code.to_string(),
            Some(code) => format!("{code} {text}"),
            None => text.to_string(),
        }
    }
}

/// Stateless response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a complete response.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);
        match lexer.next_token()? {
            Token::Asterisk => {
                lexer.expect_space()?;
                Self::untagged(&mut lexer).map(Response::Untagged)
            }
            Token::Plus => {
                lexer.eat(b' ');
                let text = lexer.rest_of_line();
                Ok(Response::Continuation {
                    text: (!text.is_empty()).then_some(text),
                })
            }
            Token::Atom(tag) => {
                let tag = Tag::new(tag);
                lexer.expect_space()?;
                let status = parse_status(lexer.read_atom()?)
                    .ok_or_else(|| lexer.error("invalid completion status"))?;
                lexer.eat(b' ');
                let (code, text) = parse_resp_text(&mut lexer)?;
                Ok(Response::Tagged {
                    tag,
                    status,
                    code,
                    text,
                })
            }
            token => Err(Error::Parse {
                position: 0,
                message: format!("expected '*', '+' or a tag, got {token:?}"),
            }),
        }
    }

    fn untagged(lexer: &mut Lexer<'_>) -> Result<UntaggedResponse> {
        match lexer.next_token()? {
            Token::Number(n) => {
                lexer.expect_space()?;
                let keyword = lexer.read_atom()?.to_ascii_uppercase();
                let seq = SeqNum::new(n);
                match keyword.as_str() {
                    "EXISTS" => Ok(UntaggedResponse::Exists(n)),
                    "RECENT" => Ok(UntaggedResponse::Recent(n)),
                    "EXPUNGE" => seq
                        .map(UntaggedResponse::Expunge)
                        .ok_or_else(|| lexer.error("sequence number 0")),
                    "FETCH" => {
                        let seq = seq.ok_or_else(|| lexer.error("sequence number 0"))?;
                        lexer.expect_space()?;
                        let items = fetch::parse_fetch_items(lexer)?;
                        Ok(UntaggedResponse::Fetch { seq, items })
                    }
                    other => Err(lexer.error(format!("unknown message data {other}"))),
                }
            }
            Token::Atom(word) => {
                let upper = word.to_ascii_uppercase();
                if let Some(status) = parse_status(&upper) {
                    lexer.eat(b' ');
                    let (code, text) = parse_resp_text(lexer)?;
                    return Ok(UntaggedResponse::Condition { status, code, text });
                }
                match upper.as_str() {
                    "CAPABILITY" => parse_capabilities(lexer).map(UntaggedResponse::Capability),
                    "FLAGS" => {
                        lexer.expect_space()?;
                        parse_flag_list(lexer).map(UntaggedResponse::Flags)
                    }
                    "LIST" | "LSUB" => {
                        lexer.expect_space()?;
                        parse_list(lexer).map(UntaggedResponse::List)
                    }
                    "SEARCH" => parse_search(lexer).map(UntaggedResponse::Search),
                    _ => Err(lexer.error(format!("unsupported untagged response {word}"))),
                }
            }
            token => Err(lexer.error(format!("unexpected {token:?} after '*'"))),
        }
    }
}

fn parse_status(word: &str) -> Option<Status> {
    match word.to_ascii_uppercase().as_str() {
        "OK" => Some(Status::Ok),
        "NO" => Some(Status::No),
        "BAD" => Some(Status::Bad),
        "PREAUTH" => Some(Status::PreAuth),
        "BYE" => Some(Status::Bye),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Flag;

    #[test]
    fn test_greeting() {
        let response = ResponseParser::parse(b"* OK Gimap ready for requests\r\n").unwrap();
        assert_eq!(
            response,
            Response::Untagged(UntaggedResponse::Condition {
                status: Status::Ok,
                code: None,
                text: "Gimap ready for requests".to_string(),
            })
        );
    }

    #[test]
    fn test_tagged_auth_failure() {
        let input = b"A0000 NO [AUTHENTICATIONFAILED] Invalid credentials (Failure)\r\n";
        match ResponseParser::parse(input).unwrap() {
            Response::Tagged {
                tag,
                status,
                code,
                text,
            } => {
                assert_eq!(tag.as_str(), "A0000");
                assert_eq!(status, Status::No);
                assert_eq!(code, Some(ResponseCode::AuthenticationFailed));
                assert_eq!(text, "Invalid credentials (Failure)");
                assert_eq!(
                    Response::describe(code.as_ref(), &text),
                    "[AUTHENTICATIONFAILED] Invalid credentials (Failure)"
                );
            }
            other => panic!("expected tagged, got {other:?}"),
        }
    }

    #[test]
    fn test_untagged_ok_with_code() {
        let input = b"* OK [PERMANENTFLAGS (\\Deleted \\Seen \\*)] Flags permitted.\r\n";
        match ResponseParser::parse(input).unwrap() {
            Response::Untagged(UntaggedResponse::Condition { code, text, .. }) => {
                assert!(matches!(code, Some(ResponseCode::Other { ref name, .. }) if name == "PERMANENTFLAGS"));
                assert_eq!(text, "Flags permitted.");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_read_only_completion() {
        let input = b"A0003 OK [READ-ONLY] EXAMINE completed\r\n";
        match ResponseParser::parse(input).unwrap() {
            Response::Tagged { code, .. } => assert_eq!(code, Some(ResponseCode::ReadOnly)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_search() {
        let response = ResponseParser::parse(b"* SEARCH 1 2 30\r\n").unwrap();
        let Response::Untagged(UntaggedResponse::Search(nums)) = response else {
            panic!("expected SEARCH");
        };
        assert_eq!(nums.iter().map(|s| s.get()).collect::<Vec<_>>(), vec![1, 2, 30]);

        let empty = ResponseParser::parse(b"* SEARCH\r\n").unwrap();
        assert_eq!(empty, Response::Untagged(UntaggedResponse::Search(vec![])));
    }

    #[test]
    fn test_list_quoted_names() {
        let input = b"* LIST (\\HasChildren \\Noselect) \"/\" \"[Gmail]\"\r\n";
        let Response::Untagged(UntaggedResponse::List(list)) = ResponseParser::parse(input).unwrap()
        else {
            panic!("expected LIST");
        };
        assert_eq!(list.name, "[Gmail]");
        assert_eq!(list.delimiter, Some('/'));
        assert!(!list.is_selectable());

        let input = b"* LIST (\\HasNoChildren) \"/\" INBOX\r\n";
        let Response::Untagged(UntaggedResponse::List(list)) = ResponseParser::parse(input).unwrap()
        else {
            panic!("expected LIST");
        };
        assert_eq!(list.name, "INBOX");
        assert!(list.is_selectable());
    }

    #[test]
    fn test_list_literal_name() {
        let input = b"* LIST () \"/\" {12}\r\nNotas Fiscal\r\n";
        let Response::Untagged(UntaggedResponse::List(list)) = ResponseParser::parse(input).unwrap()
        else {
            panic!("expected LIST");
        };
        assert_eq!(list.name, "Notas Fiscal");
    }

    #[test]
    fn test_message_data() {
        assert_eq!(
            ResponseParser::parse(b"* 23 EXISTS\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Exists(23))
        );
        assert_eq!(
            ResponseParser::parse(b"* 0 RECENT\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Recent(0))
        );
        assert!(ResponseParser::parse(b"* 0 EXPUNGE\r\n").is_err());
    }

    #[test]
    fn test_fetch_header_fields_literal() {
        let input =
            b"* 4 FETCH (BODY[HEADER.FIELDS (MESSAGE-ID)] {29}\r\nMessage-ID: <a@b.example>\r\n\r\n)\r\n";
        let Response::Untagged(UntaggedResponse::Fetch { seq, items }) =
            ResponseParser::parse(input).unwrap()
        else {
            panic!("expected FETCH");
        };
        assert_eq!(seq.get(), 4);
        assert_eq!(
            items,
            vec![FetchItem::Body {
                section: Some("HEADER.FIELDS (MESSAGE-ID)".to_string()),
                data: Some(b"Message-ID: <a@b.example>\r\n\r\n".to_vec()),
            }]
        );
    }

    #[test]
    fn test_fetch_skips_unknown_items() {
        let input = b"* 9 FETCH (X-GM-LABELS (\\Inbox \"Work\") FLAGS (\\Seen \\Deleted) UID 77 BODY[] NIL)\r\n";
        let Response::Untagged(UntaggedResponse::Fetch { items, .. }) =
            ResponseParser::parse(input).unwrap()
        else {
            panic!("expected FETCH");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], FetchItem::Flags(f) if f.contains(&Flag::Deleted)));
        assert_eq!(items[1], FetchItem::Uid(77));
        assert_eq!(
            items[2],
            FetchItem::Body {
                section: None,
                data: None
            }
        );
    }

    #[test]
    fn test_fetch_quoted_body() {
        let input = b"* 2 FETCH (BODY[HEADER.FIELDS (MESSAGE-ID)] \"\")\r\n";
        let Response::Untagged(UntaggedResponse::Fetch { items, .. }) =
            ResponseParser::parse(input).unwrap()
        else {
            panic!("expected FETCH");
        };
        assert!(matches!(&items[0], FetchItem::Body { data: Some(d), .. } if d.is_empty()));
    }

    #[test]
    fn test_continuation() {
        assert_eq!(
            ResponseParser::parse(b"+ Ready\r\n").unwrap(),
            Response::Continuation {
                text: Some("Ready".to_string())
            }
        );
        assert_eq!(
            ResponseParser::parse(b"+\r\n").unwrap(),
            Response::Continuation { text: None }
        );
    }

    #[test]
    fn test_unknown_untagged_is_error() {
        assert!(ResponseParser::parse(b"* ID (\"name\" \"GImap\")\r\n").is_err());
    }
}
