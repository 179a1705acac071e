//! FETCH response parsing.

use crate::parser::lexer::{Lexer, Token};
use crate::Result;

use super::helpers::parse_flag_list;
use super::types::FetchItem;

/// Parses the parenthesized item list of `* n FETCH (...)`.
///
/// Items this client never asks for (ENVELOPE, BODYSTRUCTURE, Gmail
/// extensions, ...) are skipped whole.
pub fn parse_fetch_items(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;
    let mut items = Vec::new();

    loop {
        let name = match lexer.next_token()? {
            Token::RParen => return Ok(items),
            Token::Space => continue,
            Token::Atom(name) => name.to_ascii_uppercase(),
            token => return Err(lexer.error(format!("unexpected {token:?} in FETCH"))),
        };

        match name.as_str() {
            "FLAGS" => {
                lexer.expect_space()?;
                items.push(FetchItem::Flags(parse_flag_list(lexer)?));
            }
            "UID" => {
                lexer.expect_space()?;
                items.push(FetchItem::Uid(lexer.read_number()?));
            }
            "RFC822.SIZE" => {
                lexer.expect_space()?;
                items.push(FetchItem::Rfc822Size(lexer.read_number()?));
            }
            "BODY" | "BINARY" | "RFC822" | "RFC822.HEADER" | "RFC822.TEXT" => {
                let section = parse_section(lexer)?;
                lexer.expect_space()?;
                let data = lexer.read_nstring_bytes()?;
                items.push(FetchItem::Body { section, data });
            }
            _ => {
                lexer.expect_space()?;
                lexer.skip_value()?;
            }
        }
    }
}

/// Parses the optional `[section]` and `<origin>` after BODY.
fn parse_section(lexer: &mut Lexer<'_>) -> Result<Option<String>> {
    if !lexer.eat(b'[') {
        return Ok(None);
    }
    let section = String::from_utf8_lossy(lexer.take_until(b']')).into_owned();
    lexer.expect(Token::RBracket)?;

    if lexer.eat(b'<') {
        lexer.take_until(b'>');
        lexer.eat(b'>');
    }

    Ok(if section.is_empty() { None } else { Some(section) })
}
