//! Parsers for the smaller response grammar pieces.

use crate::parser::lexer::{Lexer, Token};
use crate::types::{Flag, Flags, ListResponse, MailboxAttribute, ResponseCode, SeqNum};
use crate::Result;

/// Parses `resp-text`: an optional `[CODE args]` followed by free text up
/// to the end of the line.
pub fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
    let code = if lexer.eat(b'[') {
        let name = lexer.read_atom()?;
        lexer.eat(b' ');
        let args = String::from_utf8_lossy(lexer.take_until(b']')).into_owned();
        lexer.expect(Token::RBracket)?;
        lexer.eat(b' ');
        Some(ResponseCode::from_parts(name, args.trim()))
    } else {
        None
    };
    Ok((code, lexer.rest_of_line()))
}

/// Parses a parenthesized flag list.
pub fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<Flags> {
    lexer.expect(Token::LParen)?;
    let mut flags = Flags::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => return Ok(flags),
            Token::Space => {}
            // `\*` in PERMANENTFLAGS lexes as `\` then `*`
            Token::Atom("\\") if lexer.eat(b'*') => flags.insert(Flag::Keyword("\\*".into())),
            Token::Atom(s) => flags.insert(Flag::parse(s)),
            token => return Err(lexer.error(format!("unexpected {token:?} in flag list"))),
        }
    }
}

/// Parses the body of a LIST response: `(attrs) delimiter name`.
pub fn parse_list(lexer: &mut Lexer<'_>) -> Result<ListResponse> {
    lexer.expect(Token::LParen)?;
    let mut attributes = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(s) => attributes.push(MailboxAttribute::parse(s)),
            token => return Err(lexer.error(format!("unexpected {token:?} in LIST attributes"))),
        }
    }
    lexer.expect_space()?;

    let delimiter = match lexer.next_token()? {
        Token::Nil => None,
        Token::QuotedString(s) => s.chars().next(),
        token => return Err(lexer.error(format!("expected delimiter, got {token:?}"))),
    };
    lexer.expect_space()?;

    let name = lexer.read_astring()?;
    Ok(ListResponse {
        attributes,
        delimiter,
        name,
    })
}

/// Parses the numbers of a SEARCH response.
pub fn parse_search(lexer: &mut Lexer<'_>) -> Result<Vec<SeqNum>> {
    let mut nums = Vec::new();
    while lexer.eat(b' ') {
        match lexer.next_token()? {
            Token::Number(n) => nums.extend(SeqNum::new(n)),
            // Trailing space before CRLF, sent by some servers
            Token::Crlf | Token::Eof => break,
            token => return Err(lexer.error(format!("unexpected {token:?} in SEARCH"))),
        }
    }
    Ok(nums)
}

/// Parses the atoms of a CAPABILITY response.
pub fn parse_capabilities(lexer: &mut Lexer<'_>) -> Result<Vec<String>> {
    let mut caps = Vec::new();
    while lexer.eat(b' ') {
        if let Token::Atom(s) = lexer.next_token()? {
            caps.push(s.to_string());
        }
    }
    Ok(caps)
}
