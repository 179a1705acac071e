//! Transfer-encoding, charset and RFC 2047 decoding.
//!
//! Every decoder here is lenient: mail in the wild is full of unpadded
//! base64, stray `=` signs and mislabelled charsets, and a message that
//! decodes badly is still worth classifying.

use crate::error::{Error, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Base64 engine that accepts missing or extra padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes base64 data, ignoring embedded whitespace and line breaks.
///
/// # Errors
///
/// Returns an error if the input contains bytes outside the base64
/// alphabet.
pub fn decode_base64(data: &[u8]) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    LENIENT_BASE64.decode(cleaned).map_err(Into::into)
}

/// Decodes quoted-printable data (RFC 2045 section 6.7).
///
/// Soft line breaks are removed. An `=` that does not start a valid escape
/// is kept as is.
#[must_use]
pub fn decode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        if byte != b'=' {
            out.push(byte);
            i += 1;
            continue;
        }

        match (data.get(i + 1), data.get(i + 2)) {
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n'), _) => i += 2,
            (Some(&hi), Some(&lo)) => match (hex_value(hi), hex_value(lo)) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'=');
                    i += 1;
                }
            },
            _ => {
                out.push(b'=');
                i += 1;
            }
        }
    }

    out
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// Converts bytes in the given charset to text.
///
/// UTF-8 and US-ASCII are decoded as UTF-8. ISO-8859-1 and Windows-1252
/// are both mapped byte-for-codepoint. Anything else is treated as UTF-8;
/// invalid sequences are dropped rather than replaced.
#[must_use]
pub fn decode_charset(bytes: &[u8], charset: Option<&str>) -> String {
    let charset = charset.map(|c| c.trim().trim_matches('"').to_ascii_lowercase());
    if let Some(
        "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" | "windows-1252"
        | "cp1252",
    ) = charset.as_deref()
    {
        return bytes.iter().copied().map(char::from).collect();
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => String::from_utf8_lossy(bytes)
            .chars()
            .filter(|&c| c != char::REPLACEMENT_CHARACTER)
            .collect(),
    }
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Whitespace between two adjacent encoded words is removed, as the RFC
/// requires. Malformed encoded words are left in the output verbatim.
#[must_use]
pub fn decode_header_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);
        if let Some((decoded, consumed)) = decode_encoded_word(candidate) {
            if !(after_word && before.chars().all(char::is_whitespace)) {
                out.push_str(before);
            }
            out.push_str(&decoded);
            rest = &candidate[consumed..];
            after_word = true;
        } else {
            out.push_str(before);
            out.push_str("=?");
            rest = &candidate[2..];
            after_word = false;
        }
    }

    out.push_str(rest);
    out
}

/// Decodes one `=?charset?encoding?text?=` word at the start of `input`.
///
/// Returns the text and the number of bytes consumed.
fn decode_encoded_word(input: &str) -> Option<(String, usize)> {
    let body = input.strip_prefix("=?")?;
    let (charset, body) = body.split_once('?')?;
    let (encoding, body) = body.split_once('?')?;
    let end = body.find("?=")?;
    let text = &body[..end];

    if charset.is_empty() || charset.contains(char::is_whitespace) || text.contains(char::is_whitespace) {
        return None;
    }

    let bytes = match encoding {
        "B" | "b" => decode_base64(text.as_bytes()).ok()?,
        "Q" | "q" => decode_q(text),
        _ => return None,
    };

    // RFC 2231 language suffix: `utf-8*pt-BR`.
    let charset = charset.split('*').next().unwrap_or(charset);
    let consumed = input.len() - body[end + 2..].len();
    Some((decode_charset(&bytes, Some(charset)), consumed))
}

/// The "Q" encoding: quoted-printable with `_` standing for space.
fn decode_q(text: &str) -> Vec<u8> {
    let spaced: Vec<u8> = text
        .bytes()
        .map(|b| if b == b'_' { b' ' } else { b })
        .collect();
    decode_quoted_printable(&spaced)
}

/// Decodes a single encoded word, failing if it is not one.
///
/// # Errors
///
/// Returns [`Error::NotEncodedWord`] if `word` is not exactly one valid
/// encoded word.
pub fn decode_rfc2047(word: &str) -> Result<String> {
    match decode_encoded_word(word) {
        Some((text, consumed)) if consumed == word.len() => Ok(text),
        _ => Err(Error::NotEncodedWord(word.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_with_line_breaks() {
        let decoded = decode_base64(b"SGVsbG8s\r\nIFdvcmxkIQ==\r\n").unwrap();
        assert_eq!(decoded, b"Hello, World!");
    }

    #[test]
    fn test_base64_missing_padding() {
        assert_eq!(decode_base64(b"SGk").unwrap(), b"Hi");
    }

    #[test]
    fn test_base64_invalid() {
        assert!(decode_base64(b"not*base64").is_err());
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(decode_quoted_printable(b"H=C3=A9llo"), "Héllo".as_bytes());
        assert_eq!(decode_quoted_printable(b"Hello=\r\nWorld"), b"HelloWorld");
        assert_eq!(decode_quoted_printable(b"Hello=\nWorld"), b"HelloWorld");
    }

    #[test]
    fn test_quoted_printable_stray_equals() {
        assert_eq!(decode_quoted_printable(b"a=zz b="), b"a=zz b=");
        assert_eq!(decode_quoted_printable(b"1+1=2"), b"1+1=2");
    }

    #[test]
    fn test_charset_latin1() {
        assert_eq!(decode_charset(&[0x72, 0x65, 0x75, 0x6E, 0x69, 0xE3, 0x6F], Some("ISO-8859-1")), "reunião");
        assert_eq!(decode_charset(&[0xE9], Some("windows-1252")), "é");
    }

    #[test]
    fn test_charset_unknown_drops_invalid() {
        assert_eq!(decode_charset(b"ok\xFFok", Some("koi8-r")), "okok");
        assert_eq!(decode_charset("ção".as_bytes(), None), "ção");
    }

    #[test]
    fn test_header_value_plain() {
        assert_eq!(decode_header_value("Hello there"), "Hello there");
    }

    #[test]
    fn test_header_value_base64_word() {
        assert_eq!(decode_header_value("=?utf-8?B?SMOpbGxv?="), "Héllo");
    }

    #[test]
    fn test_header_value_q_word() {
        assert_eq!(
            decode_header_value("=?ISO-8859-1?Q?Reuni=E3o_amanh=E3?="),
            "Reunião amanhã"
        );
    }

    #[test]
    fn test_header_value_adjacent_words_joined() {
        let value = "=?utf-8?Q?Nota_?= =?utf-8?Q?fiscal?=\r\n =?utf-8?B?IGRpc3BvbsOtdmVs?=";
        assert_eq!(decode_header_value(value), "Nota fiscal disponível");
    }

    #[test]
    fn test_header_value_mixed_text() {
        assert_eq!(
            decode_header_value("Re: =?utf-8?Q?promo=C3=A7=C3=A3o?= de hoje"),
            "Re: promoção de hoje"
        );
    }

    #[test]
    fn test_header_value_malformed_word_kept() {
        assert_eq!(decode_header_value("=?utf-8?X?abc?= ok"), "=?utf-8?X?abc?= ok");
        assert_eq!(decode_header_value("price =? tbd"), "price =? tbd");
    }

    #[test]
    fn test_decode_rfc2047_strict() {
        assert_eq!(decode_rfc2047("=?utf-8?B?SMOpbGxv?=").unwrap(), "Héllo");
        assert!(decode_rfc2047("Hello").is_err());
        assert!(decode_rfc2047("=?utf-8?B?SMOpbGxv?= tail").is_err());
    }

    #[test]
    fn test_language_suffix() {
        assert_eq!(decode_header_value("=?utf-8*pt?Q?ol=C3=A1?="), "olá");
    }
}
