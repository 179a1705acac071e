//! Argument encoding for commands.

use crate::{Error, Result};

/// Writes an astring: a bare atom when every byte is atom-safe, otherwise a
/// quoted string with `"` and `\` escaped.
///
/// CR, LF and NUL cannot appear in a quoted string; such arguments are
/// rejected instead of being sent as literals.
pub fn write_astring(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    if s.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0)) {
        return Err(Error::Protocol(format!(
            "argument {s:?} contains CR, LF or NUL"
        )));
    }

    if !s.is_empty() && !s.bytes().any(needs_quoting) {
        buf.extend_from_slice(s.as_bytes());
        return Ok(());
    }

    buf.push(b'"');
    for b in s.bytes() {
        if b == b'"' || b == b'\\' {
            buf.push(b'\\');
        }
        buf.push(b);
    }
    buf.push(b'"');
    Ok(())
}

/// Returns true if the byte forces a quoted string.
const fn needs_quoting(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b']'
    ) || b < 0x20
        || b >= 0x7F
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode(s: &str) -> String {
        let mut buf = Vec::new();
        write_astring(&mut buf, s).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_names_stay_atoms() {
        assert_eq!(encode("Faturas"), "Faturas");
        assert_eq!(encode("INBOX"), "INBOX");
        assert_eq!(encode("user@example.com"), "user@example.com");
    }

    #[test]
    fn names_with_specials_are_quoted() {
        assert_eq!(encode("Notas Fiscais"), "\"Notas Fiscais\"");
        assert_eq!(encode("[Gmail]/All Mail"), "\"[Gmail]/All Mail\"");
        assert_eq!(encode(""), "\"\"");
        assert_eq!(encode("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(encode("back\\slash"), "\"back\\\\slash\"");
    }

    #[test]
    fn line_breaks_are_rejected() {
        let mut buf = Vec::new();
        assert!(write_astring(&mut buf, "evil\r\nA1 LOGOUT").is_err());
        assert!(buf.is_empty());
    }
}
