//! IMAP commands and their wire form.

#![allow(clippy::missing_errors_doc)]

mod serialize;
mod tag_generator;

pub use serialize::write_astring;
pub use tag_generator::TagGenerator;

use crate::Result;
use crate::types::{Flag, SeqNum};

/// A data item requested by FETCH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// `FLAGS`
    Flags,
    /// `RFC822.SIZE`
    Rfc822Size,
    /// `BODY[section]`, or `BODY.PEEK[section]` when `peek` is set so the
    /// server leaves `\Seen` alone.
    Body {
        /// Section spec; `None` means the whole message.
        section: Option<String>,
        /// Use the `.PEEK` form.
        peek: bool,
    },
}

impl FetchAttribute {
    /// The whole raw message, without setting `\Seen`.
    #[must_use]
    pub const fn full_message() -> Self {
        Self::Body {
            section: None,
            peek: true,
        }
    }

    /// Only the named header fields, without setting `\Seen`.
    #[must_use]
    pub fn header_fields(fields: &[&str]) -> Self {
        Self::Body {
            section: Some(format!("HEADER.FIELDS ({})", fields.join(" "))),
            peek: true,
        }
    }

    fn write(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Flags => buf.extend_from_slice(b"FLAGS"),
            Self::Rfc822Size => buf.extend_from_slice(b"RFC822.SIZE"),
            Self::Body { section, peek } => {
                let open: &[u8] = if *peek { b"BODY.PEEK[" } else { b"BODY[" };
                buf.extend_from_slice(open);
                if let Some(s) = section {
                    buf.extend_from_slice(s.as_bytes());
                }
                buf.push(b']');
            }
        }
    }
}

/// The commands this client issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `NOOP`
    Noop,
    /// `LOGOUT`
    Logout,
    /// `LOGIN user password`
    Login {
        /// User name.
        username: &'a str,
        /// Password.
        password: &'a str,
    },
    /// `LIST reference pattern`
    List {
        /// Reference name, usually empty.
        reference: &'a str,
        /// Mailbox pattern.
        pattern: &'a str,
    },
    /// `CREATE mailbox`
    Create(&'a str),
    /// `SELECT mailbox`
    Select(&'a str),
    /// `EXAMINE mailbox` (read-only select)
    Examine(&'a str),
    /// `SEARCH ALL`
    SearchAll,
    /// `FETCH seq items`
    Fetch {
        /// Message to fetch.
        seq: SeqNum,
        /// Requested data items.
        items: &'a [FetchAttribute],
    },
    /// `COPY seq mailbox`
    Copy {
        /// Message to copy.
        seq: SeqNum,
        /// Destination mailbox.
        mailbox: &'a str,
    },
    /// `STORE seq +FLAGS[.SILENT] (flags)`
    AddFlags {
        /// Message to change.
        seq: SeqNum,
        /// Flags to add.
        flags: &'a [Flag],
        /// Suppress the untagged FETCH echo.
        silent: bool,
    },
    /// `EXPUNGE`
    Expunge,
}

impl Command<'_> {
    /// Returns the command keyword, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "NOOP",
            Self::Logout => "LOGOUT",
            Self::Login { .. } => "LOGIN",
            Self::List { .. } => "LIST",
            Self::Create(_) => "CREATE",
            Self::Select(_) => "SELECT",
            Self::Examine(_) => "EXAMINE",
            Self::SearchAll => "SEARCH",
            Self::Fetch { .. } => "FETCH",
            Self::Copy { .. } => "COPY",
            Self::AddFlags { .. } => "STORE",
            Self::Expunge => "EXPUNGE",
        }
    }

    /// Serializes the command with the given tag, CRLF included.
    pub fn serialize(&self, tag: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.name().as_bytes());

        match self {
            Self::Noop | Self::Logout | Self::Expunge => {}
            Self::Login { username, password } => {
                buf.push(b' ');
                write_astring(&mut buf, username)?;
                buf.push(b' ');
                write_astring(&mut buf, password)?;
            }
            Self::List { reference, pattern } => {
                buf.push(b' ');
                write_astring(&mut buf, reference)?;
                buf.push(b' ');
                // Wildcards are meaningful here, so only quote on whitespace.
                if pattern.is_empty() || pattern.contains(' ') {
                    write_astring(&mut buf, pattern)?;
                } else {
                    buf.extend_from_slice(pattern.as_bytes());
                }
            }
            Self::Create(mailbox) | Self::Select(mailbox) | Self::Examine(mailbox) => {
                buf.push(b' ');
                write_astring(&mut buf, mailbox)?;
            }
            Self::SearchAll => buf.extend_from_slice(b" ALL"),
            Self::Fetch { seq, items } => {
                buf.extend_from_slice(format!(" {seq} ").as_bytes());
                if let [single] = items {
                    single.write(&mut buf);
                } else {
                    buf.push(b'(');
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            buf.push(b' ');
                        }
                        item.write(&mut buf);
                    }
                    buf.push(b')');
                }
            }
            Self::Copy { seq, mailbox } => {
                buf.extend_from_slice(format!(" {seq} ").as_bytes());
                write_astring(&mut buf, mailbox)?;
            }
            Self::AddFlags { seq, flags, silent } => {
                buf.extend_from_slice(format!(" {seq} +FLAGS").as_bytes());
                if *silent {
                    buf.extend_from_slice(b".SILENT");
                }
                buf.extend_from_slice(b" (");
                for (i, flag) in flags.iter().enumerate() {
                    if i > 0 {
                        buf.push(b' ');
                    }
                    buf.extend_from_slice(flag.as_str().as_bytes());
                }
                buf.push(b')');
            }
        }

        buf.extend_from_slice(b"\r\n");
        Ok(buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wire(cmd: &Command<'_>) -> String {
        String::from_utf8(cmd.serialize("A0007").unwrap()).unwrap()
    }

    fn seq(n: u32) -> SeqNum {
        SeqNum::new(n).unwrap()
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(wire(&Command::Noop), "A0007 NOOP\r\n");
        assert_eq!(wire(&Command::Logout), "A0007 LOGOUT\r\n");
        assert_eq!(wire(&Command::Expunge), "A0007 EXPUNGE\r\n");
        assert_eq!(wire(&Command::SearchAll), "A0007 SEARCH ALL\r\n");
    }

    #[test]
    fn test_login_quotes_password_with_space() {
        let cmd = Command::Login {
            username: "someone@gmail.com",
            password: "abcd efgh ijkl mnop",
        };
        assert_eq!(
            wire(&cmd),
            "A0007 LOGIN someone@gmail.com \"abcd efgh ijkl mnop\"\r\n"
        );
    }

    #[test]
    fn test_list_keeps_wildcard() {
        let cmd = Command::List {
            reference: "",
            pattern: "*",
        };
        assert_eq!(wire(&cmd), "A0007 LIST \"\" *\r\n");
    }

    #[test]
    fn test_mailbox_commands() {
        assert_eq!(wire(&Command::Create("Faturas")), "A0007 CREATE Faturas\r\n");
        assert_eq!(wire(&Command::Select("INBOX")), "A0007 SELECT INBOX\r\n");
        assert_eq!(
            wire(&Command::Examine("Notas Fiscais")),
            "A0007 EXAMINE \"Notas Fiscais\"\r\n"
        );
    }

    #[test]
    fn test_fetch_full_message() {
        let items = [FetchAttribute::full_message()];
        let cmd = Command::Fetch {
            seq: seq(12),
            items: &items,
        };
        assert_eq!(wire(&cmd), "A0007 FETCH 12 BODY.PEEK[]\r\n");
    }

    #[test]
    fn test_fetch_header_fields_with_flags() {
        let items = [
            FetchAttribute::Flags,
            FetchAttribute::header_fields(&["MESSAGE-ID"]),
        ];
        let cmd = Command::Fetch {
            seq: seq(3),
            items: &items,
        };
        assert_eq!(
            wire(&cmd),
            "A0007 FETCH 3 (FLAGS BODY.PEEK[HEADER.FIELDS (MESSAGE-ID)])\r\n"
        );
    }

    #[test]
    fn test_copy_and_store() {
        let cmd = Command::Copy {
            seq: seq(5),
            mailbox: "Trabalho",
        };
        assert_eq!(wire(&cmd), "A0007 COPY 5 Trabalho\r\n");

        let flags = [Flag::Deleted];
        let cmd = Command::AddFlags {
            seq: seq(5),
            flags: &flags,
            silent: false,
        };
        assert_eq!(wire(&cmd), "A0007 STORE 5 +FLAGS (\\Deleted)\r\n");

        let cmd = Command::AddFlags {
            seq: seq(5),
            flags: &flags,
            silent: true,
        };
        assert_eq!(wire(&cmd), "A0007 STORE 5 +FLAGS.SILENT (\\Deleted)\r\n");
    }

    #[test]
    fn test_injection_rejected() {
        assert!(Command::Create("x\r\nA1 LOGOUT").serialize("A0001").is_err());
    }
}
