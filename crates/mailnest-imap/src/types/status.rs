//! Completion status and response codes.

/// Status word of a tagged or untagged status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command completed successfully.
    Ok,
    /// Command failed.
    No,
    /// Command was malformed or not allowed.
    Bad,
    /// Greeting of a pre-authenticated connection.
    PreAuth,
    /// Server is closing the connection.
    Bye,
}

impl Status {
    /// Returns true for `OK` and `PREAUTH`.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::PreAuth)
    }
}

/// Bracketed response code, e.g. `[READ-ONLY]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// `ALERT`: text must be shown to the user.
    Alert,
    /// `READ-ONLY`
    ReadOnly,
    /// `READ-WRITE`
    ReadWrite,
    /// `TRYCREATE`: the target mailbox does not exist.
    TryCreate,
    /// `ALREADYEXISTS` (RFC 5530).
    AlreadyExists,
    /// `AUTHENTICATIONFAILED` (RFC 5530).
    AuthenticationFailed,
    /// Any other code, with its arguments.
    Other {
        /// Code name, upper-cased.
        name: String,
        /// Raw text between the code name and the closing bracket.
        args: String,
    },
}

impl ResponseCode {
    /// Builds a code from its name and raw arguments.
    #[must_use]
    pub fn from_parts(name: &str, args: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ALERT" => Self::Alert,
            "READ-ONLY" => Self::ReadOnly,
            "READ-WRITE" => Self::ReadWrite,
            "TRYCREATE" => Self::TryCreate,
            "ALREADYEXISTS" => Self::AlreadyExists,
            "AUTHENTICATIONFAILED" => Self::AuthenticationFailed,
            upper => Self::Other {
                name: upper.to_string(),
                args: args.to_string(),
            },
        }
    }
}

impl std::fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alert => f.write_str("[ALERT]"),
            Self::ReadOnly => f.write_str("[READ-ONLY]"),
            Self::ReadWrite => f.write_str("[READ-WRITE]"),
            Self::TryCreate => f.write_str("[TRYCREATE]"),
            Self::AlreadyExists => f.write_str("[ALREADYEXISTS]"),
            Self::AuthenticationFailed => f.write_str("[AUTHENTICATIONFAILED]"),
            Self::Other { name, args } if args.is_empty() => write!(f, "[{name}]"),
            Self::Other { name, args } => write!(f, "[{name} {args}]"),
        }
    }
}
