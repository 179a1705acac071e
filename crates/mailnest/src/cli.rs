//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

/// Sorts an IMAP inbox into category folders and removes duplicates.
#[derive(Parser, Debug)]
#[command(name = "mailnest", version, about, long_about = None)]
pub struct Cli {
    /// Settings file (default: `<config dir>/mailnest/config.json`)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Mailbox login
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Environment variable holding the password or app password
    #[arg(long, global = true, default_value = "MAILNEST_PASSWORD")]
    pub password_env: String,

    /// IMAP server host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// IMAP server port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Print the run outcome as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Organize the newest inbox messages, then remove duplicates
    Organize(OrganizeArgs),

    /// Remove inbox messages already filed in an organized folder
    Dedupe,

    /// Organize on a schedule until interrupted
    Watch {
        /// Time between run starts, e.g. 30m, 3h, 45s or 90 (seconds)
        #[arg(long, default_value = "3h", value_parser = parse_interval)]
        every: Duration,

        #[command(flatten)]
        organize: OrganizeArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct OrganizeArgs {
    /// Most recent messages to organize
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Leave moved messages flagged in the inbox instead of expunging
    #[arg(long)]
    pub no_purge: bool,
}

/// Parses `30m`, `3h`, `45s` or a bare number of seconds.
pub fn parse_interval(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    let (digits, unit) = match text.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&text[..i], Some(c.to_ascii_lowercase())),
        _ => (text, None),
    };
    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid interval {text:?}: expected e.g. 30m, 3h, 45s"))?;
    let seconds = match unit {
        None | Some('s') => Some(value),
        Some('m') => value.checked_mul(60),
        Some('h') => value.checked_mul(3600),
        Some(other) => return Err(format!("unknown interval unit {other:?}: use s, m or h")),
    };
    match seconds {
        Some(0) => Err("interval must be greater than zero".to_string()),
        Some(seconds) => Ok(Duration::from_secs(seconds)),
        None => Err(format!("interval {text:?} is too large")),
    }
}
