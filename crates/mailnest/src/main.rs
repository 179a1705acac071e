//! `mailnest` - organizes an IMAP inbox into category folders.
//!
//! ```text
//! MAILNEST_PASSWORD=... mailnest --user me@gmail.com organize --limit 500
//! MAILNEST_PASSWORD=... mailnest --user me@gmail.com dedupe
//! MAILNEST_PASSWORD=... mailnest --user me@gmail.com watch --every 3h
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod console;
mod schedule;
mod settings;

use anyhow::Result;
use clap::Parser;
use mailnest_core::{ImapConnector, dedupe, organize};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use console::ConsoleObserver;
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailnest=info,mailnest_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let organize_args = match &cli.command {
        Command::Organize(args) | Command::Watch { organize: args, .. } => Some(args),
        Command::Dedupe => None,
    };

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply(&cli, organize_args);
    let credentials = settings.credentials(&cli.password_env)?;
    let config = settings.engine;
    let connector = ImapConnector::new(config.server.imap_config());
    let observer = ConsoleObserver::new(cli.json);

    info!(server = %config.server.host, user = credentials.user(), "starting");
    match cli.command {
        Command::Organize(_) => {
            organize(&connector, &credentials, &config, &observer).await?;
        }
        Command::Dedupe => {
            dedupe(&connector, &credentials, &config, &observer).await?;
        }
        Command::Watch { every, .. } => {
            schedule::watch(every, schedule::ctrl_c_signal(), || {
                organize(&connector, &credentials, &config, &observer)
            })
            .await;
        }
    }
    Ok(())
}
