//! Run orchestration: connect, list, classify and move, purge, dedupe,
//! close.
//!
//! [`organize`] and [`dedupe`] are the two entry points. Each opens its own
//! session, owns it for the whole run, and reports through a
//! [`RunObserver`]. Each ends with exactly one call to either
//! [`RunObserver::complete`] or [`RunObserver::error`].

use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::config::EngineConfig;
use crate::dedup;
use crate::error::{Error, Result};
use crate::listing::list_messages;
use crate::mover::move_message;
use crate::observer::{Reporter, RunObserver};
use crate::outcome::RunOutcome;
use crate::session::MailSession;
use crate::store::{Connector, Credentials, MailStore};

/// Processed messages between running-total log lines.
const SUMMARY_EVERY: usize = 10;

/// Where an organize run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started.
    Idle,
    /// Opening the session.
    Connecting,
    /// Fetching inbox messages.
    Listing,
    /// Classifying and moving.
    Processing,
    /// Expunging the inbox.
    Purging,
    /// Removing duplicates.
    Deduplicating,
    /// Logging out.
    Closing,
    /// Finished.
    Done,
    /// Ended by a fatal error.
    Error,
}

/// What the processing loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Send a keepalive before processing message `index`.
    Keepalive(usize),
    /// Classify and move message `index`.
    Process(usize),
    /// Every message was attempted.
    Finished,
}

/// Position in the processing loop.
///
/// A keepalive point is visited once. Reconnecting after a failed keepalive
/// leaves the index where it was, so no message is skipped or processed
/// twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingCursor {
    next: usize,
    total: usize,
    keepalive_done_at: Option<usize>,
}

impl ProcessingCursor {
    /// Cursor over `total` messages.
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self {
            next: 0,
            total,
            keepalive_done_at: None,
        }
    }

    /// The next step.
    #[must_use]
    pub fn step(&self, config: &EngineConfig) -> Step {
        if self.next >= self.total {
            Step::Finished
        } else if config.keepalive_due(self.next) && self.keepalive_done_at != Some(self.next) {
            Step::Keepalive(self.next)
        } else {
            Step::Process(self.next)
        }
    }

    /// The keepalive at the current index succeeded, or the session was
    /// replaced.
    pub const fn session_ok(&mut self) {
        self.keepalive_done_at = Some(self.next);
    }

    /// The current message was attempted.
    pub const fn advance(&mut self) {
        self.next += 1;
    }
}

/// One organize run.
struct OrganizeRun<'a, 'r, C: Connector> {
    connector: &'a C,
    credentials: &'a Credentials,
    config: &'a EngineConfig,
    reporter: Reporter<'r>,
    state: RunState,
}

impl<'a, 'r, C: Connector> OrganizeRun<'a, 'r, C> {
    fn new(
        connector: &'a C,
        credentials: &'a Credentials,
        config: &'a EngineConfig,
        observer: &'r dyn RunObserver,
    ) -> Self {
        Self {
            connector,
            credentials,
            config,
            reporter: Reporter::new(observer),
            state: RunState::Idle,
        }
    }

    fn enter(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }

    /// Runs to completion and emits the terminal event.
    async fn run(mut self) -> (RunState, Result<RunOutcome>) {
        let result = self.execute().await;
        match &result {
            Ok(outcome) => {
                self.enter(RunState::Done);
                self.reporter.progress(1.0, "Done");
                self.reporter.complete(outcome);
            }
            Err(e) => {
                self.enter(RunState::Error);
                warn!(?e, "organize run failed");
                self.reporter.log(&format!("❌ {e}"));
                self.reporter.error(&e.user_message());
            }
        }
        (self.state, result)
    }

    async fn execute(&mut self) -> Result<RunOutcome> {
        self.enter(RunState::Connecting);
        self.reporter.progress(0.05, "Connecting");
        self.reporter.log(&format!(
            "🔌 Connecting to {} as {}",
            self.connector.server_name(),
            self.credentials.user()
        ));
        let mut session = MailSession::connect(self.connector, self.credentials).await?;
        self.reporter.log("✅ Connected");

        self.enter(RunState::Listing);
        let records = match list_messages(&mut session, self.config, &self.reporter.scope(0.1, 0.3)).await {
            Ok(records) => records,
            Err(e) => {
                session.disconnect().await;
                return Err(e);
            }
        };

        let mut outcome = RunOutcome::default();
        if records.is_empty() {
            self.reporter.log("📭 No messages to organize");
            self.close(session).await;
            return Ok(outcome);
        }

        self.enter(RunState::Processing);
        let processing = self.reporter.scope(0.3, 0.8);
        let total = records.len();
        let mut cursor = ProcessingCursor::new(total);
        loop {
            match cursor.step(self.config) {
                Step::Finished => break,
                Step::Keepalive(_) => {
                    if let Err(e) = session.keepalive().await {
                        warn!(?e, "keepalive failed, reconnecting");
                        self.reporter.log("🔄 Connection lost, reconnecting...");
                        if let Err(e) = session.reconnect().await {
                            session.disconnect().await;
                            return Err(e);
                        }
                        self.reporter.log("✅ Reconnected");
                    }
                    cursor.session_ok();
                }
                Step::Process(i) => {
                    let record = &records[i];
                    let category = classify(&record.subject, &record.body);
                    outcome.record(category);
                    if move_message(session.store(), record.id, category, &processing).await {
                        outcome.moved += 1;
                    } else {
                        outcome.errors += 1;
                    }

                    let done = i + 1;
                    processing.log(&format!(
                        "({done}/{total}) {} → {}",
                        record.short_subject(),
                        category.label()
                    ));
                    processing.step(done, total, "Organizing");
                    if done % SUMMARY_EVERY == 0 {
                        processing.log(&format!(
                            "📊 {done}/{total} processed, {} moved",
                            outcome.moved
                        ));
                    }
                    cursor.advance();
                }
            }
        }

        self.enter(RunState::Purging);
        if self.config.purge_inbox {
            self.reporter.progress(0.8, "Purging inbox");
            match session.store().expunge().await {
                Ok(()) => self.reporter.log("🧹 Inbox purged"),
                Err(e) => {
                    let e = Error::Purge(e.to_string());
                    warn!(?e, "purge failed");
                    self.reporter.log(&format!("⚠️ {e}"));
                }
            }
        }

        self.enter(RunState::Deduplicating);
        self.reporter.progress(0.85, "Removing duplicates");
        self.reporter.log("🔍 Looking for duplicates");
        outcome.duplicates =
            dedup::deduplicate(&mut session, self.config, &self.reporter.scope(0.85, 1.0)).await;

        self.close(session).await;
        self.summarize(&outcome);
        Ok(outcome)
    }

    async fn close(&mut self, session: MailSession<'_, C>) {
        self.enter(RunState::Closing);
        session.disconnect().await;
        self.reporter.log("👋 Connection closed");
    }

    fn summarize(&self, outcome: &RunOutcome) {
        info!(
            processed = outcome.processed,
            moved = outcome.moved,
            errors = outcome.errors,
            duplicates = outcome.duplicates,
            "organize run finished"
        );
        self.reporter
            .log(&format!("✅ {} messages organized", outcome.total()));
        if outcome.errors > 0 {
            self.reporter
                .log(&format!("⚠️ {} messages with errors", outcome.errors));
        }
        for line in outcome.report_lines() {
            self.reporter.log(&line);
        }
        if outcome.duplicates > 0 {
            self.reporter
                .log(&format!("🗑️ {} duplicates removed", outcome.duplicates));
        }
    }
}

/// Organizes the newest inbox messages into category folders, then removes
/// inbox duplicates.
///
/// The outcome or error is also delivered to `observer`.
///
/// # Errors
///
/// Fails if the session cannot be established, the inbox cannot be listed,
/// or a dropped connection cannot be replaced.
pub async fn organize<C: Connector>(
    connector: &C,
    credentials: &Credentials,
    config: &EngineConfig,
    observer: &dyn RunObserver,
) -> Result<RunOutcome> {
    info!(server = connector.server_name(), limit = config.limit, "organize run started");
    OrganizeRun::new(connector, credentials, config, observer)
        .run()
        .await
        .1
}

/// Removes inbox messages that already sit in an organized folder.
///
/// Completes with a [`RunOutcome`] holding only the duplicate count.
///
/// # Errors
///
/// Fails only if the session cannot be established.
pub async fn dedupe<C: Connector>(
    connector: &C,
    credentials: &Credentials,
    config: &EngineConfig,
    observer: &dyn RunObserver,
) -> Result<RunOutcome> {
    info!(server = connector.server_name(), "dedupe run started");
    let reporter = Reporter::new(observer);
    reporter.log(&format!(
        "🔌 Connecting to {} as {}",
        connector.server_name(),
        credentials.user()
    ));
    let mut session = match MailSession::connect(connector, credentials).await {
        Ok(session) => session,
        Err(e) => {
            warn!(?e, "dedupe run failed");
            reporter.log(&format!("❌ {e}"));
            reporter.error(&e.user_message());
            return Err(e);
        }
    };

    let removed = dedup::deduplicate(&mut session, config, &reporter).await;
    session.disconnect().await;
    reporter.log("👋 Connection closed");

    let outcome = RunOutcome::duplicates_only(removed);
    info!(removed, "dedupe run finished");
    reporter.progress(1.0, "Done");
    reporter.complete(&outcome);
    Ok(outcome)
}
