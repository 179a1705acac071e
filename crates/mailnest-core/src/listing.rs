//! Listing pipeline: fetch the most recent inbox messages.

use tracing::{debug, warn};

use crate::INBOX;
use crate::config::EngineConfig;
use crate::error::{Error, Result, truncate_for_log};
use crate::message::MessageRecord;
use crate::observer::Reporter;
use crate::session::MailSession;
use crate::store::{Connector, MailStore};

/// Attempted messages between progress log lines.
const LOG_EVERY: usize = 50;

/// Fetches up to `config.limit` of the newest inbox messages.
///
/// Per-message fetch failures are skipped. After
/// `config.max_consecutive_fetch_errors` failures in a row listing stops and
/// returns what it has. Progress counts attempted messages.
///
/// # Errors
///
/// [`Error::List`] if the inbox cannot be opened or searched.
pub async fn list_messages<C: Connector>(
    session: &mut MailSession<'_, C>,
    config: &EngineConfig,
    reporter: &Reporter<'_>,
) -> Result<Vec<MessageRecord>> {
    session
        .select(INBOX)
        .await
        .map_err(|e| Error::List(e.to_string()))?;
    let all = session
        .store()
        .search_all()
        .await
        .map_err(|e| Error::List(e.to_string()))?;

    let take = config.limit.min(all.len());
    let wanted = &all[all.len() - take..];
    reporter.log(&format!(
        "📬 {} messages in the inbox, fetching the latest {take}",
        all.len()
    ));

    let mut records = Vec::with_capacity(take);
    let mut consecutive_errors = 0_u32;
    for (i, &id) in wanted.iter().enumerate() {
        match session.store().fetch_message(id).await {
            Ok(raw) => {
                records.push(MessageRecord::from_raw(id, &raw));
                consecutive_errors = 0;
            }
            Err(e) => {
                consecutive_errors += 1;
                warn!(%id, ?e, "fetch failed");
                reporter.log(&format!(
                    "⚠️ Could not fetch message {id}: {}",
                    truncate_for_log(&e.to_string())
                ));
                if consecutive_errors >= config.max_consecutive_fetch_errors {
                    reporter.log(&format!(
                        "❌ {consecutive_errors} fetch errors in a row, stopping with {} messages",
                        records.len()
                    ));
                    break;
                }
            }
        }

        let attempted = i + 1;
        reporter.step(attempted, take, "Fetching messages");
        if attempted % LOG_EVERY == 0 {
            reporter.log(&format!("📥 Fetched {attempted}/{take}"));
        }
    }

    debug!(listed = records.len(), "listing finished");
    reporter.progress(1.0, "Messages fetched");
    Ok(records)
}
