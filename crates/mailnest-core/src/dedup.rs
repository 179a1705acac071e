//! Duplicate resolver: removes inbox messages already filed elsewhere.
//!
//! Matching is by `Message-ID` only. The scan runs in four phases with a
//! fixed share of the progress range each:
//!
//! | phase | range |
//! |---|---|
//! | list organized folders | 0.0 to 0.2 |
//! | index inbox identifiers | 0.2 to 0.5 |
//! | scan organized folders | 0.5 to 0.8 |
//! | flag and purge inbox copies | 0.8 to 1.0 |
//!
//! Messages without a `Message-ID` are never flagged or counted.

use std::collections::{HashMap, HashSet};

use mailnest_imap::SeqNum;
use tracing::{debug, info, warn};

use crate::INBOX;
use crate::config::EngineConfig;
use crate::error::{Error, truncate_for_log};
use crate::message::MessageIdentifier;
use crate::observer::Reporter;
use crate::outcome::{DedupReport, DedupStatus};
use crate::session::MailSession;
use crate::store::{Connector, MailStore};

/// Inbox header fetches between progress updates.
const MAP_PROGRESS_EVERY: usize = 20;

/// Removes inbox messages whose `Message-ID` also appears in an organized
/// folder; returns how many were flagged.
///
/// Never fails. Any scan that cannot finish returns 0, and the observer log
/// says why.
pub async fn deduplicate<C: Connector>(
    session: &mut MailSession<'_, C>,
    config: &EngineConfig,
    reporter: &Reporter<'_>,
) -> usize {
    find_and_remove(session, config, reporter).await.removed
}

/// [`deduplicate`] with the reason behind the count.
pub async fn find_and_remove<C: Connector>(
    session: &mut MailSession<'_, C>,
    config: &EngineConfig,
    reporter: &Reporter<'_>,
) -> DedupReport {
    reporter.progress(0.0, "Listing folders");
    let folders = match session.store().list_folders().await {
        Ok(folders) => folders,
        Err(e) => return abort(reporter, &format!("could not list folders: {e}")),
    };
    let candidates: Vec<String> = folders
        .into_iter()
        .filter(|folder| !config.is_reserved(folder))
        .collect();
    reporter.log(&format!("📁 {} organized folders to check", candidates.len()));
    reporter.progress(0.2, "Folders listed");

    let index = match index_inbox(session, config, &reporter.scope(0.2, 0.5)).await {
        Ok(index) => index,
        Err(reason) => return abort(reporter, &reason),
    };
    if index.is_empty() {
        reporter.progress(1.0, "No duplicates");
        return DedupReport::clean();
    }

    let duplicates = scan_folders(session, config, &candidates, &index, &reporter.scope(0.5, 0.8)).await;
    reporter.log(&format!("🔍 {} duplicates found", duplicates.len()));
    reporter.progress(0.8, "Folders scanned");
    if duplicates.is_empty() {
        reporter.progress(1.0, "No duplicates");
        return DedupReport::clean();
    }

    let report = remove(session, config, &index, &duplicates, &reporter.scope(0.8, 1.0)).await;
    reporter.progress(1.0, "Duplicates removed");
    report
}

fn abort(reporter: &Reporter<'_>, reason: &str) -> DedupReport {
    warn!(reason, "duplicate scan aborted");
    reporter.log(&format!("❌ Duplicate scan aborted: {}", truncate_for_log(reason)));
    DedupReport::aborted(reason)
}

/// Inbox sequence numbers by `Message-ID`.
type InboxIndex = HashMap<MessageIdentifier, Vec<SeqNum>>;

/// Indexes the newest `config.dedup_scan_cap` inbox messages. Every inbox
/// copy of an identifier is kept.
async fn index_inbox<C: Connector>(
    session: &mut MailSession<'_, C>,
    config: &EngineConfig,
    reporter: &Reporter<'_>,
) -> Result<InboxIndex, String> {
    session
        .select(INBOX)
        .await
        .map_err(|e| format!("could not open {INBOX}: {e}"))?;
    let all = session
        .store()
        .search_all()
        .await
        .map_err(|e| format!("could not search {INBOX}: {e}"))?;
    if all.is_empty() {
        reporter.log("📭 Inbox is empty");
        return Ok(HashMap::new());
    }

    let take = config.dedup_scan_cap.min(all.len());
    let wanted = &all[all.len() - take..];
    reporter.log(&format!("📬 Indexing {take} inbox messages"));

    let mut index = InboxIndex::with_capacity(take);
    let mut errors = 0_u32;
    for (i, &id) in wanted.iter().enumerate() {
        if config.keepalive_due(i)
            && let Err(e) = session.keepalive().await
        {
            debug!(?e, "keepalive during indexing failed");
        }
        match session.store().fetch_message_id(id).await {
            Ok(Some(message_id)) => index.entry(message_id).or_default().push(id),
            Ok(None) => {}
            Err(e) => {
                errors += 1;
                debug!(%id, ?e, "header fetch failed");
                if errors > config.max_dedup_errors {
                    return Err(format!("{errors} errors while indexing the inbox"));
                }
            }
        }
        if (i + 1) % MAP_PROGRESS_EVERY == 0 || i + 1 == take {
            reporter.step(i + 1, take, "Indexing inbox");
        }
    }
    Ok(index)
}

/// Identifiers from `index` found in any of `folders`. Unreadable folders
/// are logged and skipped.
async fn scan_folders<C: Connector>(
    session: &mut MailSession<'_, C>,
    config: &EngineConfig,
    folders: &[String],
    index: &InboxIndex,
    reporter: &Reporter<'_>,
) -> HashSet<MessageIdentifier> {
    let mut duplicates = HashSet::new();
    let mut failed_folders = 0_usize;
    for (n, folder) in folders.iter().enumerate() {
        if let Err(e) = scan_folder(session, config, folder, index, &mut duplicates).await {
            failed_folders += 1;
            warn!(?e, "folder skipped");
            reporter.log(&format!("⚠️ {}", truncate_for_log(&e.to_string())));
        }
        reporter.step(n + 1, folders.len(), &format!("Checked {folder}"));
    }
    if failed_folders > 0 {
        reporter.log(&format!("⚠️ {failed_folders} folders could not be checked"));
    }
    duplicates
}

async fn scan_folder<C: Connector>(
    session: &mut MailSession<'_, C>,
    config: &EngineConfig,
    folder: &str,
    index: &InboxIndex,
    duplicates: &mut HashSet<MessageIdentifier>,
) -> Result<(), Error> {
    let failed = |e: mailnest_imap::Error| Error::Folder {
        folder: folder.to_string(),
        reason: e.to_string(),
    };
    session.examine(folder).await.map_err(failed)?;
    let ids = session.store().search_all().await.map_err(failed)?;
    for (i, &id) in ids.iter().enumerate() {
        if config.keepalive_due(i)
            && let Err(e) = session.keepalive().await
        {
            debug!(?e, "keepalive during folder scan failed");
        }
        match session.store().fetch_message_id(id).await {
            Ok(Some(message_id)) if index.contains_key(&message_id) => {
                duplicates.insert(message_id);
            }
            Ok(_) => {}
            Err(e) => debug!(folder, %id, ?e, "header fetch failed"),
        }
    }
    Ok(())
}

/// Flags every inbox copy of every duplicate, then expunges.
async fn remove<C: Connector>(
    session: &mut MailSession<'_, C>,
    config: &EngineConfig,
    index: &InboxIndex,
    duplicates: &HashSet<MessageIdentifier>,
    reporter: &Reporter<'_>,
) -> DedupReport {
    if let Err(e) = session.select(INBOX).await {
        return abort(reporter, &format!("could not reopen {INBOX}: {e}"));
    }

    let mut targets: Vec<SeqNum> = duplicates
        .iter()
        .filter_map(|message_id| index.get(message_id))
        .flatten()
        .copied()
        .collect();
    targets.sort_unstable();

    let mut removed = 0;
    let mut errors = 0_u32;
    for (i, &id) in targets.iter().enumerate() {
        match session.store().flag_deleted(id).await {
            Ok(()) => removed += 1,
            Err(e) => {
                errors += 1;
                debug!(%id, ?e, "flag failed");
                if errors > config.max_dedup_errors {
                    reporter.log(&format!(
                        "⚠️ {errors} errors while flagging, stopping after {removed}"
                    ));
                    break;
                }
            }
        }
        reporter.step(i + 1, targets.len(), "Removing duplicates");
    }

    if let Err(e) = session.store().expunge().await {
        let e = Error::Purge(e.to_string());
        warn!(?e, "expunge after dedup failed");
        reporter.log(&format!("⚠️ {}", truncate_for_log(&e.to_string())));
    }
    info!(removed, "duplicates removed");
    reporter.log(&format!("🗑️ {removed} duplicates removed from the inbox"));
    DedupReport {
        removed,
        status: DedupStatus::Removed,
    }
}
