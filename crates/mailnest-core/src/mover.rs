//! Moves one message into its category folder.

use mailnest_imap::SeqNum;
use tracing::{debug, warn};

use crate::classify::Category;
use crate::error::{Error, truncate_for_log};
use crate::observer::Reporter;
use crate::store::MailStore;

/// Copies a message of the open folder into the folder named after
/// `category`, then flags the original `\Deleted`.
///
/// The folder is created first; a failed create is ignored since servers
/// report an existing folder in different ways. Returns false, after
/// logging, if the copy or the flag fails. Removal waits for the next
/// expunge.
pub async fn move_message<S: MailStore>(
    store: &mut S,
    id: SeqNum,
    category: Category,
    reporter: &Reporter<'_>,
) -> bool {
    match try_move(store, id, category).await {
        Ok(()) => true,
        Err(e) => {
            warn!(%id, %category, ?e, "move failed");
            reporter.log(&format!(
                "❌ Could not move message {id}: {}",
                truncate_for_log(&e.to_string())
            ));
            false
        }
    }
}

async fn try_move<S: MailStore>(
    store: &mut S,
    id: SeqNum,
    category: Category,
) -> Result<(), Error> {
    let folder = category.label();
    if let Err(e) = store.create_folder(folder).await {
        debug!(folder, ?e, "create folder failed, assuming it exists");
    }
    let failed = |e: mailnest_imap::Error| Error::Message {
        id: id.to_string(),
        reason: e.to_string(),
    };
    store.copy(id, folder).await.map_err(failed)?;
    store.flag_deleted(id).await.map_err(failed)?;
    Ok(())
}
