//! Broadcast fan-out to every bound chat.

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::bot::relay::{FileUpload, RelayKind, RELAY_MEDIA_FOLDER};
use crate::bot::transport::{BotTransport, Formatting};
use crate::db::{users, Database};
use crate::error::AppResult;
use crate::storage::MediaStore;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Sends one payload to every user with a bound chat. Individual delivery
/// failures are counted, never raised.
pub async fn broadcast(
    transport: &dyn BotTransport,
    media: &dyn MediaStore,
    db: &Database,
    text: &str,
    kind: RelayKind,
    file: Option<FileUpload>,
    url: Option<String>,
    limit: Option<i64>,
) -> AppResult<BroadcastOutcome> {
    let recipients = users::find_all_with_chat_id(db.pool(), limit).await?;
    let total = recipients.len();

    let (media_url, uploaded) = match (kind, file, url) {
        (RelayKind::Message, _, _) => (None, None),
        (_, Some(file), _) => {
            let uploaded = media.upload(file.bytes, RELAY_MEDIA_FOLDER).await?;
            (Some(uploaded.url.clone()), Some(uploaded))
        }
        (_, None, url) => (url, None),
    };

    let sends = recipients.iter().filter_map(|user| {
        let chat_id = user.chat_id?;
        let media_url = media_url.as_deref();
        Some(async move {
            match kind {
                // A missing URL fails per recipient and is counted, not raised.
                RelayKind::Photo => {
                    transport
                        .send_photo(chat_id, media_url.unwrap_or(""), text, Formatting::Plain)
                        .await
                }
                RelayKind::Document => {
                    transport
                        .send_document(chat_id, media_url.unwrap_or(""), text, Formatting::Plain)
                        .await
                }
                RelayKind::Message => {
                    transport
                        .send_message(chat_id, text, Formatting::Plain)
                        .await
                }
            }
        })
    });

    let results = join_all(sends).await;
    let sent = results.iter().filter(|r| r.is_ok()).count();
    let failed = results.len() - sent;

    if let Some(uploaded) = uploaded {
        if let Err(e) = media.delete(&uploaded.id).await {
            warn!(id = %uploaded.id, "failed to delete broadcast media: {e}");
        }
    }

    info!(total, sent, failed, "broadcast finished");
    Ok(BroadcastOutcome { total, sent, failed })
}
