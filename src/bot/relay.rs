//! Relays messages, photos, documents and confessions to a bound chat.
//!
//! Uploaded media lives in object storage only for the duration of the
//! send. Cleanup runs whether the send succeeded or not.

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::bot::transport::{BotTransport, Formatting};
use crate::error::{AppError, AppResult};
use crate::storage::{MediaStore, UploadedMedia};
use crate::utils::{encode_uri_component, escape_markdown};

pub const RELAY_MEDIA_FOLDER: &str = "konfess-media";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayKind {
    #[default]
    Message,
    Photo,
    Document,
}

/// Raw bytes of a multipart file field.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
}

async fn cleanup_upload(media: &dyn MediaStore, uploaded: Option<&UploadedMedia>) {
    if let Some(uploaded) = uploaded {
        if let Err(e) = media.delete(&uploaded.id).await {
            warn!(id = %uploaded.id, "failed to delete relayed media: {e}");
        }
    }
}

async fn resolve_media_url(
    media: &dyn MediaStore,
    file: Option<FileUpload>,
    url: Option<String>,
) -> AppResult<(String, Option<UploadedMedia>)> {
    if let Some(file) = file {
        let uploaded = media.upload(file.bytes, RELAY_MEDIA_FOLDER).await?;
        let url = uploaded.url.clone();
        return Ok((url, Some(uploaded)));
    }
    match url {
        Some(url) if !url.is_empty() => Ok((url, None)),
        _ => Err(AppError::NotFound("Invalid file URL to send".to_owned())),
    }
}

/// Sends a plain text message to a chat.
pub async fn send_message(
    transport: &dyn BotTransport,
    chat_id: i64,
    text: &str,
) -> AppResult<()> {
    transport
        .send_message(chat_id, text, Formatting::Plain)
        .await
        .map_err(AppError::from)
}

/// Sends a photo from an upload or a remote URL, then drops the upload.
pub async fn send_photo(
    transport: &dyn BotTransport,
    media: &dyn MediaStore,
    chat_id: i64,
    caption: &str,
    file: Option<FileUpload>,
    url: Option<String>,
) -> AppResult<()> {
    let (url, uploaded) = resolve_media_url(media, file, url).await?;
    let result = transport
        .send_photo(chat_id, &url, caption, Formatting::Plain)
        .await;
    cleanup_upload(media, uploaded.as_ref()).await;
    result.map_err(AppError::from)
}

/// Sends a document from an upload or a remote URL, then drops the upload.
pub async fn send_document(
    transport: &dyn BotTransport,
    media: &dyn MediaStore,
    chat_id: i64,
    caption: &str,
    file: Option<FileUpload>,
    url: Option<String>,
) -> AppResult<()> {
    let (url, uploaded) = resolve_media_url(media, file, url).await?;
    let result = transport
        .send_document(chat_id, &url, caption, Formatting::Plain)
        .await;
    cleanup_upload(media, uploaded.as_ref()).await;
    result.map_err(AppError::from)
}

/// Formats a confession as a MarkdownV2 link to the web preview page.
fn confession_text(client_base_url: &str, message: &str) -> String {
    let preview = format!(
        "{client_base_url}/preview?message={}&time={}",
        encode_uri_component(message),
        Utc::now().timestamp_millis(),
    );
    format!("[{}]({preview})", escape_markdown(message))
}

/// Delivers an anonymous confession, optionally attached to media.
pub async fn send_confession(
    transport: &dyn BotTransport,
    media: &dyn MediaStore,
    client_base_url: &str,
    chat_id: i64,
    message: &str,
    kind: RelayKind,
    file: Option<FileUpload>,
    url: Option<String>,
) -> AppResult<()> {
    let text = confession_text(client_base_url, message);

    if kind == RelayKind::Message {
        return transport
            .send_message(chat_id, &text, Formatting::MarkdownV2)
            .await
            .map_err(AppError::from);
    }

    // A missing URL is handed to the transport and fails there.
    let (media_url, uploaded) = match file {
        Some(file) => {
            let uploaded = media.upload(file.bytes, RELAY_MEDIA_FOLDER).await?;
            (uploaded.url.clone(), Some(uploaded))
        }
        None => (url.unwrap_or_default(), None),
    };
    let result = match kind {
        RelayKind::Photo => {
            transport
                .send_photo(chat_id, &media_url, &text, Formatting::MarkdownV2)
                .await
        }
        RelayKind::Document => {
            transport
                .send_document(chat_id, &media_url, &text, Formatting::MarkdownV2)
                .await
        }
        RelayKind::Message => unreachable!(),
    };
    cleanup_upload(media, uploaded.as_ref()).await;
    result.map_err(AppError::from)
}
