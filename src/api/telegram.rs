//! Bot relay endpoints: direct sends, anonymous confessions, broadcast.

use axum::extract::multipart::Multipart;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::response::ApiResponse;
use crate::api::{collect_multipart, AppState, FormData};
use crate::bot::broadcast::{self, BroadcastOutcome};
use crate::bot::relay::{self, RelayKind};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub chat_id: String,
    pub message: String,
}

fn parse_chat_id(raw: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("Invalid chat id: {raw}")))
}

fn parse_kind(form: &FormData) -> RelayKind {
    match form.get("type") {
        Some("photo") => RelayKind::Photo,
        Some("document") => RelayKind::Document,
        _ => RelayKind::Message,
    }
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageRequest>,
) -> AppResult<ApiResponse<Value>> {
    let chat_id = parse_chat_id(&body.chat_id)?;
    relay::send_message(state.transport.as_ref(), chat_id, &body.message).await?;
    Ok(ApiResponse::sent(json!({ "chatId": chat_id })))
}

pub async fn send_photo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<Value>> {
    let form = collect_multipart(multipart, "image").await?;
    let chat_id = parse_chat_id(form.require("chatId")?)?;
    let caption = form.require("message")?.to_owned();
    let url = form.get("photoUrl").map(str::to_owned);
    relay::send_photo(
        state.transport.as_ref(),
        state.media.as_ref(),
        chat_id,
        &caption,
        form.file,
        url,
    )
    .await?;
    Ok(ApiResponse::sent(json!({ "chatId": chat_id })))
}

pub async fn send_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<Value>> {
    let form = collect_multipart(multipart, "file").await?;
    let chat_id = parse_chat_id(form.require("chatId")?)?;
    let caption = form.require("message")?.to_owned();
    let url = form.get("fileUrl").map(str::to_owned);
    relay::send_document(
        state.transport.as_ref(),
        state.media.as_ref(),
        chat_id,
        &caption,
        form.file,
        url,
    )
    .await?;
    Ok(ApiResponse::sent(json!({ "chatId": chat_id })))
}

pub async fn send_confession(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<Value>> {
    let form = collect_multipart(multipart, "file").await?;
    let chat_id = parse_chat_id(form.require("chatId")?)?;
    let message = form.require("message")?.to_owned();
    let kind = parse_kind(&form);
    let url = form.get("fileUrl").map(str::to_owned);
    relay::send_confession(
        state.transport.as_ref(),
        state.media.as_ref(),
        &state.settings.client_base_url,
        chat_id,
        &message,
        kind,
        form.file,
        url,
    )
    .await?;
    Ok(ApiResponse::sent(json!({ "chatId": chat_id })))
}

pub async fn broadcast(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<BroadcastOutcome>> {
    let form = collect_multipart(multipart, "file").await?;
    let message = form.require("message")?.to_owned();
    let kind = parse_kind(&form);
    let url = form.get("fileUrl").map(str::to_owned);
    let limit = match form.get("limit") {
        Some(raw) => Some(
            raw.parse()
                .map_err(|_| AppError::Validation(format!("Invalid limit: {raw}")))?,
        ),
        None => None,
    };
    let outcome = broadcast::broadcast(
        state.transport.as_ref(),
        state.media.as_ref(),
        &state.db,
        &message,
        kind,
        form.file,
        url,
        limit,
    )
    .await?;
    Ok(ApiResponse::sent(outcome))
}
