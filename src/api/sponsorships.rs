//! Sponsorship administration endpoints. Images are stored permanently.

use axum::extract::multipart::Multipart;
use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::api::response::ApiResponse;
use crate::api::{collect_multipart, AppState};
use crate::db::models::Sponsorship;
use crate::db::sponsorships::{self, NewSponsorship, SponsorshipUpdate};
use crate::error::{AppError, AppResult};

const SPONSORSHIP_IMAGE_FOLDER: &str = "konfess-sponsorships";

pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<Sponsorship>> {
    let mut form = collect_multipart(multipart, "image").await?;

    let image = match form.file.take() {
        Some(file) => {
            state
                .media
                .upload(file.bytes, SPONSORSHIP_IMAGE_FOLDER)
                .await?
                .url
        }
        None => form.get("image").unwrap_or_default().to_owned(),
    };

    let sponsorship = sponsorships::create(
        state.db.pool(),
        NewSponsorship {
            kind: form.require("type")?.to_owned(),
            image,
            title: form.get("title").map(str::to_owned),
            description: form.get("description").map(str::to_owned),
        },
    )
    .await?;
    Ok(ApiResponse::created(sponsorship))
}

pub async fn find_all(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Sponsorship>>> {
    let data = sponsorships::find_all(state.db.pool()).await?;
    Ok(ApiResponse::fetched(data))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Sponsorship>> {
    let sponsorship = sponsorships::find_by_id(state.db.pool(), &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Sponsor not found".to_owned()))?;
    Ok(ApiResponse::fetched(sponsorship))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<Sponsorship>> {
    let mut form = collect_multipart(multipart, "image").await?;

    let image = match form.file.take() {
        Some(file) => Some(
            state
                .media
                .upload(file.bytes, SPONSORSHIP_IMAGE_FOLDER)
                .await?
                .url,
        ),
        None => form.get("image").map(str::to_owned),
    };

    let update = SponsorshipUpdate {
        kind: form.get("type").map(str::to_owned),
        image,
        title: form.get("title").map(str::to_owned),
        description: form.get("description").map(str::to_owned),
    };
    let sponsorship = sponsorships::update(state.db.pool(), &id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("Sponsor not found".to_owned()))?;
    Ok(ApiResponse::updated(sponsorship))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    let deleted = sponsorships::delete(state.db.pool(), &id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Sponsor not found".to_owned()));
    }
    Ok(ApiResponse::deleted(json!({ "id": id })))
}
