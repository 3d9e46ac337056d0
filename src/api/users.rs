//! User administration endpoints.

use axum::extract::multipart::Multipart;
use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::api::response::ApiResponse;
use crate::api::{collect_multipart, AppState};
use crate::auth::password::hash_password;
use crate::auth::PROFILE_IMAGE_FOLDER;
use crate::db::models::{Role, User};
use crate::db::users::{self, NewUser, UserUpdate};
use crate::error::{AppError, AppResult};

fn parse_role(raw: &str) -> AppResult<Role> {
    match raw {
        "USER" => Ok(Role::User),
        "ADMIN" => Ok(Role::Admin),
        "SUPERADMIN" => Ok(Role::Superadmin),
        other => Err(AppError::Validation(format!("Invalid role: {other}"))),
    }
}

pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<User>> {
    let mut form = collect_multipart(multipart, "profileImage").await?;
    let file = form.file.take();
    let username = form.require("username")?.to_owned();

    if users::find_by_username(state.db.pool(), &username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "User with this username already exists".to_owned(),
        ));
    }

    let role = match form.get("role") {
        Some(raw) => parse_role(raw)?,
        None => Role::User,
    };
    let chat_id = match form.get("chatId") {
        Some(raw) => Some(
            raw.parse()
                .map_err(|_| AppError::Validation(format!("Invalid chat id: {raw}")))?,
        ),
        None => None,
    };
    let password_hash = hash_password(form.require("password")?)?;
    let profile_image = match file {
        Some(file) => Some(
            state
                .media
                .upload(file.bytes, PROFILE_IMAGE_FOLDER)
                .await?
                .url,
        ),
        None => None,
    };

    let user = users::create(
        state.db.pool(),
        NewUser {
            name: form.require("name")?.to_owned(),
            username,
            password_hash,
            role,
            chat_id,
            profile_image,
        },
    )
    .await?;
    Ok(ApiResponse::created(user))
}

pub async fn find_all(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<User>>> {
    let data = users::find_all(state.db.pool()).await?;
    Ok(ApiResponse::fetched(data))
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<User>> {
    let user = users::find_by_id(state.db.pool(), &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;
    Ok(ApiResponse::fetched(user))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<User>> {
    let mut form = collect_multipart(multipart, "profileImage").await?;
    let file = form.file.take();

    let role = match form.get("role") {
        Some(raw) => Some(parse_role(raw)?),
        None => None,
    };
    let password_hash = match form.get("password") {
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };
    let profile_image = match file {
        Some(file) => Some(
            state
                .media
                .upload(file.bytes, PROFILE_IMAGE_FOLDER)
                .await?
                .url,
        ),
        None => form.get("profileImage").map(str::to_owned),
    };

    let update = UserUpdate {
        name: form.get("name").map(str::to_owned),
        role,
        password_hash,
        profile_image,
    };
    let user = users::update(state.db.pool(), &id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;
    Ok(ApiResponse::updated(user))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    let deleted = users::delete(state.db.pool(), &id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("User not found".to_owned()));
    }
    Ok(ApiResponse::deleted(json!({ "id": id })))
}
