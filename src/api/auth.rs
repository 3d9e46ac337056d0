//! Authentication endpoints.

use axum::extract::multipart::Multipart;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::response::ApiResponse;
use crate::api::{collect_multipart, AppState};
use crate::auth::{self, Registration};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub username: String,
    pub otp: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<ApiResponse<auth::AuthResponse>> {
    let data = auth::login(
        &state.db,
        state.settings.jwt_secret.as_bytes(),
        &body.username,
        &body.password,
    )
    .await?;
    Ok(ApiResponse::new(StatusCode::OK, "Login successfully", data))
}

pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<auth::AuthResponse>> {
    let form = collect_multipart(multipart, "profileImage").await?;
    let registration = Registration {
        name: form.require("name")?.to_owned(),
        username: form.require("username")?.to_owned(),
        password: form.require("password")?.to_owned(),
    };
    let data = auth::register(
        &state.db,
        state.media.as_ref(),
        state.settings.jwt_secret.as_bytes(),
        registration,
        form.file.map(|f| f.bytes),
    )
    .await?;
    Ok(ApiResponse::new(
        StatusCode::CREATED,
        "Register successfully",
        data,
    ))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> AppResult<ApiResponse<auth::tokens::TokenPair>> {
    let data = auth::refresh(state.settings.jwt_secret.as_bytes(), &body.refresh_token)?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        "Refresh successfully",
        data,
    ))
}

pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpRequest>,
) -> AppResult<ApiResponse<Value>> {
    auth::otp::request(&state.db, state.transport.as_ref(), &body.username).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        "Request OTP successfully",
        json!({ "username": body.username }),
    ))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpRequest>,
) -> AppResult<ApiResponse<auth::otp::OtpVerification>> {
    let otp = body
        .otp
        .ok_or_else(|| AppError::Validation("Missing field: otp".to_owned()))?;
    let data = auth::otp::verify(&state.db, &body.username, &otp).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        "Verify OTP successfully",
        data,
    ))
}
