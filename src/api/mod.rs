//! HTTP surface: versioned REST API over the same services the bot uses.

pub mod auth;
pub mod middleware;
pub mod response;
pub mod sponsorships;
pub mod telegram;
pub mod users;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::multipart::Multipart;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::bot::relay::FileUpload;
use crate::bot::transport::BotTransport;
use crate::config::Settings;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::storage::MediaStore;

/// Shared handler state. Transport and storage sit behind trait objects so
/// handlers never name the concrete Telegram or S3 clients.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub transport: Arc<dyn BotTransport>,
    pub media: Arc<dyn MediaStore>,
    pub settings: Arc<Settings>,
}

/// Text fields plus at most one file field from a multipart form.
pub(crate) struct FormData {
    fields: HashMap<String, String>,
    pub file: Option<FileUpload>,
}

impl FormData {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn require(&self, name: &str) -> AppResult<&str> {
        self.get(name)
            .ok_or_else(|| AppError::Validation(format!("Missing field: {name}")))
    }
}

/// Drains a multipart form, treating `file_field` as the upload and every
/// other part as text.
pub(crate) async fn collect_multipart(
    mut multipart: Multipart,
    file_field: &str,
) -> AppResult<FormData> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == file_field {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            if !bytes.is_empty() {
                file = Some(FileUpload {
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            fields.insert(name, text);
        }
    }

    Ok(FormData { fields, file })
}

/// Builds the `/api/v1` router. Admin-only routes verify the bearer token
/// and require ADMIN or SUPERADMIN.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/refresh-token", post(auth::refresh_token))
        .route("/auth/request-otp", post(auth::request_otp))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/telegram/message", post(telegram::send_message))
        .route("/telegram/photo", post(telegram::send_photo))
        .route("/telegram/document", post(telegram::send_document))
        .route("/telegram/confession", post(telegram::send_confession));

    let admin = Router::new()
        .route("/telegram/broadcast", post(telegram::broadcast))
        .route("/users", post(users::create).get(users::find_all))
        .route(
            "/users/{id}",
            get(users::find_one)
                .patch(users::update)
                .delete(users::remove),
        )
        .route(
            "/sponsorships",
            post(sponsorships::create).get(sponsorships::find_all),
        )
        .route(
            "/sponsorships/{id}",
            get(sponsorships::find_one)
                .patch(sponsorships::update)
                .delete(sponsorships::remove),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", public.merge(admin))
        .layer(cors)
        .with_state(state)
}
