//! Success envelope shared by every handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

pub mod messages {
    pub const DEFAULT: &str = "Request successful";
    pub const CREATED: &str = "Created successfully";
    pub const FETCHED: &str = "Fetched successfully";
    pub const UPDATED: &str = "Updated successfully";
    pub const DELETED: &str = "Deleted successfully";
    pub const SENT: &str = "Sent successfully";
}

pub struct ApiResponse<T: Serialize> {
    message: &'static str,
    status: StatusCode,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, message: &'static str, data: T) -> Self {
        Self {
            message,
            status,
            data,
        }
    }

    pub fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, messages::CREATED, data)
    }

    pub fn fetched(data: T) -> Self {
        Self::new(StatusCode::OK, messages::FETCHED, data)
    }

    pub fn updated(data: T) -> Self {
        Self::new(StatusCode::OK, messages::UPDATED, data)
    }

    pub fn deleted(data: T) -> Self {
        Self::new(StatusCode::OK, messages::DELETED, data)
    }

    pub fn sent(data: T) -> Self {
        Self::new(StatusCode::OK, messages::SENT, data)
    }

    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, messages::DEFAULT, data)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = json!({
            "success": true,
            "message": self.message,
            "data": self.data,
        });
        (self.status, Json(body)).into_response()
    }
}
