use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::models::trip::TripStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("cannot transition trip from {from} to {to}")]
    InvalidTransition { from: TripStatus, to: TripStatus },

    #[error("rider has not confirmed pickup yet")]
    PickupNotConfirmed,

    #[error("{role} is not allowed to {action}")]
    UnauthorizedActor { role: String, action: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized(role: impl Into<String>, action: impl Into<String>) -> Self {
        AppError::UnauthorizedActor {
            role: role.into(),
            action: action.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::PickupNotConfirmed => StatusCode::CONFLICT,
            AppError::UnauthorizedActor { .. } => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
