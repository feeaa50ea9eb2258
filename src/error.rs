use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{backend::BackendError, models::ApiResponse};

/// Message shown by the console whenever the platform API cannot be reached.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";

/// ApiError
///
/// Error type of every console API handler. Renders the same
/// `{ success: false, message }` envelope the platform API uses, so the console
/// shell has a single shape to toast.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status { status, message } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                Self::new(status, message)
            }
            BackendError::Network(source) => {
                tracing::error!(error = %source, "platform API unreachable");
                Self::bad_gateway(NETWORK_ERROR_MESSAGE)
            }
            BackendError::Upload(source) => Self::bad_request(source.to_string()),
            BackendError::InvalidId(id) => Self::bad_request(format!("Invalid id: {id:?}")),
            BackendError::Setup(reason) => {
                tracing::error!(%reason, "platform API client misconfigured");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, NETWORK_ERROR_MESSAGE)
            }
            BackendError::Decode(source) => {
                tracing::error!(error = %source, "platform API returned an unreadable body");
                Self::bad_gateway(NETWORK_ERROR_MESSAGE)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.message))).into_response()
    }
}
