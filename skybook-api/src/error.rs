use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use skybook_core::LedgerError;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Ledger(LedgerError),
    Internal(anyhow::Error),
}

impl AppError {
    /// Status code and client-facing message for this error. Internal
    /// details never leave the process; they are logged in
    /// `into_response`.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Ledger(err) => match err {
                LedgerError::FlightNotFound | LedgerError::BookingNotFound => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                LedgerError::InsufficientSeats { .. } | LedgerError::AlreadyCancelled => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                LedgerError::ReferenceExhausted => {
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
                LedgerError::Database(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Ledger(LedgerError::Database(err)) => {
                tracing::error!("database error: {err}");
            }
            AppError::Ledger(LedgerError::ReferenceExhausted) => {
                tracing::error!("booking reference space exhausted after bounded retries");
            }
            AppError::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
            }
            _ => {}
        }

        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::Ledger(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
