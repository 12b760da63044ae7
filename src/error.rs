use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Every way a cinema operation can be refused.
///
/// Business rejections map to 4xx responses; only `Storage` can become a 5xx.
#[derive(Debug, Error)]
pub enum CinemaError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("show time already busy: hall {hall_id} has film show {showing_id} at that time")]
    Conflict { hall_id: i64, showing_id: i64 },

    #[error("film show {showing_id} already started")]
    ShowAlreadyStarted { showing_id: i64 },

    #[error("row {row}, place {place} is already booked for film show {showing_id}")]
    SeatTaken {
        showing_id: i64,
        row: i32,
        place: i32,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl CinemaError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        CinemaError::NotFound { entity, id }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        CinemaError::InvalidInput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CinemaError::NotFound { .. } => StatusCode::NOT_FOUND,
            CinemaError::Conflict { .. }
            | CinemaError::ShowAlreadyStarted { .. }
            | CinemaError::SeatTaken { .. }
            | CinemaError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CinemaError::Storage(StoreError::Busy) => StatusCode::SERVICE_UNAVAILABLE,
            CinemaError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CinemaError::NotFound { .. } => "NOT_FOUND",
            CinemaError::Conflict { .. } => "SHOW_TIME_CONFLICT",
            CinemaError::ShowAlreadyStarted { .. } => "SHOW_ALREADY_STARTED",
            CinemaError::SeatTaken { .. } => "SEAT_TAKEN",
            CinemaError::InvalidInput(_) => "INVALID_INPUT",
            CinemaError::Storage(StoreError::Busy) => "STORAGE_BUSY",
            CinemaError::Storage(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<JsonRejection> for CinemaError {
    fn from(rejection: JsonRejection) -> Self {
        CinemaError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for CinemaError {
    fn from(rejection: PathRejection) -> Self {
        CinemaError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for CinemaError {
    fn from(rejection: QueryRejection) -> Self {
        CinemaError::InvalidInput(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    detail: String,
}

impl IntoResponse for CinemaError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "storage failure");
            if matches!(self, CinemaError::Storage(StoreError::Busy)) {
                self.to_string()
            } else {
                "An internal error occurred".to_string()
            }
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            code: self.code(),
            detail,
        };
        (status, Json(body)).into_response()
    }
}
