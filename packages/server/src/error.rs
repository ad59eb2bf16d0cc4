use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::geo::CoordinateError;
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable error description.
    #[schema(example = "Missing coordinates")]
    pub error: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    PayloadTooLarge(String),
    NotFound(String),
    /// `public` is what the client sees; `detail` is logged only.
    Internal { public: String, detail: String },
}

impl AppError {
    pub fn internal(public: impl Into<String>, detail: impl Into<String>) -> Self {
        AppError::Internal {
            public: public.into(),
            detail: detail.into(),
        }
    }

    /// Replace the client-facing message of an `Internal` error so each
    /// endpoint can report its own failure wording. Other variants pass
    /// through unchanged.
    pub fn public_message(self, msg: &str) -> Self {
        match self {
            AppError::Internal { detail, .. } => AppError::Internal {
                public: msg.to_string(),
                detail,
            },
            other => other,
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorBody { error: msg }),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, ErrorBody { error: msg })
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody { error: msg }),
            AppError::Internal { public, detail } => {
                tracing::error!("Internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: public },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::internal("Internal server error", err.to_string())
    }
}

impl From<CoordinateError> for AppError {
    fn from(err: CoordinateError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::NotFound("Audio file not found".into()),
            StorageError::UnsupportedMediaType(_) | StorageError::InvalidRef(_) => {
                AppError::Validation(err.to_string())
            }
            StorageError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            StorageError::Io(e) => AppError::internal("Internal server error", e.to_string()),
        }
    }
}
