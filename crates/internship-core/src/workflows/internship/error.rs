use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::domain::{ActorRole, InternshipStatus};
use super::lifecycle::TransitionAction;
use super::repository::RepositoryError;

/// Recoverable failures surfaced to callers of the internship core.
#[derive(Debug, thiserror::Error)]
pub enum InternshipError {
    #[error("cannot {action} while internship status is {from}: {detail}")]
    InvalidTransition {
        from: InternshipStatus,
        action: TransitionAction,
        detail: String,
    },
    #[error("{role} is not permitted to {operation}")]
    Unauthorized { role: ActorRole, operation: String },
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{entity} '{id}' was modified concurrently (expected {expected}); reload and retry")]
    Conflict {
        entity: &'static str,
        id: String,
        expected: String,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl InternshipError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidTransition { .. } | Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            Self::Repository(RepositoryError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation_error",
            Self::Conflict { .. } => "conflict",
            Self::Repository(_) => "repository_error",
        }
    }
}

impl IntoResponse for InternshipError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));
        (status, body).into_response()
    }
}
