//! Mapping of service outcomes onto HTTP error responses.

use crate::planning::{
    ports::PlanningStoreError,
    services::{EntityKind, PlanningError},
};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub detail: String,
}

/// An error response: status code plus message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// Creates an error response.
    #[must_use]
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the message.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    fn not_found(entity: EntityKind) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{entity} not found"))
    }

    fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }
}

impl From<PlanningError> for ApiError {
    fn from(err: PlanningError) -> Self {
        match err {
            PlanningError::NotFound { entity, .. } => Self::not_found(entity),
            PlanningError::Deadline(violation) => {
                Self::new(StatusCode::BAD_REQUEST, violation.to_string())
            }
            PlanningError::Domain(invalid) => Self::unprocessable(invalid.to_string()),
            // Foreign-key races surface from the store rather than the service.
            PlanningError::Store(PlanningStoreError::ProjectNotFound(_)) => {
                Self::not_found(EntityKind::Project)
            }
            PlanningError::Store(PlanningStoreError::TaskNotFound(_)) => {
                Self::not_found(EntityKind::Task)
            }
            PlanningError::Store(store_err) => {
                error!(error = %store_err, "planning store failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}
