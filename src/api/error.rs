//! HTTP mapping of [`Error`].
//!
//! Domain errors reach the caller with their message; infrastructure errors are logged and
//! answered with a generic 500.

use crate::{api::dto::ErrorDto, errors::Error};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

impl Error {
    /// Status code this error is answered with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::LeafletNotFound { .. }
            | Self::LeafletOrderNotFound { .. }
            | Self::CityNotFound { .. }
            | Self::DistributorNotFound { .. }
            | Self::WorkerNotFound { .. }
            | Self::OrderNotFound { .. }
            | Self::GoalNotFound { .. }
            | Self::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::InvalidQuantity { .. } => StatusCode::BAD_REQUEST,
            Self::InsufficientStock { .. } | Self::InvalidTransition { .. } | Self::InUse { .. } => {
                StatusCode::CONFLICT
            }
            Self::InvalidCredentials | Self::Unauthorized | Self::Token(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Internal error: {self}");
            "Внутренняя ошибка сервера".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorDto { error: message })).into_response()
    }
}
