use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde::Serialize;

use crate::error::MammoriskError;

/// Body returned with every error status
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// An error ready to be sent back as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<MammoriskError> for ApiError {
    fn from(err: MammoriskError) -> Self {
        let status = match &err {
            MammoriskError::UnsupportedFormat(_)
            | MammoriskError::ImageError(_)
            | MammoriskError::DicomError(_) => StatusCode::BAD_REQUEST,
            MammoriskError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MammoriskError::AuthError(_) => StatusCode::UNAUTHORIZED,
            MammoriskError::NotFound(_) => StatusCode::NOT_FOUND,
            MammoriskError::Conflict(_) => StatusCode::CONFLICT,
            MammoriskError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            MammoriskError::InferenceError(_)
            | MammoriskError::ShapeMismatch(_)
            | MammoriskError::DatabaseError(_)
            | MammoriskError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!("Request failed: {}", err);
            return Self::new(status, "internal error while processing the request");
        }

        let detail = match err {
            MammoriskError::ImageError(msg)
            | MammoriskError::DicomError(msg)
            | MammoriskError::ValidationError(msg)
            | MammoriskError::AuthError(msg)
            | MammoriskError::NotFound(msg)
            | MammoriskError::Conflict(msg)
            | MammoriskError::ModelUnavailable(msg) => msg,
            other => other.to_string(),
        };
        warn!("Request rejected ({}): {}", status, detail);
        Self::new(status, detail)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        error!("Worker task failed: {}", err);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal error while processing the request",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(ErrorBody { detail: self.detail })).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
