use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::reviews::{
    CollectionError, ExportError, HiringApiError, ReviewServiceError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Runtime(tokio::task::JoinError),
    Hiring(HiringApiError),
    Collection(CollectionError),
    Export(ExportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Runtime(err) => write!(f, "background task failed: {}", err),
            AppError::Hiring(err) => write!(f, "hiring API error: {}", err),
            AppError::Collection(err) => write!(f, "collection error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Runtime(err) => Some(err),
            AppError::Hiring(err) => Some(err),
            AppError::Collection(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Collection(CollectionError::InvalidDateRange { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Collection(CollectionError::UnknownOpening(_)) => StatusCode::NOT_FOUND,
            AppError::Hiring(HiringApiError::MissingCredential) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Hiring(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Runtime(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Runtime(value)
    }
}

impl From<HiringApiError> for AppError {
    fn from(value: HiringApiError) -> Self {
        Self::Hiring(value)
    }
}

impl From<CollectionError> for AppError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<ReviewServiceError> for AppError {
    fn from(value: ReviewServiceError) -> Self {
        match value {
            ReviewServiceError::Gateway(err) => Self::Hiring(err),
            ReviewServiceError::Collection(err) => Self::Collection(err),
            ReviewServiceError::Export(err) => Self::Export(err),
        }
    }
}
