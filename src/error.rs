//! Application error type
//!
//! Every failure is request-fatal and maps to HTTP 500 with the error message
//! as a JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::api::response::ErrorResponse;
use crate::prometheus::{PrometheusError, QueryError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Prometheus(#[from] PrometheusError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(error = %self, status = status.as_u16(), "Request failed");

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
