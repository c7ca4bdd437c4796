// Segwin Server - HTTP front end for segwin windowed metrics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the segwin server

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use segwin::SegwinError;
use serde::Serialize;
use thiserror::Error;

/// Startup failures. These end the process.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Registry could not be built from the CLI arguments
    #[error("Invalid engine configuration: {0}")]
    Engine(#[from] SegwinError),

    /// Listener or serve loop failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request failure translated for an HTTP client.
#[derive(Debug)]
pub enum ApiError {
    /// Engine or registry refused the request
    Engine(SegwinError),

    /// Query string did not deserialize (missing field, negative or
    /// non-numeric offset)
    BadQuery(String),
}

impl From<SegwinError> for ApiError {
    fn from(err: SegwinError) -> Self {
        Self::Engine(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadQuery(rejection.body_text())
    }
}

impl ApiError {
    /// HTTP status for the error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(SegwinError::UnknownMetric(_)) => StatusCode::NOT_FOUND,
            ApiError::Engine(err) if err.is_invalid_argument() => StatusCode::BAD_REQUEST,
            ApiError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadQuery(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Engine(err) => err.to_string(),
            ApiError::BadQuery(msg) => msg.clone(),
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
