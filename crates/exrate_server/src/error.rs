//! HTTP boundary for feed errors
//!
//! Handlers keep the full [`ExrateError`] until the response is built; only
//! here is the distinction flattened (compat mode) or mapped to a status
//! (strict mode).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use adapter_exrate::ExrateError;

use crate::config::ErrorMode;

/// JSON body for strict-mode failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// A handler failure together with the policy for reporting it
#[derive(Debug)]
pub struct RouteError {
    pub error: ExrateError,
    pub mode: ErrorMode,
    pub fallback_text: String,
}

impl RouteError {
    /// Status code used in strict mode
    pub fn strict_status(error: &ExrateError) -> StatusCode {
        match error {
            ExrateError::Network(_) | ExrateError::MalformedFeed(_) => StatusCode::BAD_GATEWAY,
            ExrateError::CurrencyNotFound { .. } => StatusCode::NOT_FOUND,
            ExrateError::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        match self.mode {
            ErrorMode::Compat => (StatusCode::OK, self.fallback_text).into_response(),
            ErrorMode::Strict => {
                let status = Self::strict_status(&self.error);
                let body = ErrorResponse {
                    error: self.error.kind().to_string(),
                    message: self.error.to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
