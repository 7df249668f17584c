// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Names of the fields every generation request must carry
pub const REQUIRED_FIELDS: &[&str] = &["apiKey", "prompt", "image.type", "image.data"];

/// JSON body of every failed proxy call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON payload")]
    InvalidPayload,

    #[error("Missing required fields: {}", REQUIRED_FIELDS.join(", "))]
    MissingFields,

    /// The outbound call did not complete
    #[error("{0}")]
    UpstreamTransport(String),

    /// Upstream answered with a non-2xx status, passed through verbatim
    #[error("{message}")]
    UpstreamStatus { status: u16, message: String },

    /// Upstream answered 2xx but carried no inline image
    #[error("No image data returned by the model")]
    NoImage { text: Option<String> },
}

impl ApiError {
    pub fn upstream_status(status: u16, message: Option<&str>) -> Self {
        ApiError::UpstreamStatus {
            status,
            message: message
                .map(str::to_string)
                .unwrap_or_else(|| format!("Upstream error (status {})", status)),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let text = match self {
            ApiError::NoImage { text } => text.clone(),
            _ => None,
        };
        ErrorResponse {
            error: self.to_string(),
            text,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MethodNotAllowed => 405,
            ApiError::InvalidPayload | ApiError::MissingFields => 400,
            ApiError::UpstreamTransport(_) | ApiError::NoImage { .. } => 502,
            ApiError::UpstreamStatus { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Upstream may hand back codes outside the valid range.
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        let body = Json(self.to_response());

        if matches!(self, ApiError::MethodNotAllowed) {
            (status, [(header::ALLOW, "POST")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
