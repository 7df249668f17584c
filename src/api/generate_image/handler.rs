// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation proxy handler

use axum::{
    extract::{Request, State},
    http::Method,
    Json,
};
use tracing::{debug, info, warn};

use super::request::GenerateImageRequest;
use super::response::GenerateImageResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::upstream::GenerateContentRequest;

/// ANY /api/generate - Edit an image with a text prompt via Gemini
///
/// Pipeline:
/// 1. Reject anything but POST (405, `Allow: POST`)
/// 2. Read and parse the JSON body (400 on failure)
/// 3. Validate required fields, resolve the model (400 on failure)
/// 4. Forward a two-turn generateContent request (502 if the call fails)
/// 5. Pass through non-2xx upstream statuses
/// 6. Extract the first inline image (502 if none) and any text
pub async fn generate_image_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    // 1. Method check
    if request.method() != Method::POST {
        debug!("Rejecting {} on generate endpoint", request.method());
        return Err(ApiError::MethodNotAllowed);
    }

    // 2. Body
    let body = axum::body::to_bytes(request.into_body(), state.max_body_bytes)
        .await
        .map_err(|e| {
            warn!("Failed to read generate request body: {}", e);
            ApiError::InvalidPayload
        })?;
    let payload = GenerateImageRequest::from_body(&body)?;

    // 3. Validation
    let input = payload.validate()?;
    debug!(
        "Image generation request received: model={}, prompt_len={}, mime_type={}, image_b64_len={}",
        input.model,
        input.prompt.len(),
        input.mime_type,
        input.data.len()
    );

    // 4. Upstream call
    let upstream_request =
        GenerateContentRequest::prompt_with_image(&input.prompt, &input.mime_type, &input.data);
    let reply = state
        .gemini
        .generate_content(&input.model, &input.api_key, &upstream_request)
        .await
        .map_err(|e| {
            warn!("Gemini request failed: {}", e);
            ApiError::UpstreamTransport(e.to_string())
        })?;

    // 5-6. Normalization
    match GenerateImageResponse::from_upstream(reply) {
        Ok(response) => {
            info!(
                "Image generated: model={}, mime_type={}, image_b64_len={}, has_text={}",
                input.model,
                response.image.mime_type,
                response.image.data.len(),
                response.text.is_some()
            );
            Ok(Json(response))
        }
        Err(e) => {
            warn!(
                "Image generation failed: model={}, status={}, error={}",
                input.model,
                e.status_code(),
                e
            );
            Err(e)
        }
    }
}
