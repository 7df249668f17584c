// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation response types and upstream normalization

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::upstream::UpstreamReply;

/// MIME type reported when upstream omits one
pub const FALLBACK_MIME_TYPE: &str = "image/png";

/// Successful response from POST /api/generate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateImageResponse {
    pub image: GeneratedImage,
    /// Text the model returned alongside the image, trimmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    /// Base64-encoded image bytes, as returned by upstream
    pub data: String,
    pub mime_type: String,
}

fn trimmed_non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl GenerateImageResponse {
    /// Turn an upstream reply into the proxy's result.
    ///
    /// Only the first candidate is consulted. The first part with non-empty
    /// inline data becomes the image; all text parts are joined with newlines.
    pub fn from_upstream(reply: UpstreamReply) -> Result<Self, ApiError> {
        if !reply.is_success() {
            let message = reply.body.as_ref().and_then(|b| b.error_message());
            return Err(ApiError::upstream_status(reply.status, message));
        }

        let body = reply.body.unwrap_or_default();
        let parts = body.first_candidate_parts();

        let text = trimmed_non_empty(
            parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
        );

        let inline = parts
            .iter()
            .find_map(|p| p.inline_payload())
            .ok_or_else(|| ApiError::NoImage { text: text.clone() })?;

        Ok(Self {
            image: GeneratedImage {
                data: inline.data.clone().unwrap_or_default(),
                mime_type: inline
                    .mime_type
                    .clone()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string()),
            },
            text,
        })
    }
}
