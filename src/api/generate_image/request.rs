// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation request types and validation

use serde::Deserialize;
use std::fmt;

use crate::api::errors::ApiError;
use crate::upstream::DEFAULT_MODEL;

/// Request body for POST /api/generate
///
/// Every field is optional at the parsing layer so that a missing field is
/// reported as such rather than as an unparsable payload.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    /// Caller's Gemini API key; forwarded, never stored or logged
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name (optional; defaults to `DEFAULT_MODEL`)
    #[serde(default)]
    pub model: Option<String>,

    /// Edit instruction for the model
    #[serde(default)]
    pub prompt: Option<String>,

    /// Source image
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagePayload {
    /// MIME type, e.g. "image/png"
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,

    /// Base64-encoded image bytes
    #[serde(default)]
    pub data: Option<String>,
}

/// A request that passed validation, with the model resolved
#[derive(Clone, PartialEq)]
pub struct GenerationInput {
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub mime_type: String,
    pub data: String,
}

impl fmt::Debug for GenerateImageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateImageRequest")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("prompt_len", &self.prompt.as_ref().map(String::len))
            .field("image", &self.image)
            .finish()
    }
}

impl fmt::Debug for GenerationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationInput")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("prompt_len", &self.prompt.len())
            .field("mime_type", &self.mime_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl GenerateImageRequest {
    /// Parse a raw request body.
    ///
    /// Bytes that are not JSON fail with `InvalidPayload`; JSON of the wrong
    /// shape (`null`, arrays, mistyped fields) fails with `MissingFields`.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|_| ApiError::InvalidPayload)?;
        serde_json::from_value(value).map_err(|_| ApiError::MissingFields)
    }

    /// Check the required fields and resolve the effective model.
    pub fn validate(self) -> Result<GenerationInput, ApiError> {
        let image = self.image.unwrap_or_default();
        match (
            non_empty(self.api_key),
            non_empty(self.prompt),
            non_empty(image.mime_type),
            non_empty(image.data),
        ) {
            (Some(api_key), Some(prompt), Some(mime_type), Some(data)) => Ok(GenerationInput {
                api_key,
                model: non_empty(self.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                prompt,
                mime_type,
                data,
            }),
            _ => Err(ApiError::MissingFields),
        }
    }
}
