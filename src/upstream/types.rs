// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wire types for the Gemini `generateContent` endpoint

use serde::{Deserialize, Serialize};

/// Sampling temperature sent with every generation request
pub const GENERATION_TEMPERATURE: f64 = 0.7;

// --- Outbound request ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineBlob,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineBlob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub temperature: f64,
}

impl GenerateContentRequest {
    /// Two user turns: the prompt text, then the source image as inline data.
    pub fn prompt_with_image(prompt: &str, mime_type: &str, data: &str) -> Self {
        Self {
            contents: vec![
                Content {
                    role: "user".to_string(),
                    parts: vec![RequestPart::Text {
                        text: prompt.to_string(),
                    }],
                },
                Content {
                    role: "user".to_string(),
                    parts: vec![RequestPart::InlineData {
                        inline_data: InlineBlob {
                            mime_type: mime_type.to_string(),
                            data: data.to_string(),
                        },
                    }],
                },
            ],
            generation_config: GenerationConfig {
                temperature: GENERATION_TEMPERATURE,
            },
        }
    }
}

// --- Inbound response ---
//
// Every field is optional: the body is parsed leniently and anything the
// proxy does not recognise is ignored.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub error: Option<UpstreamErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part; upstream may use either camelCase or snake_case keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "inlineData", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InlineData {
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, or an empty slice.
    pub fn first_candidate_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// `error.message` when the upstream supplied a non-empty one.
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .filter(|m| !m.is_empty())
    }
}

impl ResponsePart {
    /// Inline payload of this part, if it actually carries bytes.
    pub fn inline_payload(&self) -> Option<&InlineData> {
        self.inline_data
            .as_ref()
            .filter(|d| d.data.as_deref().is_some_and(|s| !s.is_empty()))
    }
}
