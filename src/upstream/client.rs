// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client for the Gemini `generateContent` REST endpoint

use anyhow::{anyhow, Result};
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::types::{GenerateContentRequest, GenerateContentResponse};

/// Public Gemini REST base URL
pub const DEFAULT_UPSTREAM_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when the caller does not name one
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// The outbound call never completed (connect, DNS, TLS, body read).
///
/// The message is built without the request URL, which carries the API key.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        let mut message = e.to_string();
        let mut source = e.source();
        // Some reqwest versions already fold the source into Display.
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            if !message.contains(&cause_text) {
                message.push_str(": ");
                message.push_str(&cause_text);
            }
            source = cause.source();
        }
        TransportError(message)
    }
}

/// Status and leniently parsed body of an upstream reply
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    /// `None` when the body was not JSON of the expected shape
    pub body: Option<GenerateContentResponse>,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Stateless client; one instance is shared by all requests.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: Url,
}

impl GeminiClient {
    /// Create a new client. `timeout` of `None` leaves the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| anyhow!("invalid upstream url '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("upstream url '{}' cannot be a base", base_url));
        }

        info!(
            "Gemini client configured: base_url={}, timeout={:?}",
            base_url, timeout
        );

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/models/{model}:generateContent`, with `model` encoded as one path segment.
    pub fn endpoint_url(&self, model: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("upstream url cannot be a base"))?
            .pop_if_empty()
            .push("models")
            .push(&format!("{}:generateContent", model));
        Ok(url)
    }

    /// Issue one `generateContent` call and read the whole reply.
    ///
    /// Non-2xx statuses are returned as replies, not errors; only a call that
    /// fails to complete yields `TransportError`.
    pub async fn generate_content(
        &self,
        model: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<UpstreamReply, TransportError> {
        let url = self
            .endpoint_url(model)
            .map_err(|e| TransportError(e.to_string()))?;
        debug!("Gemini generateContent POST {}", url);

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str::<GenerateContentResponse>(&text).ok();

        debug!(
            "Gemini replied: status={}, body_bytes={}, parsed={}",
            status,
            text.len(),
            body.is_some()
        );

        Ok(UpstreamReply { status, body })
    }
}
