// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Outbound access to the Gemini generative-content API

pub mod client;
pub mod types;

pub use client::{
    GeminiClient, TransportError, UpstreamReply, DEFAULT_MODEL, DEFAULT_UPSTREAM_URL,
};
pub use types::{GenerateContentRequest, GenerateContentResponse, GENERATION_TEMPERATURE};
