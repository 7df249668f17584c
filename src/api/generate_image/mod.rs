// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation proxy endpoint module
//!
//! Provides POST /api/generate, forwarding prompt + image to Gemini.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::generate_image_handler;
pub use request::{GenerateImageRequest, GenerationInput, ImagePayload};
pub use response::{GenerateImageResponse, GeneratedImage, FALLBACK_MIME_TYPE};
