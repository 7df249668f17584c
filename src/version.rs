// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the image-generation dev server

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-19";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("genimage-devserver {} ({})", VERSION_NUMBER, BUILD_DATE)
}
