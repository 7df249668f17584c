// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::path::PathBuf;

use crate::upstream::DEFAULT_UPSTREAM_URL;

/// Local development server for the image-generation front-end
#[derive(Parser, Debug, Clone)]
#[command(name = "genimage-devserver")]
#[command(version)]
#[command(about = "Serves the front-end and proxies image generation to Gemini", long_about = None)]
pub struct Cli {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory holding the front-end files
    #[arg(long, env = "STATIC_ROOT", default_value = "public")]
    pub root: PathBuf,

    /// Base URL of the generative-content API
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Timeout for the upstream call in seconds (transport default when unset)
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    /// Largest accepted generate request body, in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 25 * 1024 * 1024)]
    pub max_body_bytes: usize,
}
