// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration resolved from the command line and environment

use anyhow::{anyhow, Result};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::upstream::DEFAULT_UPSTREAM_URL;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_root: PathBuf,
    pub upstream_url: String,
    /// `None` leaves the HTTP client's own default in place
    pub upstream_timeout: Option<Duration>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            static_root: PathBuf::from("public"),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_timeout: None,
            max_body_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            host: cli.host.clone(),
            port: cli.port,
            static_root: cli.root.clone(),
            upstream_url: cli.upstream_url.clone(),
            upstream_timeout: cli.upstream_timeout_secs.map(Duration::from_secs),
            max_body_bytes: cli.max_body_bytes,
        }
    }

    /// Resolve `host:port`; hostnames such as `localhost` are allowed.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow!("no address found for {}:{}", self.host, self.port))
    }
}
