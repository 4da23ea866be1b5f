// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Endpoint configuration.
//!
//! Loaded from TOML with `FW_*` environment overrides; all env access for
//! this crate is centralized here.

use fw_core::TechCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tech code must not be empty")]
    EmptyTechCode,
    #[error("invalid endpoint config: {0}")]
    Invalid(String),
}

/// Where the backend lives and how long we wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Push-channel path; the technician code is appended as a query
    /// parameter.
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    /// Base path for REST-style action calls.
    #[serde(default = "default_api_path")]
    pub api_path: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_host() -> String {
    "localhost".into()
}
fn default_port() -> u16 {
    8080
}
fn default_ws_path() -> String {
    "/ws/jobs".into()
}
fn default_api_path() -> String {
    "/api/v1".into()
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}
fn default_request_timeout_ms() -> u64 {
    5_000
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
            api_path: default_api_path(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl EndpointConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Apply `FW_*` environment overrides on top of the loaded values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("FW_ENDPOINT_HOST") {
            if !host.is_empty() {
                self.host = host;
            }
        }
        if let Some(port) = env_parse::<u16>("FW_ENDPOINT_PORT") {
            self.port = port;
        }
        if let Some(ms) = env_parse::<u64>("FW_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = ms;
        }
        if let Some(ms) = env_parse::<u64>("FW_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = ms;
        }
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Push-channel URL for one technician session.
    pub fn ws_url(&self, tech_code: &TechCode) -> String {
        format!(
            "ws://{}:{}{}?tech={}",
            self.host, self.port, self.ws_path, tech_code
        )
    }

    /// TCP address for REST-style calls.
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
