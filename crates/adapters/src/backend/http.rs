// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP implementation of [`Backend`] over plain TCP.
//!
//! Minimal HTTP/1.1 with bearer-token authentication; one connection per
//! request. Status codes classify into [`BackendError`]: 401/403 become
//! `Unauthorized`, other 4xx `Rejected`, everything else that is not 2xx
//! `Transport`.

use super::{Backend, BackendError, CompleteConfirmation, StartConfirmation};
use crate::config::EndpointConfig;
use async_trait::async_trait;
use fw_core::{JobId, SessionContext};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

pub struct HttpBackend {
    config: EndpointConfig,
}

impl HttpBackend {
    pub fn new(config: EndpointConfig) -> Self {
        Self { config }
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}{}", self.config.api_path, suffix)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        ctx: &SessionContext,
        suffix: &str,
        body: serde_json::Value,
    ) -> Result<T, BackendError> {
        let response = post_authed(
            &self.config.api_addr(),
            &self.path(suffix),
            &body.to_string(),
            &ctx.token,
            self.config.request_timeout(),
        )
        .await?;
        decode(response)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn start_breakdown(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        recall_reason: Option<&str>,
    ) -> Result<StartConfirmation, BackendError> {
        let body = json!({
            "company": ctx.company,
            "tech": ctx.tech_code.as_str(),
            "recall_reason": recall_reason,
        });
        self.post_json(ctx, &format!("/breakdowns/{job_id}/start"), body).await
    }

    async fn complete_breakdown(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        solution_category: &str,
        solution_text: &str,
    ) -> Result<CompleteConfirmation, BackendError> {
        let body = json!({
            "company": ctx.company,
            "tech": ctx.tech_code.as_str(),
            "solution_category": solution_category,
            "solution_text": solution_text,
        });
        self.post_json(ctx, &format!("/breakdowns/{job_id}/complete"), body).await
    }

    async fn start_service(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        meter_reading: Option<i64>,
    ) -> Result<StartConfirmation, BackendError> {
        let body = json!({
            "company": ctx.company,
            "tech": ctx.tech_code.as_str(),
            "meter_reading": meter_reading,
        });
        self.post_json(ctx, &format!("/services/{job_id}/start"), body).await
    }

    async fn complete_service(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        solution_category: &str,
        solution_text: &str,
        closing_meter_reading: Option<i64>,
    ) -> Result<CompleteConfirmation, BackendError> {
        let body = json!({
            "company": ctx.company,
            "tech": ctx.tech_code.as_str(),
            "solution_category": solution_category,
            "solution_text": solution_text,
            "closing_meter_reading": closing_meter_reading,
        });
        self.post_json(ctx, &format!("/services/{job_id}/complete"), body).await
    }

    async fn submit_recall(
        &self,
        ctx: &SessionContext,
        job_id: &JobId,
        reason: &str,
        on_site: bool,
    ) -> Result<(), BackendError> {
        let body = json!({
            "company": ctx.company,
            "tech": ctx.tech_code.as_str(),
            "reason": reason,
            "on_site": on_site,
        });
        let response = post_authed(
            &self.config.api_addr(),
            &self.path(&format!("/breakdowns/{job_id}/recall")),
            &body.to_string(),
            &ctx.token,
            self.config.request_timeout(),
        )
        .await?;
        classify(response).map(|_| ())
    }

    async fn solution_categories(
        &self,
        ctx: &SessionContext,
    ) -> Result<Vec<String>, BackendError> {
        let response = get_authed(
            &self.config.api_addr(),
            &self.path("/solution-categories"),
            &ctx.token,
            self.config.request_timeout(),
        )
        .await?;
        decode(response)
    }
}

/// Raw HTTP response: status code and body.
#[derive(Debug)]
pub(crate) struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP GET with a bearer auth token.
pub(crate) async fn get_authed(
    addr: &str,
    path: &str,
    token: &str,
    timeout: Duration,
) -> Result<HttpResponse, BackendError> {
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nAuthorization: Bearer {}\r\nConnection: close\r\n\r\n",
        path, token
    );
    timed_request(addr, &request, timeout).await
}

/// HTTP POST with a bearer auth token and JSON body.
pub(crate) async fn post_authed(
    addr: &str,
    path: &str,
    body: &str,
    token: &str,
    timeout: Duration,
) -> Result<HttpResponse, BackendError> {
    let request = format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\nAuthorization: Bearer {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        path, token, body.len(), body
    );
    timed_request(addr, &request, timeout).await
}

async fn timed_request(
    addr: &str,
    request: &str,
    timeout: Duration,
) -> Result<HttpResponse, BackendError> {
    tokio::time::timeout(timeout, send_request(addr, request))
        .await
        .map_err(|_| BackendError::Transport("HTTP request timed out".into()))?
}

async fn send_request(addr: &str, request: &str) -> Result<HttpResponse, BackendError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|e| BackendError::Transport(format!("TCP connect failed: {}", e)))?;
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| BackendError::Transport(format!("write failed: {}", e)))?;

    let mut reader = BufReader::new(&mut stream);
    read_http_response(&mut reader).await
}

/// Parse status line, headers, and a Content-Length-delimited body.
pub(crate) async fn read_http_response<R>(reader: &mut R) -> Result<HttpResponse, BackendError>
where
    R: AsyncBufReadExt + Unpin,
{
    let mut status_line = String::new();
    reader
        .read_line(&mut status_line)
        .await
        .map_err(|e| BackendError::Transport(format!("read failed: {}", e)))?;
    let status = parse_status_line(&status_line)?;

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        let n = reader
            .read_line(&mut line)
            .await
            .map_err(|e| BackendError::Transport(format!("read failed: {}", e)))?;
        let line = line.trim_end();
        if n == 0 || line.is_empty() {
            break;
        }
        if let Some(value) = line
            .to_ascii_lowercase()
            .strip_prefix("content-length:")
            .map(str::trim)
        {
            content_length = value
                .parse()
                .map_err(|_| BackendError::Transport(format!("bad content-length: {}", value)))?;
        }
    }

    let mut body = vec![0u8; content_length];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|e| BackendError::Transport(format!("body read failed: {}", e)))?;
    let body = String::from_utf8_lossy(&body).into_owned();

    Ok(HttpResponse { status, body })
}

pub(crate) fn parse_status_line(line: &str) -> Result<u16, BackendError> {
    line.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| BackendError::Transport(format!("malformed status line: {}", line.trim())))
}

/// Map the status code onto the error taxonomy; 2xx passes through.
pub(crate) fn classify(response: HttpResponse) -> Result<HttpResponse, BackendError> {
    match response.status {
        200..=299 => Ok(response),
        401 | 403 => Err(BackendError::Unauthorized),
        400..=499 => Err(BackendError::Rejected(response.body)),
        status => Err(BackendError::Transport(format!("HTTP {}", status))),
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, BackendError> {
    let response = classify(response)?;
    serde_json::from_str(&response.body)
        .map_err(|e| BackendError::Transport(format!("bad response body: {}", e)))
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
