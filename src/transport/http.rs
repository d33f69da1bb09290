// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP transport for JSON-RPC bodies.
//!
//! Every attempt runs the transformer pipeline, opens one connection, posts
//! the body and reads the whole response body, whatever the HTTP status.
//! Connections are never pooled: the request carries `Connection: close`
//! and the client keeps no idle sockets, so an attempt owns its socket and
//! dropping the attempt closes it.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONNECTION, CONTENT_TYPE};
use reqwest::{Client, Url};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::core::constants::{defaults, headers};
use crate::core::errors::{Result, RpcError, TimeoutPhase};
use crate::transport::pipeline::Pipeline;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: Url,
    connect_timeout: Duration,
    read_timeout: Duration,
    retries: u32,
    pipeline: Pipeline,
    client: Client,
}

impl HttpTransport {
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Posts `body` and returns the raw response body.
    ///
    /// Transport failures and timeouts are retried up to `retries` times, so
    /// at most `retries + 1` connections are opened. Cancelling `cancel`
    /// drops the in-flight attempt (closing its socket) and stops the retry
    /// loop with [`RpcError::Cancelled`].
    pub async fn send(&self, body: &str, cancel: &CancellationToken) -> Result<String> {
        let mut remaining = self.retries;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(RpcError::Cancelled),
                outcome = self.attempt(body) => outcome,
            };

            match outcome {
                Ok(raw) => return Ok(raw),
                Err(e) if e.is_retryable() => {
                    if cancel.is_cancelled() {
                        debug!(attempt, "Call cancelled during failed attempt");
                        return Err(RpcError::Cancelled);
                    }
                    if remaining == 0 {
                        error!(endpoint = %self.endpoint, attempt, error = %e, "Giving up after last attempt");
                        return Err(e);
                    }
                    remaining -= 1;
                    warn!(endpoint = %self.endpoint, attempt, remaining, error = %e, "Attempt failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, body: &str) -> Result<String> {
        let (body, extra_headers) = self.pipeline.run(body)?.into_parts();
        let body = match body {
            Some(body) if !body.is_empty() => body,
            _ => {
                return Err(RpcError::Configuration(
                    "request body is empty after transformation".to_string(),
                ))
            }
        };
        let headers = request_headers(extra_headers)?;

        debug!(endpoint = %self.endpoint, body = %body, "Sending request");

        let pending = self
            .client
            .post(self.endpoint.clone())
            .headers(headers)
            .body(body)
            .send();
        let response = tokio::time::timeout(self.head_deadline(), pending)
            .await
            .map_err(|_| self.read_timed_out())?
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, status = %status, "Server answered with non-success status");
        }

        let raw = tokio::time::timeout(self.read_timeout, response.text())
            .await
            .map_err(|_| self.read_timed_out())?
            .map_err(|e| self.classify(e))?;

        debug!(status = %status, body = %raw, "Received response");
        Ok(raw)
    }

    /// Upper bound on `send()`, which covers both the TCP connect and the
    /// wait for the response head. The connect itself is bounded by the
    /// client's connect timeout and surfaces as [`TimeoutPhase::Connect`];
    /// whatever is left of this deadline after connecting is at least
    /// `read_timeout`, so a slow connect is never reported as a read timeout.
    fn head_deadline(&self) -> Duration {
        self.connect_timeout.saturating_add(self.read_timeout)
    }

    fn read_timed_out(&self) -> RpcError {
        RpcError::Timeout {
            phase: TimeoutPhase::Read,
            after: self.read_timeout,
        }
    }

    fn classify(&self, e: reqwest::Error) -> RpcError {
        if e.is_timeout() {
            if e.is_connect() {
                RpcError::Timeout {
                    phase: TimeoutPhase::Connect,
                    after: self.connect_timeout,
                }
            } else {
                self.read_timed_out()
            }
        } else {
            RpcError::Transport(e)
        }
    }
}

/// Fixed headers first, then pipeline headers, which may override them.
fn request_headers(extra: HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    map.insert(CONTENT_TYPE, HeaderValue::from_static(headers::APPLICATION_JSON));
    map.insert(ACCEPT, HeaderValue::from_static(headers::APPLICATION_JSON));
    map.insert(CONNECTION, HeaderValue::from_static(headers::CLOSE));

    for (name, value) in extra {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RpcError::Configuration(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(&value).map_err(|e| {
            RpcError::Configuration(format!("invalid value for header '{}': {}", name, e))
        })?;
        map.insert(header, value);
    }

    Ok(map)
}

pub struct HttpTransportBuilder {
    endpoint: Option<String>,
    connect_timeout: Duration,
    read_timeout: Duration,
    retries: u32,
    pipeline: Pipeline,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            connect_timeout: Duration::from_millis(defaults::CONNECT_TIMEOUT_MS),
            read_timeout: Duration::from_millis(defaults::READ_TIMEOUT_MS),
            retries: defaults::RETRIES,
            pipeline: Pipeline::default(),
        }
    }
}

impl HttpTransportBuilder {
    /// Seeds endpoint, timeouts and retry count from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            endpoint: Some(config.endpoint.clone()),
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
            retries: config.retries,
            pipeline: Pipeline::default(),
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Validates the endpoint and builds the transport.
    pub fn build(self) -> Result<HttpTransport> {
        let raw = self
            .endpoint
            .ok_or_else(|| RpcError::Configuration("no endpoint configured".to_string()))?;
        let endpoint = Url::parse(&raw)
            .map_err(|e| RpcError::Configuration(format!("malformed endpoint '{}': {}", raw, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RpcError::Configuration(format!(
                "unsupported endpoint scheme '{}'",
                endpoint.scheme()
            )));
        }

        let client = Client::builder()
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| {
                RpcError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(HttpTransport {
            endpoint,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            retries: self.retries,
            pipeline: self.pipeline,
            client,
        })
    }
}
