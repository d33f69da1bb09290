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

//! Error taxonomy for every call made through the crate.
//!
//! A call either fully succeeds with a typed result or fails with exactly one
//! `RpcError`. Only transport failures and timeouts are ever retried.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::models::ErrorObject;

/// Boxed error produced by caller-registered error factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = RpcError> = std::result::Result<T, E>;

/// Which transport phase ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    Connect,
    Read,
}

impl fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutPhase::Connect => f.write_str("connect"),
            TimeoutPhase::Read => f.write_str("read"),
        }
    }
}

/// Main error type for calls
#[derive(Error, Debug)]
pub enum RpcError {
    /// Bad endpoint, empty request body, invalid header or client build failure
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection refused/reset and other I/O failures (retryable)
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Connect or read timeout (retryable)
    #[error("{phase} timeout after {}ms", .after.as_millis())]
    Timeout { phase: TimeoutPhase, after: Duration },

    /// The owning call handle was cancelled
    #[error("Call cancelled")]
    Cancelled,

    /// A transformer step failed; never retried
    #[error("Transformer '{step}' failed: {source}")]
    Transformer {
        step: String,
        #[source]
        source: anyhow::Error,
    },

    /// Malformed envelope
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Result could not be coerced into the requested type
    #[error("Cannot decode {literal}: {reason}")]
    Decode { literal: String, reason: String },

    /// Remote error carrying one of the reserved JSON-RPC codes
    #[error("JSON-RPC error {}: {}", .0.code, .0.message)]
    JsonRpc(ErrorObject),

    /// Remote error carrying a custom code with no usable registered mapping
    #[error("Remote error {}: {}", .0.code, .0.message)]
    Domain(ErrorObject),

    /// Remote error converted by a caller-registered factory
    #[error("{source}")]
    Mapped {
        code: i32,
        message: String,
        #[source]
        source: BoxError,
    },

    /// Call validation failure
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl RpcError {
    /// Whether the transport may attempt the call again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RpcError::Transport(_) | RpcError::Timeout { .. })
    }

    /// Remote error code, if this error came from an `error` object.
    pub fn code(&self) -> Option<i32> {
        match self {
            RpcError::JsonRpc(e) | RpcError::Domain(e) => Some(e.code),
            RpcError::Mapped { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Borrow the caller-registered error, if this is a mapped error of type `E`.
    pub fn mapped_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            RpcError::Mapped { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub(crate) fn decode(literal: impl fmt::Display, reason: impl Into<String>) -> Self {
        RpcError::Decode {
            literal: literal.to_string(),
            reason: reason.into(),
        }
    }
}
