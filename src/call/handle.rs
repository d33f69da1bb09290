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

//! Per-call state tracking and cooperative cancellation.
//!
//! A [`CallHandle`] never owns a connection. The socket lives inside the
//! transport attempt future for the duration of one `send`; cancelling the
//! handle makes that future lose its race against the cancellation token,
//! which drops it and closes the socket. Once `send` returns there is nothing
//! left for `cancel` to close.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::errors::Result;
use crate::protocol::models::{Request, Response};
use crate::transport::http::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Running,
    Complete,
    Failed,
}

impl CallState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, CallState::Running)
    }
}

#[derive(Debug)]
struct Progress {
    state: CallState,
    finished: Option<Instant>,
}

#[derive(Debug)]
pub struct CallHandle {
    started: Instant,
    progress: Mutex<Progress>,
    cancel: CancellationToken,
}

impl Default for CallHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CallHandle {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            progress: Mutex::new(Progress {
                state: CallState::Running,
                finished: None,
            }),
            cancel: CancellationToken::new(),
        }
    }

    /// Sends `request` through `transport` and parses the raw response.
    ///
    /// The state is left untouched: the caller inspects the response's
    /// `error` first and then calls [`complete`](Self::complete) or
    /// [`fail`](Self::fail).
    pub async fn perform<T: DeserializeOwned>(
        &self,
        transport: &HttpTransport,
        request: &Request,
    ) -> Result<Response<T>> {
        let body = request.to_json()?;
        let raw = transport.send(&body, &self.cancel).await?;
        Response::parse(&raw)
    }

    /// Aborts the in-flight attempt, if any. The pending `perform` returns
    /// [`RpcError::Cancelled`](crate::core::errors::RpcError::Cancelled).
    pub fn cancel(&self) {
        debug!(elapsed_ms = self.elapsed().as_millis() as u64, "Cancelling call");
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn state(&self) -> CallState {
        self.lock().state
    }

    /// Marks the call as succeeded. Returns false if it had already finished.
    pub fn complete(&self) -> bool {
        self.finish(CallState::Complete)
    }

    /// Marks the call as failed. Returns false if it had already finished.
    pub fn fail(&self) -> bool {
        self.finish(CallState::Failed)
    }

    /// Time since creation while running; frozen at the first terminal transition.
    pub fn elapsed(&self) -> Duration {
        match self.lock().finished {
            Some(end) => end.duration_since(self.started),
            None => self.started.elapsed(),
        }
    }

    fn finish(&self, state: CallState) -> bool {
        let mut progress = self.lock();
        if progress.state.is_terminal() {
            return false;
        }
        progress.state = state;
        progress.finished = Some(Instant::now());
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }
}
