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

//! Fire-and-forget calls.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::call::handle::CallHandle;
use crate::client::RpcClient;
use crate::core::errors::{Result, RpcError};
use crate::protocol::models::{Arg, Request};

/// Observer of calls issued through [`RpcClient::notify_call`].
///
/// Callbacks run on the runtime task that performed the call and must not block.
pub trait CallListener: Send + Sync {
    fn on_success(&self, request: &Request, result: &Value);

    fn on_failure(&self, request: &Request, error: &RpcError);
}

impl RpcClient {
    pub fn add_listener(&self, listener: Arc<dyn CallListener>) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    /// Unregisters `listener`, compared by identity. Returns false if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn CallListener>) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Issues `method` in the background and returns its handle immediately.
    ///
    /// Argument validation happens before anything is spawned, so mixed
    /// named/positional arguments still fail here. The outcome is reported to
    /// every listener registered when the call finishes. Must be called from
    /// within a tokio runtime.
    pub fn notify_call(&self, method: &str, args: Vec<Arg>) -> Result<Arc<CallHandle>> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            RpcError::Configuration(format!("notify_call requires a tokio runtime: {}", e))
        })?;
        let request = Request::with_args(method, args)?;
        let handle = Arc::new(CallHandle::new());

        let client = self.clone();
        let task_handle = Arc::clone(&handle);
        runtime.spawn(async move {
            let outcome = client
                .dispatch::<Value>(&task_handle, &request, &client.errors)
                .await;
            let listeners = client
                .listeners
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .clone();

            debug!(id = request.id(), listeners = listeners.len(), "Notifying call listeners");
            match outcome {
                Ok(result) => {
                    let result = result.unwrap_or(Value::Null);
                    for listener in &listeners {
                        listener.on_success(&request, &result);
                    }
                }
                Err(e) => {
                    for listener in &listeners {
                        listener.on_failure(&request, &e);
                    }
                }
            }
        });

        Ok(handle)
    }
}
