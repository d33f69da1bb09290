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

//! Invocation layer.
//!
//! [`RpcClient`] turns a method name plus arguments into a [`Request`], drives
//! it through a [`CallHandle`] and converts the parsed response into either a
//! typed result or one classified [`RpcError`]. Direct calls, [`Proxy`]
//! dispatch and fire-and-forget calls all share [`RpcClient::dispatch`].

pub mod exceptions;
pub mod listener;
pub mod proxy;

use std::sync::{Arc, RwLock};

use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, error};

use crate::call::handle::CallHandle;
use crate::config::ClientConfig;
use crate::core::errors::{Result, RpcError};
use crate::protocol::models::{Arg, Request};
use crate::transport::http::{HttpTransport, HttpTransportBuilder};

pub use exceptions::ErrorRegistry;
pub use listener::CallListener;
pub use proxy::{InterfaceDescriptor, MethodDescriptor, Proxy, RemoteInterface};

/// JSON-RPC client bound to one endpoint.
///
/// Cloning is cheap: clones share the HTTP client and the listener list, and
/// each carries its own copy of the error registry.
#[derive(Clone)]
pub struct RpcClient {
    transport: HttpTransport,
    errors: ErrorRegistry,
    listeners: Arc<RwLock<Vec<Arc<dyn CallListener>>>>,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoint", &self.transport.endpoint().as_str())
            .field("errors", &self.errors)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl RpcClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport,
            errors: ErrorRegistry::default(),
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Builds a client with a transport configured from `config` and an empty pipeline.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransportBuilder::from_config(config).build()?;
        Ok(Self::new(transport))
    }

    /// Replaces the client-wide error registry.
    pub fn with_errors(mut self, errors: ErrorRegistry) -> Self {
        self.errors = errors;
        self
    }

    pub fn errors(&self) -> &ErrorRegistry {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorRegistry {
        &mut self.errors
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Calls `method` and decodes the result into `T`.
    ///
    /// Returns `Ok(None)` when the server answered with `"result": null`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, args: Vec<Arg>) -> Result<Option<T>> {
        let handle = CallHandle::new();
        self.call_with_handle(&handle, method, args).await
    }

    /// Same as [`call`](Self::call), tracked by a caller-owned handle so that
    /// another task can cancel it or read its elapsed time.
    pub async fn call_with_handle<T: DeserializeOwned>(
        &self,
        handle: &CallHandle,
        method: &str,
        args: Vec<Arg>,
    ) -> Result<Option<T>> {
        let request = match Request::with_args(method, args) {
            Ok(request) => request,
            Err(e) => {
                handle.fail();
                return Err(e);
            }
        };
        self.dispatch(handle, &request, &self.errors).await
    }

    /// Shared core of every calling convention.
    pub(crate) async fn dispatch<T: DeserializeOwned>(
        &self,
        handle: &CallHandle,
        request: &Request,
        errors: &ErrorRegistry,
    ) -> Result<Option<T>> {
        debug!(
            id = request.id(),
            method = %request.method(),
            endpoint = %self.transport.endpoint(),
            "Invoking remote method"
        );

        let outcome = match handle.perform::<T>(&self.transport, request).await {
            Ok(response) => response.into_result().map_err(|e| errors.resolve(e)),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(_) => {
                handle.complete();
                debug!(
                    id = request.id(),
                    elapsed_ms = handle.elapsed().as_millis() as u64,
                    "Call completed"
                );
            }
            Err(e) => {
                handle.fail();
                error!(
                    id = request.id(),
                    method = %request.method(),
                    code = ?e.code(),
                    error = %e,
                    "Call failed"
                );
            }
        }

        outcome
    }

    /// Calls `method` and discards whatever result the server returns.
    pub async fn call_void(&self, method: &str, args: Vec<Arg>) -> Result<()> {
        self.call::<IgnoredAny>(method, args).await.map(|_| ())
    }

    /// Boolean result, also accepting `0`/`1` and `"true"`/`"false"` in any case.
    /// Same as `call::<bool>`, since every decoded `bool` is read that way.
    pub async fn call_bool(&self, method: &str, args: Vec<Arg>) -> Result<Option<bool>> {
        self.call::<bool>(method, args).await
    }

    pub async fn call_bool_array(&self, method: &str, args: Vec<Arg>) -> Result<Option<Vec<bool>>> {
        let boxed = self.call::<Vec<Option<bool>>>(method, args).await?;
        boxed.map(unbox).transpose()
    }
}

macro_rules! typed_calls {
    ($($ty:ty => $call:ident, $array:ident;)*) => {
        impl RpcClient {
            $(
                #[doc = concat!("Calls `method` and decodes the result as `", stringify!($ty), "`.")]
                pub async fn $call(&self, method: &str, args: Vec<Arg>) -> Result<Option<$ty>> {
                    self.call::<$ty>(method, args).await
                }

                #[doc = concat!("Calls `method` and decodes the result as an array of `", stringify!($ty), "`. A `null` element is a decode error.")]
                pub async fn $array(&self, method: &str, args: Vec<Arg>) -> Result<Option<Vec<$ty>>> {
                    let boxed = self.call::<Vec<Option<$ty>>>(method, args).await?;
                    boxed.map(unbox).transpose()
                }
            )*
        }
    };
}

typed_calls! {
    i32 => call_i32, call_i32_array;
    f64 => call_f64, call_f64_array;
    f32 => call_f32, call_f32_array;
    String => call_string, call_string_array;
    i16 => call_i16, call_i16_array;
    i64 => call_i64, call_i64_array;
    char => call_char, call_char_array;
}

/// Element-wise unboxing of a decoded array.
fn unbox<T>(values: Vec<Option<T>>) -> Result<Vec<T>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            value.ok_or_else(|| RpcError::decode("null", format!("array element {} is null", index)))
        })
        .collect()
}
