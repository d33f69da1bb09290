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

//! Declarative interfaces.
//!
//! An [`InterfaceDescriptor`] is the dispatch table for one remote interface:
//! each local method name maps to a [`MethodDescriptor`] saying which remote
//! procedure to call and how to lay out its parameters. The table is built
//! once, when the interface is registered with [`RpcClient::proxy`], and a
//! [`Proxy`] then dispatches calls through it.
//!
//! ```ignore
//! struct Calculator;
//!
//! impl RemoteInterface for Calculator {
//!     fn descriptor() -> InterfaceDescriptor {
//!         InterfaceDescriptor::new("Calculator")
//!             .remote()
//!             .method(MethodDescriptor::new("sum"))
//!             .method(MethodDescriptor::new("divide").named_params(["dividend", "divisor"]))
//!     }
//! }
//!
//! let calc = client.proxy::<Calculator>()?;
//! let total: Option<i32> = calc.invoke("sum", vec![json!(5), json!(4)]).await?;
//! ```

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::call::handle::CallHandle;
use crate::client::exceptions::ErrorRegistry;
use crate::client::RpcClient;
use crate::core::errors::{Result, RpcError};
use crate::protocol::models::{Params, Request};

/// How one local method maps onto a remote procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: String,
    remote_name: Option<String>,
    param_names: Option<Vec<String>>,
    passthrough: bool,
}

impl MethodDescriptor {
    /// Positional parameters, remote name equal to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_name: None,
            param_names: None,
            passthrough: false,
        }
    }

    /// Calls a remote procedure with a different name.
    pub fn remote_name(mut self, remote_name: impl Into<String>) -> Self {
        self.remote_name = Some(remote_name.into());
        self
    }

    /// Sends parameters by name, matched 1:1 to the arguments by position.
    pub fn named_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// A single argument holding an array or object is sent as the params
    /// value itself instead of being wrapped in a one-element list.
    pub fn passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remote procedure actually called.
    pub fn target(&self) -> &str {
        self.remote_name.as_deref().unwrap_or(&self.name)
    }

    pub fn param_names(&self) -> Option<&[String]> {
        self.param_names.as_deref()
    }

    fn params(&self, args: Vec<Value>) -> Result<Option<Params>> {
        if self.passthrough && args.len() == 1 {
            match args.into_iter().next() {
                Some(Value::Array(values)) => return Ok(Some(Params::Positional(values))),
                Some(Value::Object(map)) => return Ok(Some(Params::Named(map))),
                Some(other) => return Ok(Some(Params::Positional(vec![other]))),
                None => return Ok(None),
            }
        }

        match &self.param_names {
            Some(names) => {
                if names.len() != args.len() {
                    return Err(RpcError::InvalidArgument(format!(
                        "method '{}' declares {} parameter names but got {} arguments",
                        self.name,
                        names.len(),
                        args.len()
                    )));
                }
                if args.is_empty() {
                    return Ok(None);
                }
                let map: Map<String, Value> = names.iter().cloned().zip(args).collect();
                Ok(Some(Params::Named(map)))
            }
            None if args.is_empty() => Ok(None),
            None => Ok(Some(Params::Positional(args))),
        }
    }
}

/// Dispatch table for one remote interface.
#[derive(Debug, Clone, Default)]
pub struct InterfaceDescriptor {
    name: String,
    remote: bool,
    methods: HashMap<String, MethodDescriptor>,
    errors: ErrorRegistry,
}

impl InterfaceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Marks the interface as remotely invokable. Unmarked interfaces are
    /// refused by [`RpcClient::proxy_for`].
    pub fn remote(mut self) -> Self {
        self.remote = true;
        self
    }

    /// Registers a method; a later registration under the same name replaces it.
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    /// Maps a custom error code for calls made through this interface only.
    /// Takes precedence over the client's own mapping for the same code.
    pub fn error<E>(mut self, code: i32) -> Self
    where
        E: From<String> + Error + Send + Sync + 'static,
    {
        self.errors.register::<E>(code);
        self
    }

    pub fn errors(mut self, errors: ErrorRegistry) -> Self {
        self.errors = errors;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn lookup(&self, method: &str) -> Option<&MethodDescriptor> {
        self.methods.get(method)
    }
}

/// Implemented by marker types describing a remote interface.
pub trait RemoteInterface {
    fn descriptor() -> InterfaceDescriptor;
}

/// Client-side stand-in for a remote interface.
#[derive(Debug, Clone)]
pub struct Proxy {
    client: RpcClient,
    interface: Arc<InterfaceDescriptor>,
    errors: ErrorRegistry,
}

impl RpcClient {
    pub fn proxy<I: RemoteInterface>(&self) -> Result<Proxy> {
        self.proxy_for(I::descriptor())
    }

    pub fn proxy_for(&self, interface: InterfaceDescriptor) -> Result<Proxy> {
        if !interface.is_remote() {
            return Err(RpcError::InvalidArgument(format!(
                "interface '{}' is not marked as remote",
                interface.name
            )));
        }
        let errors = self.errors.merged(&interface.errors);
        Ok(Proxy {
            client: self.clone(),
            interface: Arc::new(interface),
            errors,
        })
    }
}

impl Proxy {
    pub fn interface(&self) -> &InterfaceDescriptor {
        &self.interface
    }

    /// Calls the remote procedure behind `method`, decoding the result into `T`.
    pub async fn invoke<T: DeserializeOwned>(&self, method: &str, args: Vec<Value>) -> Result<Option<T>> {
        let handle = CallHandle::new();
        self.invoke_with_handle(&handle, method, args).await
    }

    pub async fn invoke_with_handle<T: DeserializeOwned>(
        &self,
        handle: &CallHandle,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Option<T>> {
        let request = match self.request(method, args) {
            Ok(request) => request,
            Err(e) => {
                handle.fail();
                return Err(e);
            }
        };
        self.client.dispatch(handle, &request, &self.errors).await
    }

    fn request(&self, method: &str, args: Vec<Value>) -> Result<Request> {
        let descriptor = self.interface.lookup(method).ok_or_else(|| {
            RpcError::InvalidArgument(format!(
                "interface '{}' has no method '{}'",
                self.interface.name, method
            ))
        })?;
        let params = descriptor.params(args)?;
        debug!(
            interface = %self.interface.name,
            method,
            remote = descriptor.target(),
            "Dispatching proxy call"
        );
        Ok(Request::new(descriptor.target(), params))
    }
}
