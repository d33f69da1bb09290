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

//! jsonrpc-courier: a JSON-RPC 2.0 over HTTP client.
//!
//! Calls are made either directly by method name through [`RpcClient`], through
//! a declarative [`Proxy`] built from an [`InterfaceDescriptor`], or in the
//! background with [`RpcClient::notify_call`]. Every call opens one connection
//! per attempt, runs the configured transformer [`Pipeline`] over the outgoing
//! body, and ends with either a typed result or exactly one [`RpcError`].
//!
//! ```no_run
//! use jsonrpc_courier::{Arg, ClientConfig, RpcClient};
//!
//! # async fn run() -> jsonrpc_courier::Result<()> {
//! let client = RpcClient::from_config(&ClientConfig::from_env()?)?;
//! let sum = client.call_i32("sum", vec![Arg::from(5), Arg::from(4)]).await?;
//! assert_eq!(sum, Some(9));
//! # Ok(())
//! # }
//! ```

pub mod call;
pub mod client;
pub mod config;
pub mod core;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::call::handle::{CallHandle, CallState};
pub use crate::client::{
    CallListener, ErrorRegistry, InterfaceDescriptor, MethodDescriptor, Proxy, RemoteInterface,
    RpcClient,
};
pub use crate::config::ClientConfig;
pub use crate::core::errors::{BoxError, Result, RpcError, TimeoutPhase};
pub use crate::core::ids::IdGenerator;
pub use crate::protocol::coerce::{lenient_bool, LenientBool};
pub use crate::protocol::models::{Arg, ErrorObject, Params, Request, Response, StandardError};
pub use crate::transport::http::{HttpTransport, HttpTransportBuilder};
pub use crate::transport::pipeline::{Pipeline, PipelineBuilder, TransformContext, Transformer};
