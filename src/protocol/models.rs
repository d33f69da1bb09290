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

//! JSON-RPC 2.0 envelope models.
//!
//! Requests are built once and never mutated; responses are parsed once from
//! the raw body returned by the transport. Both are free of I/O.

use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::constants::jsonrpc;
use crate::core::errors::{Result, RpcError};
use crate::core::ids::IdGenerator;
use crate::protocol::coerce::from_value_lenient;

/// Request parameters: index-addressed or name-addressed, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    Positional(Vec<Value>),
    /// Insertion order is preserved on the wire.
    Named(Map<String, Value>),
}

impl Params {
    /// Builds params from call arguments.
    ///
    /// Returns `Ok(None)` for an empty argument list. Fails when named and
    /// positional arguments are mixed.
    pub fn from_args(args: Vec<Arg>) -> Result<Option<Params>> {
        if args.is_empty() {
            return Ok(None);
        }

        let named = args.iter().filter(|a| a.is_named()).count();
        if named == 0 {
            let values = args.into_iter().map(Arg::into_value).collect();
            return Ok(Some(Params::Positional(values)));
        }
        if named != args.len() {
            return Err(RpcError::InvalidArgument(
                "all parameters must be named, or none".to_string(),
            ));
        }

        let mut map = Map::with_capacity(args.len());
        for arg in args {
            if let Arg::Named(name, value) = arg {
                map.insert(name, value);
            }
        }
        Ok(Some(Params::Named(map)))
    }

    pub fn len(&self) -> usize {
        match self {
            Params::Positional(v) => v.len(),
            Params::Named(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_positional(&self) -> Option<&[Value]> {
        match self {
            Params::Positional(v) => Some(v),
            Params::Named(_) => None,
        }
    }

    pub fn as_named(&self) -> Option<&Map<String, Value>> {
        match self {
            Params::Named(m) => Some(m),
            Params::Positional(_) => None,
        }
    }
}

/// One call argument, either positional or a `(name, value)` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Positional(Value),
    Named(String, Value),
}

impl Arg {
    pub fn named(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Arg::Named(name.into(), value.into())
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Arg::Positional(value.into())
    }

    /// Serializes any `Serialize` value into a positional argument.
    ///
    /// Fields skipped by serde (`#[serde(skip)]`, `skip_serializing`) never
    /// reach the wire.
    pub fn serialize<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Arg::Positional)
            .map_err(|e| RpcError::InvalidArgument(format!("argument is not serializable: {}", e)))
    }

    /// Serializes any `Serialize` value into a named argument.
    pub fn serialize_named<T: Serialize>(name: impl Into<String>, value: &T) -> Result<Self> {
        let name = name.into();
        serde_json::to_value(value)
            .map(|v| Arg::Named(name.clone(), v))
            .map_err(|e| {
                RpcError::InvalidArgument(format!("argument '{}' is not serializable: {}", name, e))
            })
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Arg::Named(..))
    }

    pub fn into_value(self) -> Value {
        match self {
            Arg::Positional(v) | Arg::Named(_, v) => v,
        }
    }
}

macro_rules! positional_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Positional(Value::from(value))
                }
            }
        )*
    };
}

positional_from!(Value, bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String);

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Positional(Value::from(value))
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Arg::Positional(Value::String(value.to_string()))
    }
}

/// An outgoing JSON-RPC 2.0 request.
///
/// Field order is the wire order: `method, params, jsonrpc, id`.
/// Two requests are equal when their ids are equal.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Params>,
    jsonrpc: String,
    id: i64,
}

impl Request {
    /// Creates a request with the next process-wide id.
    pub fn new(method: impl Into<String>, params: Option<Params>) -> Self {
        Self::with_id(IdGenerator::next(), method, params)
    }

    /// Creates a request from call arguments; see [`Params::from_args`].
    pub fn with_args(method: impl Into<String>, args: Vec<Arg>) -> Result<Self> {
        let params = Params::from_args(args)?;
        Ok(Self::new(method, params))
    }

    pub(crate) fn with_id(id: i64, method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            method: method.into(),
            params,
            jsonrpc: jsonrpc::VERSION.to_string(),
            id,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn version(&self) -> &str {
        &self.jsonrpc
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| RpcError::InvalidArgument(format!("request is not serializable: {}", e)))
    }

    /// Parses a serialized request. `id`, `method` and `jsonrpc` are required.
    pub fn parse(raw: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct RawRequest {
            method: Option<String>,
            #[serde(default)]
            params: Option<Params>,
            jsonrpc: Option<String>,
            id: Option<i64>,
        }

        let raw: RawRequest = serde_json::from_str(raw)
            .map_err(|e| RpcError::InvalidArgument(format!("malformed request: {}", e)))?;

        let missing = |field: &str| RpcError::InvalidArgument(format!("request has no '{}'", field));
        let id = raw.id.ok_or_else(|| missing("id"))?;
        let method = raw.method.ok_or_else(|| missing("method"))?;
        let version = raw.jsonrpc.ok_or_else(|| missing("jsonrpc"))?;
        if version != jsonrpc::VERSION {
            return Err(RpcError::InvalidArgument(format!(
                "unsupported jsonrpc version '{}'",
                version
            )));
        }

        Ok(Self::with_id(id, method, raw.params))
    }
}

impl PartialEq for Request {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Request {}

impl Hash for Request {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The five codes JSON-RPC 2.0 reserves for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StandardError {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// True for codes in the reserved range `[-32700, -32600]`.
    pub fn is_standard(&self) -> bool {
        (jsonrpc::RESERVED_MIN..=jsonrpc::RESERVED_MAX).contains(&self.code)
    }

    pub fn kind(&self) -> Option<StandardError> {
        match self.code {
            jsonrpc::ERROR_PARSE => Some(StandardError::ParseError),
            jsonrpc::ERROR_INVALID_REQUEST => Some(StandardError::InvalidRequest),
            jsonrpc::ERROR_METHOD_NOT_FOUND => Some(StandardError::MethodNotFound),
            jsonrpc::ERROR_INVALID_PARAMS => Some(StandardError::InvalidParams),
            jsonrpc::ERROR_INTERNAL => Some(StandardError::InternalError),
            _ => None,
        }
    }
}

/// A parsed JSON-RPC 2.0 response.
///
/// Exactly one of `result` and `error` was present on the wire. An explicit
/// `"result": null` parses to `result() == None` with `error() == None`.
#[derive(Debug, Clone)]
pub struct Response<T> {
    id: Value,
    result: Option<T>,
    error: Option<ErrorObject>,
}

impl<T: DeserializeOwned> Response<T> {
    /// Parses and validates a raw response body, decoding `result` into `T`.
    pub fn parse(raw: &str) -> Result<Self> {
        let envelope: Value = serde_json::from_str(raw)
            .map_err(|e| RpcError::Protocol(format!("malformed JSON: {}", e)))?;
        let Value::Object(mut envelope) = envelope else {
            return Err(RpcError::Protocol("response is not a JSON object".to_string()));
        };

        match envelope.get("jsonrpc") {
            Some(Value::String(v)) if v == jsonrpc::VERSION => {}
            Some(other) => {
                return Err(RpcError::Protocol(format!(
                    "unsupported jsonrpc version {}",
                    other
                )))
            }
            None => return Err(RpcError::Protocol("response has no 'jsonrpc'".to_string())),
        }

        let id = match envelope.remove("id") {
            None | Some(Value::Null) => {
                return Err(RpcError::Protocol("response has no 'id'".to_string()))
            }
            Some(id) => id,
        };

        match (envelope.remove("result"), envelope.remove("error")) {
            (Some(_), Some(_)) => Err(RpcError::Protocol(
                "response carries both 'result' and 'error'".to_string(),
            )),
            (None, None) => Err(RpcError::Protocol(
                "response carries neither 'result' nor 'error'".to_string(),
            )),
            (None, Some(error)) => {
                let error: ErrorObject = serde_json::from_value(error)
                    .map_err(|e| RpcError::Protocol(format!("malformed error object: {}", e)))?;
                Ok(Self {
                    id,
                    result: None,
                    error: Some(error),
                })
            }
            (Some(Value::Null), None) => Ok(Self {
                id,
                result: None,
                error: None,
            }),
            (Some(result), None) => Ok(Self {
                id,
                result: Some(decode_result(&result)?),
                error: None,
            }),
        }
    }
}

impl<T> Response<T> {
    pub fn id(&self) -> &Value {
        &self.id
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorObject> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_result(self) -> std::result::Result<Option<T>, ErrorObject> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

fn decode_result<T: DeserializeOwned>(value: &Value) -> Result<T> {
    from_value_lenient(value).map_err(|e| RpcError::decode(value, e.to_string()))
}
