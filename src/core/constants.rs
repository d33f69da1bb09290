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

//! jsonrpc-courier constants - single source of truth for protocol values,
//! header names and configuration defaults.

/// JSON-RPC 2.0 envelope values and reserved error codes
pub mod jsonrpc {
    /// The only protocol version this crate speaks
    pub const VERSION: &str = "2.0";
    /// Parse error (standard JSON-RPC)
    pub const ERROR_PARSE: i32 = -32700;
    /// Invalid request (standard JSON-RPC)
    pub const ERROR_INVALID_REQUEST: i32 = -32600;
    /// Method not found (standard JSON-RPC)
    pub const ERROR_METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params (standard JSON-RPC)
    pub const ERROR_INVALID_PARAMS: i32 = -32602;
    /// Internal error (standard JSON-RPC)
    pub const ERROR_INTERNAL: i32 = -32603;

    /// Lowest code of the reserved range
    pub const RESERVED_MIN: i32 = ERROR_PARSE;
    /// Highest code of the reserved range
    pub const RESERVED_MAX: i32 = ERROR_INVALID_REQUEST;
}

/// Fixed header values written on every request
pub mod headers {
    pub const APPLICATION_JSON: &str = "application/json";
    pub const CLOSE: &str = "close";
}

/// Configuration environment variables
pub mod config {
    pub const ENV_ENDPOINT: &str = "JSONRPC_ENDPOINT";
    pub const ENV_CONNECT_TIMEOUT_MS: &str = "JSONRPC_CONNECT_TIMEOUT_MS";
    pub const ENV_READ_TIMEOUT_MS: &str = "JSONRPC_READ_TIMEOUT_MS";
    pub const ENV_RETRIES: &str = "JSONRPC_RETRIES";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Defaults applied when neither the builder nor the environment set a value
pub mod defaults {
    pub const ENDPOINT: &str = "http://127.0.0.1:8080/";
    pub const CONNECT_TIMEOUT_MS: u64 = 5_000;
    pub const READ_TIMEOUT_MS: u64 = 15_000;
    pub const RETRIES: u32 = 0;
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_FORMAT: &str = "text";
}
