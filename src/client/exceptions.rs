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

//! Remote error code to caller error mapping.
//!
//! Reserved JSON-RPC codes always surface as [`RpcError::JsonRpc`]. Any other
//! code is looked up here; a registered factory turns the remote message into
//! the caller's own error type, surfaced as [`RpcError::Mapped`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::core::errors::{BoxError, RpcError};
use crate::protocol::models::ErrorObject;

type Factory = Arc<dyn Fn(&str) -> Result<BoxError, BoxError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ErrorRegistry {
    factories: HashMap<i32, Factory>,
}

impl fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.factories.keys().collect();
        codes.sort();
        f.debug_struct("ErrorRegistry").field("codes", &codes).finish()
    }
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `code` to `E`, built from the remote error message.
    pub fn register<E>(&mut self, code: i32) -> &mut Self
    where
        E: From<String> + std::error::Error + Send + Sync + 'static,
    {
        self.register_with(code, |message| Ok(Box::new(E::from(message.to_string())) as BoxError))
    }

    /// Maps `code` to a fallible factory. A factory error falls back to
    /// [`RpcError::Domain`].
    pub fn register_with<F>(&mut self, code: i32, factory: F) -> &mut Self
    where
        F: Fn(&str) -> Result<BoxError, BoxError> + Send + Sync + 'static,
    {
        self.factories.insert(code, Arc::new(factory));
        self
    }

    pub fn with<E>(mut self, code: i32) -> Self
    where
        E: From<String> + std::error::Error + Send + Sync + 'static,
    {
        self.register::<E>(code);
        self
    }

    pub fn contains(&self, code: i32) -> bool {
        self.factories.contains_key(&code)
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns a registry holding both sets; `overrides` win on shared codes.
    pub fn merged(&self, overrides: &ErrorRegistry) -> ErrorRegistry {
        let mut factories = self.factories.clone();
        factories.extend(
            overrides
                .factories
                .iter()
                .map(|(code, factory)| (*code, Arc::clone(factory))),
        );
        ErrorRegistry { factories }
    }

    /// Converts a remote error object into the error surfaced to the caller.
    pub fn resolve(&self, error: ErrorObject) -> RpcError {
        if error.is_standard() {
            return RpcError::JsonRpc(error);
        }

        let Some(factory) = self.factories.get(&error.code) else {
            return RpcError::Domain(error);
        };

        match factory(&error.message) {
            Ok(source) => RpcError::Mapped {
                code: error.code,
                message: error.message,
                source,
            },
            Err(e) => {
                warn!(code = error.code, error = %e, "Registered error factory failed, using domain error");
                RpcError::Domain(error)
            }
        }
    }
}
