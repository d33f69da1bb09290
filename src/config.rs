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

use crate::core::constants::{config, defaults};
use crate::core::errors::RpcError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub retries: u32,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, RpcError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RpcError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        Ok(Self {
            endpoint: lookup(config::ENV_ENDPOINT).unwrap_or(base.endpoint),
            connect_timeout_ms: parse_or(&lookup, config::ENV_CONNECT_TIMEOUT_MS, base.connect_timeout_ms)?,
            read_timeout_ms: parse_or(&lookup, config::ENV_READ_TIMEOUT_MS, base.read_timeout_ms)?,
            retries: parse_or(&lookup, config::ENV_RETRIES, base.retries)?,
            log_level: lookup(config::ENV_LOG_LEVEL).unwrap_or(base.log_level),
            log_format: lookup(config::ENV_LOG_FORMAT)
                .map(|f| f.to_lowercase())
                .unwrap_or(base.log_format),
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, fallback: T) -> Result<T, RpcError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(fallback),
        Some(raw) => raw.trim().parse().map_err(|e| {
            RpcError::Configuration(format!("{} has invalid value '{}': {}", key, raw, e))
        }),
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::ENDPOINT.to_string(),
            connect_timeout_ms: defaults::CONNECT_TIMEOUT_MS,
            read_timeout_ms: defaults::READ_TIMEOUT_MS,
            retries: defaults::RETRIES,
            log_level: defaults::LOG_LEVEL.to_string(),
            log_format: defaults::LOG_FORMAT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.read_timeout(), Duration::from_millis(defaults::READ_TIMEOUT_MS));
    }

    #[test]
    fn test_values_from_lookup() {
        let cfg = ClientConfig::from_lookup(lookup_from(&[
            (config::ENV_ENDPOINT, "http://rpc.internal:9000/api"),
            (config::ENV_CONNECT_TIMEOUT_MS, "250"),
            (config::ENV_READ_TIMEOUT_MS, " 1000 "),
            (config::ENV_RETRIES, "3"),
            (config::ENV_LOG_FORMAT, "JSON"),
        ]))
        .unwrap();

        assert_eq!(cfg.endpoint, "http://rpc.internal:9000/api");
        assert_eq!(cfg.connect_timeout(), Duration::from_millis(250));
        assert_eq!(cfg.read_timeout_ms, 1000);
        assert_eq!(cfg.retries, 3);
        assert_eq!(cfg.log_format, "json");
        assert_eq!(cfg.log_level, defaults::LOG_LEVEL);
    }

    #[test]
    fn test_invalid_number_is_configuration_error() {
        let err = ClientConfig::from_lookup(lookup_from(&[(config::ENV_RETRIES, "many")]))
            .unwrap_err();
        match err {
            RpcError::Configuration(msg) => assert!(msg.contains(config::ENV_RETRIES)),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_partial_config() {
        let cfg: ClientConfig = serde_json::from_str(r#"{"retries":2}"#).unwrap();
        assert_eq!(cfg.retries, 2);
        assert_eq!(cfg.endpoint, defaults::ENDPOINT);
    }
}
