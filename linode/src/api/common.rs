//! Common types and utilities for the Linode API

use recordmap::Arguments;
use serde::Deserialize;
use serde_json::Value;

/// ERRORCODE the service reports for a rejected API key
pub const AUTH_FAILED_CODE: i64 = 4;

/// Response envelope shared by every API action
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "ERRORARRAY", default)]
    pub errors: Vec<ApiErrorEntry>,
    #[serde(rename = "ACTION", default)]
    pub action: String,
    #[serde(rename = "DATA", default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ApiErrorEntry {
    #[serde(rename = "ERRORCODE")]
    pub code: i64,
    #[serde(rename = "ERRORMESSAGE")]
    pub message: String,
}

/// Form parameters for a single API action
#[derive(Debug, Clone, Default)]
pub struct ApiParams {
    params: Vec<(String, String)>,
}

impl ApiParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    /// Add every argument, rendering values the way the service expects.
    /// Null arguments are omitted.
    pub fn extend_arguments(self, arguments: &Arguments) -> Self {
        arguments.iter().fold(self, |params, (key, value)| {
            params.add_optional(key.as_str(), encode_value(value))
        })
    }

    pub fn as_form(&self) -> &[(String, String)] {
        &self.params
    }

    /// Parameters rendered for logs, with the API key masked
    pub fn redacted(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case("api_key") {
                    format!("{}=***", k)
                } else {
                    format!("{}={}", k, v)
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

pub fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
