//! Client-wide defaults applied during normalization.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::types::ResponseType;

/// Explicit configuration for a [`Client`](crate::Client).
///
/// Deserializable from any serde format, so it can live in the host's own
/// config file:
///
/// ```
/// let config: request_core::ClientConfig = serde_json::from_str(
///     r#"{ "base_url": "https://jsonplaceholder.typicode.com/",
///          "default_headers": { "accept": "application/json" },
///          "response_type": "json" }"#,
/// ).unwrap();
/// assert!(config.base_url.is_some());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Relative request URLs are joined onto this (RFC 3986 resolution).
    pub base_url: Option<Url>,

    /// Headers sent with every request; request headers override them.
    pub default_headers: BTreeMap<String, Value>,

    /// Response type hint used when a request does not give one.
    pub response_type: Option<ResponseType>,
}

impl ClientConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_gives_defaults() {
        let config: ClientConfig = serde_json::from_value(json!({})).unwrap();
        assert!(config.base_url.is_none());
        assert!(config.default_headers.is_empty());
        assert!(config.response_type.is_none());
    }

    #[test]
    fn invalid_base_url_fails_to_load() {
        let result = serde_json::from_value::<ClientConfig>(json!({"base_url": "not a url"}));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_value::<ClientConfig>(json!({"timeout": 5}));
        assert!(result.is_err());
    }

    #[test]
    fn builder_methods_fill_fields() {
        let config = ClientConfig::default()
            .with_base_url(Url::parse("http://localhost:3000/").unwrap())
            .default_header("accept", "application/json")
            .response_type(ResponseType::Json);
        assert_eq!(config.base_url.unwrap().as_str(), "http://localhost:3000/");
        assert_eq!(config.default_headers["accept"], json!("application/json"));
        assert_eq!(config.response_type, Some(ResponseType::Json));
    }
}
