//! Options normalizer: loosely typed request options to an `HttpRequest`.
//!
//! # Design
//! Callers describe a request with JSON-like values for query parameters
//! and headers, the way a dynamic client would. Normalization is the only
//! place those values are coerced to wire strings, and the only place a
//! request can be rejected before it is sent.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::OptionsError;
use crate::hooks::{OnError, TransformData};
use crate::http::HttpRequest;
use crate::types::ResponseType;

/// Caller-facing description of one request.
///
/// `params` and `headers` keep insertion order and behave as maps: setting
/// a key again replaces its value. Values that cannot be expressed on the
/// wire (null, objects) are dropped during normalization rather than
/// rejected.
#[derive(Clone)]
pub struct RequestOptions {
    pub url: String,
    pub method: Method,
    pub params: Vec<(String, Value)>,
    pub headers: Vec<(String, Value)>,
    /// Serialized as a JSON body when it is an object or array and no
    /// explicit `body` is set.
    pub data: Option<Value>,
    pub body: Option<Bytes>,
    pub response_type: Option<ResponseType>,
    pub transform_data: Option<Arc<dyn TransformData>>,
    pub on_error: Option<Arc<dyn OnError>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            url: "/".to_owned(),
            method: Method::GET,
            params: Vec::new(),
            headers: Vec::new(),
            data: None,
            body: None,
            response_type: None,
            transform_data: None,
            on_error: None,
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .field("body", &self.body)
            .field("response_type", &self.response_type)
            .field("transform_data", &self.transform_data.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl RequestOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        upsert(&mut self.params, key.into(), value.into(), same_key);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        upsert(&mut self.headers, name.into(), value.into(), str::eq_ignore_ascii_case);
        self
    }

    #[must_use]
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    #[must_use]
    pub fn transform_data(mut self, transform: impl TransformData + 'static) -> Self {
        self.transform_data = Some(Arc::new(transform));
        self
    }

    #[must_use]
    pub fn on_error(mut self, handler: impl OnError + 'static) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Resolve these options against `config` into a sendable request.
    ///
    /// # Errors
    ///
    /// Returns `OptionsError` if the URL cannot be parsed, a header cannot
    /// be represented on the wire, or `data` fails to serialize.
    pub fn normalize(mut self, config: &ClientConfig) -> Result<PreparedRequest, OptionsError> {
        let mut url = resolve_url(&self.url, config.base_url.as_ref())?;

        let mut merged: Vec<(String, Value)> = Vec::new();
        for (key, value) in url.query_pairs() {
            upsert(&mut merged, key.into_owned(), Value::String(value.into_owned()), same_key);
        }
        for (key, value) in &self.params {
            upsert(&mut merged, key.clone(), value.clone(), same_key);
        }

        let pairs = search_params(&merged);
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(&pairs);
        }

        let mut body = self.body.clone();
        let mut json_body = false;
        if body.as_ref().map_or(true, Bytes::is_empty) {
            if let Some(data @ (Value::Object(_) | Value::Array(_))) = &self.data {
                body = Some(Bytes::from(serde_json::to_vec(data)?));
                json_body = true;
            }
        }

        let defaults = config
            .default_headers
            .iter()
            .map(|(name, value)| (name.as_str(), value));
        let explicit = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str(), value));
        let mut headers = create_headers(defaults.chain(explicit))?;
        if json_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if self.response_type.is_none() {
            self.response_type = config.response_type;
        }

        let request = HttpRequest {
            method: self.method.clone(),
            url,
            headers,
            body,
        };

        Ok(PreparedRequest {
            request,
            options: self,
        })
    }
}

/// Output of normalization: the wire request plus the options that
/// produced it, which still carry the hooks and the response type hint.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub request: HttpRequest,
    pub options: RequestOptions,
}

fn resolve_url(raw: &str, base: Option<&Url>) -> Result<Url, OptionsError> {
    let parsed = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    };
    parsed.map_err(|source| OptionsError::InvalidUrl {
        url: raw.to_owned(),
        source,
    })
}

fn same_key(a: &str, b: &str) -> bool {
    a == b
}

fn upsert(
    entries: &mut Vec<(String, Value)>,
    key: String,
    value: Value,
    same: fn(&str, &str) -> bool,
) {
    match entries.iter_mut().find(|(existing, _)| same(existing, &key)) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

/// Render query parameters as wire strings.
///
/// Scalars are stringified, arrays are joined with `,`. Keys whose value is
/// null, an object, or an array containing an object are left out.
#[must_use]
pub fn search_params(params: &[(String, Value)]) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| param_string(value).map(|value| (key.clone(), value)))
        .collect()
}

fn param_string(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => join_items(items),
        other => scalar_string(other),
    }
}

fn join_items(items: &[Value]) -> Option<String> {
    let parts = items
        .iter()
        .map(|item| match item {
            Value::Null => Some(String::new()),
            Value::Array(inner) => join_items(inner),
            other => scalar_string(other),
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join(","))
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_string(n)),
        Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_owned()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integral floats print without a fractional part (`2.0` as `2`).
fn number_string(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_owned(),
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

/// Coerce loosely typed header values into a `HeaderMap`.
///
/// Strings, numbers and booleans are kept; any other value is skipped.
/// Later entries replace earlier ones with the same (case-insensitive) name.
///
/// # Errors
///
/// Returns `OptionsError` if a kept name or value is not valid on the wire.
pub fn create_headers<'a, I>(headers: I) -> Result<HeaderMap, OptionsError>
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let Some(value) = scalar_string(value) else {
            continue;
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
                OptionsError::InvalidHeaderName {
                    name: name.to_owned(),
                    source,
                }
            })?;
        let header_value =
            HeaderValue::from_str(&value).map_err(|source| OptionsError::InvalidHeaderValue {
                name: name.to_owned(),
                source,
            })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(options: RequestOptions) -> PreparedRequest {
        options.normalize(&ClientConfig::default()).unwrap()
    }

    fn query(prepared: &PreparedRequest) -> Vec<(String, String)> {
        prepared
            .request
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn explicit_params_win_over_url_query() {
        let prepared = normalize(
            RequestOptions::new("https://api.example.com/todos?page=1&sort=asc").param("page", 2),
        );
        assert_eq!(
            query(&prepared),
            vec![
                ("page".to_owned(), "2".to_owned()),
                ("sort".to_owned(), "asc".to_owned()),
            ]
        );
    }

    #[test]
    fn array_params_are_comma_joined() {
        let prepared =
            normalize(RequestOptions::new("https://api.example.com/").param("tags", json!(["a", "b"])));
        assert_eq!(query(&prepared), vec![("tags".to_owned(), "a,b".to_owned())]);
        assert_eq!(prepared.request.url.query(), Some("tags=a%2Cb"));
    }

    #[test]
    fn unsupported_param_drops_key_from_url_too() {
        let prepared = normalize(
            RequestOptions::new("https://api.example.com/?filter=old&keep=1")
                .param("filter", Value::Null)
                .param("nested", json!({"a": 1})),
        );
        assert_eq!(query(&prepared), vec![("keep".to_owned(), "1".to_owned())]);
    }

    #[test]
    fn empty_param_set_removes_query() {
        let prepared = normalize(
            RequestOptions::new("https://api.example.com/path?gone=1").param("gone", Value::Null),
        );
        assert_eq!(prepared.request.url.as_str(), "https://api.example.com/path");
    }

    #[test]
    fn repeated_url_key_keeps_last_value() {
        let prepared = normalize(RequestOptions::new("https://api.example.com/?a=1&a=2"));
        assert_eq!(query(&prepared), vec![("a".to_owned(), "2".to_owned())]);
    }

    #[test]
    fn array_with_nulls_and_nesting() {
        let params = vec![
            ("ids".to_owned(), json!([1, null, [2, 3]])),
            ("mixed".to_owned(), json!([1, {"x": 1}])),
            ("flag".to_owned(), json!(true)),
        ];
        assert_eq!(
            search_params(&params),
            vec![
                ("ids".to_owned(), "1,,2,3".to_owned()),
                ("flag".to_owned(), "true".to_owned()),
            ]
        );
    }

    #[test]
    fn headers_are_coerced_or_omitted() {
        let prepared = normalize(
            RequestOptions::new("https://api.example.com/")
                .header("x-count", 42)
                .header("x-debug", false)
                .header("x-name", "todo")
                .header("x-none", Value::Null)
                .header("x-list", json!(["a"])),
        );
        let headers = &prepared.request.headers;
        assert_eq!(headers["x-count"], "42");
        assert_eq!(headers["x-debug"], "false");
        assert_eq!(headers["x-name"], "todo");
        assert!(headers.get("x-none").is_none());
        assert!(headers.get("x-list").is_none());
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn header_names_replace_case_insensitively() {
        let options = RequestOptions::new("https://api.example.com/")
            .header("Accept", "text/plain")
            .header("accept", "application/json");
        assert_eq!(options.headers.len(), 1);
        let prepared = normalize(options);
        assert_eq!(prepared.request.headers["accept"], "application/json");
    }

    #[test]
    fn object_data_becomes_json_body() {
        let data = json!({"title": "Buy milk", "completed": false});
        let prepared = normalize(
            RequestOptions::new("https://api.example.com/todos")
                .method(Method::POST)
                .header("Content-Type", "text/plain")
                .data(data.clone()),
        );
        let body = prepared.request.body.as_ref().unwrap();
        let sent: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(sent, data);
        assert_eq!(prepared.request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(prepared.request.method, Method::POST);
    }

    #[test]
    fn explicit_body_ignores_data() {
        let prepared = normalize(
            RequestOptions::new("https://api.example.com/upload")
                .body("raw bytes")
                .data(json!({"ignored": true})),
        );
        assert_eq!(prepared.request.body.as_deref(), Some(&b"raw bytes"[..]));
        assert!(prepared.request.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn empty_body_does_not_block_data() {
        let prepared = normalize(
            RequestOptions::new("https://api.example.com/todos")
                .body("")
                .data(json!({"a": 1})),
        );
        let sent: Value = serde_json::from_slice(prepared.request.body.as_ref().unwrap()).unwrap();
        assert_eq!(sent, json!({"a": 1}));
        assert_eq!(prepared.request.headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn integral_floats_drop_the_fraction() {
        let prepared = normalize(
            RequestOptions::new("https://api.example.com/")
                .param("n", 1.0)
                .param("ratio", 0.5)
                .param("zero", -0.0)
                .header("x-n", 2.0),
        );
        assert_eq!(
            query(&prepared),
            vec![
                ("n".to_owned(), "1".to_owned()),
                ("ratio".to_owned(), "0.5".to_owned()),
                ("zero".to_owned(), "0".to_owned()),
            ]
        );
        assert_eq!(prepared.request.headers["x-n"], "2");
    }

    #[test]
    fn scalar_data_is_not_sent() {
        let prepared =
            normalize(RequestOptions::new("https://api.example.com/").data("just a string"));
        assert!(prepared.request.body.is_none());
    }

    #[test]
    fn default_url_without_base_is_rejected() {
        let err = RequestOptions::default()
            .normalize(&ClientConfig::default())
            .unwrap_err();
        assert!(matches!(err, OptionsError::InvalidUrl { ref url, .. } if url == "/"));
    }

    #[test]
    fn malformed_url_is_rejected() {
        let err = RequestOptions::new("http://[::1")
            .normalize(&ClientConfig::default())
            .unwrap_err();
        assert!(matches!(err, OptionsError::InvalidUrl { .. }));
    }

    #[test]
    fn invalid_header_value_is_rejected() {
        let err = RequestOptions::new("https://api.example.com/")
            .header("x-bad", "line\nbreak")
            .normalize(&ClientConfig::default())
            .unwrap_err();
        assert!(matches!(err, OptionsError::InvalidHeaderValue { ref name, .. } if name == "x-bad"));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let err = RequestOptions::new("https://api.example.com/")
            .header("bad header", "v")
            .normalize(&ClientConfig::default())
            .unwrap_err();
        assert!(matches!(err, OptionsError::InvalidHeaderName { .. }));
    }

    #[test]
    fn config_supplies_base_url_defaults_and_hint() {
        let config: ClientConfig = serde_json::from_value(json!({
            "base_url": "https://jsonplaceholder.typicode.com/",
            "default_headers": {"accept": "application/json", "x-client": "core"},
            "response_type": "json"
        }))
        .unwrap();

        let prepared = RequestOptions::new("todos/3")
            .header("X-Client", "override")
            .normalize(&config)
            .unwrap();

        assert_eq!(
            prepared.request.url.as_str(),
            "https://jsonplaceholder.typicode.com/todos/3"
        );
        assert_eq!(prepared.request.headers["accept"], "application/json");
        assert_eq!(prepared.request.headers["x-client"], "override");
        assert_eq!(prepared.options.response_type, Some(ResponseType::Json));
    }

    #[test]
    fn explicit_hint_beats_config_hint() {
        let config = ClientConfig {
            response_type: Some(ResponseType::Json),
            ..ClientConfig::default()
        };
        let prepared = RequestOptions::new("https://api.example.com/")
            .response_type(ResponseType::Binary)
            .normalize(&config)
            .unwrap();
        assert_eq!(prepared.options.response_type, Some(ResponseType::Binary));
    }
}
