//! The reply envelope returned on success and on failure.
//!
//! # Design
//! A failed invocation is `Err(Reply)`, not a separate error type: callers
//! get the status, headers and whatever body was decoded on both paths.
//! `Reply` implements `std::error::Error` so it composes with `?` and
//! error-reporting crates.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use http::HeaderMap;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse, TransportError};
use crate::options::RequestOptions;
use crate::types::{ReplyData, ResponseType};

/// Why an invocation ended up on the error path.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ReplyError {
    /// No response was received
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body was declared or inferred as JSON but did not parse
    #[error("response body is not valid JSON: {0}")]
    Json(#[source] Arc<serde_json::Error>),

    /// A text body was not valid UTF-8
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The body decoded fine but the status is 400 or above
    #[error("server responded with status {0}")]
    Status(u16),
}

impl ReplyError {
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, ReplyError::Transport(_))
    }

    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, ReplyError::Json(_) | ReplyError::Utf8(_))
    }

    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, ReplyError::Status(_))
    }
}

impl From<serde_json::Error> for ReplyError {
    fn from(err: serde_json::Error) -> Self {
        ReplyError::Json(Arc::new(err))
    }
}

/// Result of one invocation of the pipeline.
pub type ReplyResult = Result<Reply, Reply>;

/// Normalized view of one exchange.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Decoded body, or whatever a transform put there
    pub data: Option<ReplyData>,
    pub error: Option<ReplyError>,
    pub request: HttpRequest,
    /// `None` when the exchange itself failed
    pub response: Option<HttpResponse>,
    pub response_type: ResponseType,
    /// Response headers with lower-case names; repeated headers are joined
    /// with `", "`.
    pub headers: BTreeMap<String, String>,
    /// `0` when no response was received
    pub status: u16,
    pub options: RequestOptions,
}

impl Reply {
    pub(crate) fn new(request: HttpRequest, options: RequestOptions) -> Self {
        Self {
            data: None,
            error: None,
            request,
            response: None,
            response_type: options.response_type.unwrap_or_default(),
            headers: BTreeMap::new(),
            status: 0,
            options,
        }
    }

    /// A response was received, whatever its status.
    #[must_use]
    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }

    /// The request never got a response.
    #[must_use]
    pub fn is_request_error(&self) -> bool {
        self.response.is_none() && self.error.is_some()
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Deserialize `data` into a caller type.
    ///
    /// JSON values convert directly, text and binary bodies are parsed as
    /// JSON, and a missing body is treated as `null`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the data does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.data {
            Some(ReplyData::Json(value)) => T::deserialize(value),
            Some(ReplyData::Text(text)) => serde_json::from_str(text),
            Some(ReplyData::Binary(bytes)) => serde_json::from_slice(bytes),
            None => serde_json::from_value(serde_json::Value::Null),
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.request.method, self.request.url)?;
        match &self.error {
            Some(err) => write!(f, " failed: {err}"),
            None => write!(f, " -> {}", self.status),
        }
    }
}

impl std::error::Error for Reply {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Flatten response headers into a name → value map.
pub(crate) fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        map.entry(name.as_str().to_owned())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    map
}
