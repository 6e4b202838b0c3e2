//! Body representations shared by options and replies.

use std::fmt;

use bytes::Bytes;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a response body is decoded into [`ReplyData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    Text,
    Json,
    Binary,
}

impl ResponseType {
    /// Infer the representation from response headers.
    ///
    /// `application/json` content types decode as JSON. Octet streams and
    /// attachments decode as binary. Everything else is text.
    #[must_use]
    pub fn infer(headers: &HeaderMap) -> Self {
        let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let disposition = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok());

        if content_type.is_some_and(|ct| starts_with_ignore_case(ct, "application/json")) {
            ResponseType::Json
        } else if content_type
            .is_some_and(|ct| starts_with_ignore_case(ct, "application/octet-stream"))
            || disposition.is_some_and(|cd| starts_with_ignore_case(cd, "attachment"))
        {
            ResponseType::Binary
        } else {
            ResponseType::Text
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseType::Text => "text",
            ResponseType::Json => "json",
            ResponseType::Binary => "binary",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// A decoded response body, or a value supplied by a transform hook.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyData {
    Text(String),
    Json(Value),
    Binary(Bytes),
}

impl ReplyData {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReplyData::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ReplyData::Json(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ReplyData::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub fn response_type(&self) -> ResponseType {
        match self {
            ReplyData::Text(_) => ResponseType::Text,
            ReplyData::Json(_) => ResponseType::Json,
            ReplyData::Binary(_) => ResponseType::Binary,
        }
    }
}

impl From<String> for ReplyData {
    fn from(text: String) -> Self {
        ReplyData::Text(text)
    }
}

impl From<&str> for ReplyData {
    fn from(text: &str) -> Self {
        ReplyData::Text(text.to_owned())
    }
}

impl From<Value> for ReplyData {
    fn from(value: Value) -> Self {
        ReplyData::Json(value)
    }
}

impl From<Bytes> for ReplyData {
    fn from(bytes: Bytes) -> Self {
        ReplyData::Binary(bytes)
    }
}

impl From<Vec<u8>> for ReplyData {
    fn from(bytes: Vec<u8>) -> Self {
        ReplyData::Binary(Bytes::from(bytes))
    }
}
