//! Error types raised outside the reply envelope.
//!
//! # Design
//! Failures that happen before the exchange starts (bad URL, unusable
//! header) surface as `OptionsError` and never reach the `on_error` hook.
//! Everything after that point is a [`Reply`] carrying a
//! [`ReplyError`](crate::reply::ReplyError). `RequestError` joins the two
//! for callers that want a single `?`.

use thiserror::Error;

use crate::reply::Reply;

/// The options could not be turned into an outbound request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OptionsError {
    /// The URL is malformed, or relative with no base URL configured
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header name '{name}': {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },

    #[error("invalid value for header '{name}': {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    /// Request data could not be serialized to JSON
    #[error("failed to serialize request data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything `Client::request` can fail with.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// The pipeline ran and produced an error reply
    #[error(transparent)]
    Failed(Box<Reply>),
}

impl RequestError {
    /// The failed reply, if the request got as far as the pipeline.
    #[must_use]
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            RequestError::Failed(reply) => Some(reply),
            RequestError::Options(_) => None,
        }
    }

    #[must_use]
    pub fn into_reply(self) -> Option<Reply> {
        match self {
            RequestError::Failed(reply) => Some(*reply),
            RequestError::Options(_) => None,
        }
    }
}

impl From<Reply> for RequestError {
    fn from(reply: Reply) -> Self {
        RequestError::Failed(Box::new(reply))
    }
}
