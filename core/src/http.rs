//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! The pipeline never opens a socket. It hands an `HttpRequest` to a
//! host-provided [`Transport`] and receives a fully buffered `HttpResponse`
//! back. Hosts plug in whatever client they already run (ureq, reqwest,
//! hyper, a browser bridge) by implementing one async method.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

/// An outbound HTTP request described as plain data.
///
/// Built by the options normalizer. The transport executes it and returns
/// the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// An HTTP response described as plain data.
///
/// The body is delivered already buffered; the pipeline decodes it
/// according to the resolved response type.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Classification of transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    /// Connection refused, reset or unreachable network
    Connect,
    /// Host name could not be resolved
    Dns,
    /// The host gave up waiting for the peer
    Timeout,
    /// The exchange was cancelled before completing
    Aborted,
    /// Reading or writing the stream failed mid-exchange
    Io,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "connection failed",
            TransportErrorKind::Dns => "dns lookup failed",
            TransportErrorKind::Timeout => "timed out",
            TransportErrorKind::Aborted => "aborted",
            TransportErrorKind::Io => "i/o error",
            TransportErrorKind::Other => "transport error",
        };
        f.write_str(name)
    }
}

/// The exchange could not complete; no response was received.
///
/// The host's own error is kept as the source so callers can downcast it.
#[derive(Debug, Clone)]
pub struct TransportError {
    kind: TransportErrorKind,
    source: Arc<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.source)
    }
}

// `Arc<E>` forwards `source()` to the inner error's source, so the host
// error itself has to be handed out here.
impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl TransportError {
    pub fn new(
        kind: TransportErrorKind,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            source: Arc::from(source.into()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }
}

/// The host-provided exchange primitive.
///
/// Implementations perform exactly one request/response round-trip. Any
/// status code is a successful exchange; only failures to obtain a response
/// at all are reported as `TransportError`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn exchange(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn exchange(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).exchange(request).await
    }
}
