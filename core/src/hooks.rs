//! Caller-supplied strategies plugged into the pipeline.
//!
//! Each hook is a single-method trait with a blanket impl for closures, so
//! a plain closure works and a wrapper type (logging, metrics) can be
//! substituted without touching the pipeline.

use std::future::Future;

use async_trait::async_trait;

use crate::options::RequestOptions;
use crate::reply::Reply;
use crate::types::ReplyData;

/// Reshape the reply body after extraction.
///
/// Runs exactly once per invocation, on success and on error. Returning
/// `None` leaves `data` untouched.
pub trait TransformData: Send + Sync {
    fn transform(&self, reply: &Reply) -> Option<ReplyData>;
}

impl<F> TransformData for F
where
    F: Fn(&Reply) -> Option<ReplyData> + Send + Sync,
{
    fn transform(&self, reply: &Reply) -> Option<ReplyData> {
        self(reply)
    }
}

/// Recover from a failed invocation.
///
/// Receives the error-marked reply. Whatever it returns becomes the
/// successful result of the call.
#[async_trait]
pub trait OnError: Send + Sync {
    async fn on_error(&self, reply: Reply) -> Reply;
}

#[async_trait]
impl<F, Fut> OnError for F
where
    F: Fn(Reply) -> Fut + Send + Sync,
    Fut: Future<Output = Reply> + Send + 'static,
{
    async fn on_error(&self, reply: Reply) -> Reply {
        self(reply).await
    }
}

/// Logs the failure at `warn` before handing it to the wrapped handler.
#[derive(Debug, Clone)]
pub struct LoggedOnError<H> {
    inner: H,
}

impl<H> LoggedOnError<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: OnError> OnError for LoggedOnError<H> {
    async fn on_error(&self, reply: Reply) -> Reply {
        tracing::warn!(
            method = %reply.request.method,
            url = %reply.request.url,
            status = reply.status,
            error = ?reply.error,
            "request failed, handing reply to error handler"
        );
        self.inner.on_error(reply).await
    }
}

/// Resolve endpoint-specific options into concrete `RequestOptions`.
///
/// This is where a named endpoint fills in its path, fixed headers or a
/// response type, and where it can suspend first (refreshing a token, for
/// instance).
#[async_trait]
pub trait Forward<O: Send + 'static>: Send + Sync {
    async fn forward(&self, options: O) -> RequestOptions;
}

#[async_trait]
impl<O, F, Fut> Forward<O> for F
where
    O: Send + 'static,
    F: Fn(O) -> Fut + Send + Sync,
    Fut: Future<Output = RequestOptions> + Send + 'static,
{
    async fn forward(&self, options: O) -> RequestOptions {
        self(options).await
    }
}
