//! Reply pipeline: one exchange, body extraction and the hook protocol.
//!
//! # Design
//! The flow is strictly linear: exchange, classify, extract, status check,
//! transform. Every failure goes through [`fail`], which runs the
//! transform once and then either hands the reply to `on_error` or returns
//! it as `Err`. Nothing here retries.

use std::sync::Arc;

use bytes::Bytes;
use tracing::Instrument;

use crate::hooks::{OnError, TransformData};
use crate::http::Transport;
use crate::options::PreparedRequest;
use crate::reply::{collect_headers, Reply, ReplyError, ReplyResult};
use crate::types::{ReplyData, ResponseType};

/// Run one prepared request through `transport`.
///
/// Returns `Ok` on success or when an `on_error` hook resolved a failure,
/// `Err` with the error-marked reply otherwise.
pub async fn execute<T>(transport: &T, prepared: PreparedRequest) -> ReplyResult
where
    T: Transport + ?Sized,
{
    let span = tracing::debug_span!(
        "request",
        method = %prepared.request.method,
        url = %prepared.request.url,
    );
    run(transport, prepared).instrument(span).await
}

async fn run<T>(transport: &T, prepared: PreparedRequest) -> ReplyResult
where
    T: Transport + ?Sized,
{
    let PreparedRequest { request, options } = prepared;
    let hint = options.response_type;
    let transform = options.transform_data.clone();
    let on_error = options.on_error.clone();
    let mut reply = Reply::new(request, options);

    tracing::debug!("sending request");
    let response = match transport.exchange(&reply.request).await {
        Ok(response) => response,
        Err(err) => return fail(reply, err.into(), transform, on_error).await,
    };

    reply.headers = collect_headers(&response.headers);
    reply.status = response.status;
    if hint.is_none() {
        reply.response_type = ResponseType::infer(&response.headers);
    }
    let body = response.body.clone();
    reply.response = Some(response);
    tracing::debug!(
        status = reply.status,
        response_type = %reply.response_type,
        "response received"
    );

    match decode(reply.response_type, body) {
        Ok(data) => reply.data = Some(data),
        Err(err) => return fail(reply, err, transform, on_error).await,
    }

    if reply.status >= 400 {
        let status = reply.status;
        return fail(reply, ReplyError::Status(status), transform, on_error).await;
    }

    apply_transform(&mut reply, transform.as_deref());
    Ok(reply)
}

/// Decode a buffered body into the requested representation.
///
/// # Errors
///
/// Returns `ReplyError::Json` or `ReplyError::Utf8` when the body does not
/// match the representation.
pub fn decode(response_type: ResponseType, body: Bytes) -> Result<ReplyData, ReplyError> {
    match response_type {
        ResponseType::Text => Ok(ReplyData::Text(std::str::from_utf8(&body)?.to_owned())),
        ResponseType::Json => Ok(ReplyData::Json(serde_json::from_slice(&body)?)),
        ResponseType::Binary => Ok(ReplyData::Binary(body)),
    }
}

fn apply_transform(reply: &mut Reply, transform: Option<&dyn TransformData>) {
    if let Some(transform) = transform {
        if let Some(data) = transform.transform(reply) {
            reply.data = Some(data);
        }
    }
}

async fn fail(
    mut reply: Reply,
    error: ReplyError,
    transform: Option<Arc<dyn TransformData>>,
    on_error: Option<Arc<dyn OnError>>,
) -> ReplyResult {
    tracing::warn!(status = reply.status, error = %error, "request failed");
    reply.error = Some(error);
    apply_transform(&mut reply, transform.as_deref());

    match on_error {
        Some(handler) => Ok(handler.on_error(reply).await),
        None => Err(reply),
    }
}
