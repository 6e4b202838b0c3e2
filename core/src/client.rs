//! Client facade over a host transport.
//!
//! # Design
//! `Client` holds only its configuration and the transport, both behind
//! `Arc`, and carries no mutable state between calls. Each call is split
//! into `prepare` (normalize options, may fail before anything is sent) and
//! `send` (run the pipeline). The host owns the actual I/O through the
//! [`Transport`] it passes in.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{OptionsError, RequestError};
use crate::hooks::Forward;
use crate::http::Transport;
use crate::options::{PreparedRequest, RequestOptions};
use crate::pipeline;
use crate::reply::{Reply, ReplyResult};

/// Entry point for issuing requests through a host transport.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(ClientConfig::default(), transport)
    }

    pub fn with_config(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Normalize `options` against this client's configuration.
    ///
    /// # Errors
    ///
    /// Returns `OptionsError` if the request cannot be built.
    pub fn prepare(&self, options: RequestOptions) -> Result<PreparedRequest, OptionsError> {
        options.normalize(&self.config)
    }

    /// Run an already prepared request.
    ///
    /// # Errors
    ///
    /// Returns the error-marked `Reply` when the exchange fails, the body
    /// cannot be decoded, or the status is 400 or above, unless the
    /// request's `on_error` hook resolved it.
    pub async fn send(&self, prepared: PreparedRequest) -> ReplyResult {
        pipeline::execute(self.transport.as_ref(), prepared).await
    }

    /// Normalize and send in one step.
    ///
    /// # Errors
    ///
    /// `RequestError::Options` if the request could not be built,
    /// `RequestError::Failed` with the reply if the pipeline failed.
    pub async fn request(&self, options: RequestOptions) -> Result<Reply, RequestError> {
        let prepared = self.prepare(options)?;
        Ok(self.send(prepared).await?)
    }

    /// Create a named endpoint whose options are produced by `forward`.
    pub fn endpoint<O, F>(&self, forward: F) -> Endpoint<O>
    where
        O: Send + 'static,
        F: Forward<O> + 'static,
    {
        Endpoint {
            client: self.clone(),
            forward: Arc::new(forward),
            _options: PhantomData,
        }
    }
}

/// A request function with its own typed options.
///
/// Calling it resolves the options through the forwarding strategy, then
/// normalizes and sends them through the owning client.
pub struct Endpoint<O: Send + 'static> {
    client: Client,
    forward: Arc<dyn Forward<O>>,
    _options: PhantomData<fn(O)>,
}

impl<O: Send + 'static> Clone for Endpoint<O> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            forward: Arc::clone(&self.forward),
            _options: PhantomData,
        }
    }
}

impl<O: Send + 'static> Endpoint<O> {
    /// # Errors
    ///
    /// Same as [`Client::request`].
    pub async fn call(&self, options: O) -> Result<Reply, RequestError> {
        let options = self.forward.forward(options).await;
        self.client.request(options).await
    }
}
