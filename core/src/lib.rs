//! Request/reply pipeline over a host-provided HTTP transport.
//!
//! # Overview
//! Callers describe a request with loosely typed options (URL, query
//! params, headers, body data, response type hint, hooks). The crate
//! normalizes them into an `HttpRequest`, hands it to the host's
//! [`Transport`], and turns the response into a [`Reply`]: decoded body,
//! status, headers and error information in one envelope.
//!
//! # Design
//! - The core never performs I/O itself (host-does-IO pattern); hosts
//!   implement [`Transport`] over whatever HTTP client they run.
//! - Failures are `Err(Reply)`, the same shape as success, so status and
//!   partial data are always available.
//! - `transform_data` and `on_error` hooks are strategy traits with
//!   blanket impls for closures.
//! - Exactly one exchange per call: no retries, caching or pooling.
//!
//! # Example
//!
//! ```ignore
//! let client = Client::with_config(config, MyTransport::new());
//! let reply = client
//!     .request(RequestOptions::new("todos/3").param("expand", "user"))
//!     .await?;
//! let todo: Todo = reply.json()?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod hooks;
pub mod http;
pub mod options;
pub mod pipeline;
pub mod reply;
pub mod types;

pub use client::{Client, Endpoint};
pub use config::ClientConfig;
pub use error::{OptionsError, RequestError};
pub use hooks::{Forward, LoggedOnError, OnError, TransformData};
pub use crate::http::{HttpRequest, HttpResponse, Transport, TransportError, TransportErrorKind};
pub use options::{PreparedRequest, RequestOptions};
pub use reply::{Reply, ReplyError, ReplyResult};
pub use types::{ReplyData, ResponseType};
