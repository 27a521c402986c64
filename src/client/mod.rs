//! client
//!
//! Client transport port for talking to a coordinator cluster.
//!
//! # Design
//!
//! The [`Transport`] trait is async because every exchange is a network
//! round-trip. A transport exposes exactly two operations: `raw` and
//! `authenticated`; the authenticated variant attaches the stored
//! bearer token. Typed requests implement [`Request`] and go through
//! [`send`], which wraps the query in the JSON envelope and
//! deserializes the named response field into the request's output
//! type.
//!
//! Handlers observe responses strictly in call order; the
//! [`mock::MockTransport`] enforces this with an ordered queue.
//!
//! # Example
//!
//! ```ignore
//! use cape::client::{send, requests::ListTokens};
//!
//! let ids = send(transport.as_ref(), &ListTokens).await?;
//! ```

pub mod http;
pub mod mock;
pub mod requests;

pub use http::{HttpTransport, HttpTransportFactory};

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Cluster;
use crate::core::errors::{causes, Error};

/// A typed exchange with the coordinator.
///
/// `QUERY` is the GraphQL-style query document, `FIELD` the top-level
/// response field holding the payload, and `AUTHENTICATED` whether the
/// exchange carries the bearer token.
pub trait Request: Send + Sync {
    /// Deserialized payload type.
    type Output: DeserializeOwned;

    /// Query document sent in the envelope.
    const QUERY: &'static str;

    /// Top-level response field to extract.
    const FIELD: &'static str;

    /// Whether the bearer token is attached. Defaults to true.
    const AUTHENTICATED: bool = true;

    /// Variables for the envelope.
    fn variables(&self) -> Value;
}

/// The transport capability surface.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an unauthenticated exchange and return the response data.
    async fn raw(&self, query: &str, variables: Value) -> Result<Value, Error>;

    /// Send an exchange carrying the stored bearer token.
    async fn authenticated(&self, query: &str, variables: Value) -> Result<Value, Error>;
}

/// Send a typed request through a transport.
///
/// Dispatches via `raw` or `authenticated` per the request, extracts
/// the request's response field, and deserializes it.
pub async fn send<R: Request>(transport: &dyn Transport, request: &R) -> Result<R::Output, Error> {
    let data = if R::AUTHENTICATED {
        transport.authenticated(R::QUERY, request.variables()).await?
    } else {
        transport.raw(R::QUERY, request.variables()).await?
    };
    let field = data.get(R::FIELD).cloned().unwrap_or(Value::Null);
    serde_json::from_value(field).map_err(|e| {
        Error::internal(
            causes::NETWORK_FAILURE,
            format!("malformed response for field '{}': {}", R::FIELD, e),
        )
    })
}

/// Builds a transport bound to a cluster record.
///
/// The factory is the only place the stored token leaves the config.
pub trait TransportFactory: Send + Sync {
    fn transport(&self, cluster: &Cluster) -> Result<Arc<dyn Transport>, Error>;
}
