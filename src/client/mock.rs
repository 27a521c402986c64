//! client::mock
//!
//! Mock transport for deterministic testing.
//!
//! # Design
//!
//! The mock holds an ordered queue of canned responses and a cursor;
//! each exchange consumes exactly one entry, so tests assert both the
//! calls made and their order. An exhausted queue fails with cause
//! `mock_exhausted` so a missing expectation is an immediate, explicit
//! failure rather than a hang or a silent success.
//!
//! # Example
//!
//! ```
//! use cape::client::mock::MockTransport;
//! use cape::client::{send, requests::ListTokens};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new();
//! transport.push_response(json!({"tokens": ["a", "b"]}));
//!
//! let ids = send(&transport, &ListTokens).await.unwrap();
//! assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{Transport, TransportFactory};
use crate::config::Cluster;
use crate::core::errors::{causes, Error};

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct MockExchange {
    pub query: String,
    pub variables: Value,
    pub authenticated: bool,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    responses: VecDeque<Result<Value, Error>>,
    exchanges: Vec<MockExchange>,
}

/// Mock transport with an ordered response queue.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share
/// state so a test can keep a handle while the provider owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    /// Create an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response payload.
    pub fn push_response(&self, data: Value) {
        self.inner.lock().unwrap().responses.push_back(Ok(data));
    }

    /// Queue an error response.
    pub fn push_error(&self, error: Error) {
        self.inner.lock().unwrap().responses.push_back(Err(error));
    }

    /// Snapshot of all exchanges, in call order.
    pub fn exchanges(&self) -> Vec<MockExchange> {
        self.inner.lock().unwrap().exchanges.clone()
    }

    /// Number of canned responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.inner.lock().unwrap().responses.len()
    }

    fn consume(&self, query: &str, variables: Value, authenticated: bool) -> Result<Value, Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.exchanges.push(MockExchange {
            query: query.to_string(),
            variables,
            authenticated,
        });
        inner.responses.pop_front().unwrap_or_else(|| {
            Err(Error::internal(
                causes::MOCK_EXHAUSTED,
                format!("no canned response for query '{}'", query),
            ))
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn raw(&self, query: &str, variables: Value) -> Result<Value, Error> {
        self.consume(query, variables, false)
    }

    async fn authenticated(&self, query: &str, variables: Value) -> Result<Value, Error> {
        self.consume(query, variables, true)
    }
}

impl TransportFactory for MockTransport {
    fn transport(&self, _cluster: &Cluster) -> Result<Arc<dyn Transport>, Error> {
        Ok(Arc::new(self.clone()))
    }
}
