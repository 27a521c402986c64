//! client::http
//!
//! HTTPS transport implementation.
//!
//! # Design
//!
//! Requests are serialized into the JSON envelope `{query, variables}`
//! and POSTed to the cluster's query endpoint. Authenticated exchanges
//! carry the stored bearer token in the standard authorization header.
//! Non-2xx responses are decoded as the coordinator's structured error
//! body `{category, cause, messages}`; bodies that do not parse fall
//! back to a network-failure error carrying the status line.
//!
//! The transport never retries; retry policy lives server-side.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Certificate, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{Transport, TransportFactory};
use crate::config::Cluster;
use crate::core::errors::{causes, Category, Error};
use crate::core::types::{AuthToken, ClusterUrl};

/// Query endpoint path on the coordinator.
const QUERY_PATH: &str = "/v1/query";

/// The JSON request envelope.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    query: &'a str,
    variables: &'a Value,
}

/// The JSON response body: data on success, errors otherwise.
#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<WireError>,
}

/// A structured error as carried on the wire.
#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    cause: Option<String>,
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    message: Option<String>,
}

impl WireError {
    fn into_error(self) -> Error {
        let category = self
            .category
            .as_deref()
            .map(Category::from_tag)
            .unwrap_or(Category::Internal);
        // Wire cause tags map onto the client's known set; unknown
        // tags degrade to a generic cause rather than failing.
        let cause = match self.cause.as_deref() {
            Some("authentication_failure") => causes::AUTHENTICATION_FAILURE,
            Some("cluster_not_found") => causes::CLUSTER_NOT_FOUND,
            Some("invalid_version") => causes::INVALID_VERSION,
            _ => causes::UNKNOWN,
        };
        let mut messages = self.messages;
        if messages.is_empty() {
            messages.push(self.message.unwrap_or_else(|| "request failed".to_string()));
        }
        let mut err = Error::new(category, cause, messages.remove(0));
        for message in messages {
            err = err.with_message(message);
        }
        err
    }
}

/// HTTPS transport bound to one cluster.
pub struct HttpTransport {
    client: Client,
    url: ClusterUrl,
    token: AuthToken,
}

// Custom Debug to avoid exposing the token.
impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("has_token", &!self.token.is_empty())
            .finish()
    }
}

impl HttpTransport {
    /// Build a transport for a cluster URL.
    ///
    /// `tls_cert` optionally names a PEM file added as an extra root
    /// trust anchor, for clusters running private CAs.
    pub fn new(
        url: ClusterUrl,
        token: AuthToken,
        tls_cert: Option<&Path>,
    ) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(path) = tls_cert {
            let pem = fs::read(path).map_err(|e| {
                Error::internal(
                    causes::IO_FAILURE,
                    format!("failed to read tls cert '{}': {}", path.display(), e),
                )
            })?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                Error::bad_request(
                    causes::INVALID_CONFIG,
                    format!("invalid tls cert '{}': {}", path.display(), e),
                )
            })?;
            builder = builder.add_root_certificate(cert);
        }
        let client = builder
            .build()
            .map_err(|e| Error::internal(causes::NETWORK_FAILURE, e.to_string()))?;
        Ok(Self { client, url, token })
    }

    /// Build a transport from a persisted cluster record.
    pub fn for_cluster(cluster: &Cluster) -> Result<Self, Error> {
        Self::new(
            cluster.url.clone(),
            cluster.auth_token.clone(),
            cluster.tls_cert.as_deref(),
        )
    }

    async fn exchange(&self, query: &str, variables: Value, bearer: Option<&str>) -> Result<Value, Error> {
        let endpoint = format!("{}{}", self.url.as_str(), QUERY_PATH);
        debug!(endpoint = %endpoint, "dispatching query");

        let mut request = self.client.post(&endpoint).json(&Envelope {
            query,
            variables: &variables,
        });
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| {
            Error::internal(
                causes::NETWORK_FAILURE,
                format!("request to {} failed: {}", endpoint, e),
            )
        })?;
        Self::decode(response).await
    }

    async fn decode(response: Response) -> Result<Value, Error> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::decode_failure(status, response).await);
        }

        let body: ResponseBody = response.json().await.map_err(|e| {
            Error::internal(
                causes::NETWORK_FAILURE,
                format!("malformed response body: {}", e),
            )
        })?;
        if let Some(wire) = body.errors.into_iter().next() {
            return Err(wire.into_error());
        }
        Ok(body.data.unwrap_or(Value::Null))
    }

    async fn decode_failure(status: StatusCode, response: Response) -> Error {
        let fallback_category = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Category::Unauthorized,
            StatusCode::NOT_FOUND => Category::NotFound,
            StatusCode::CONFLICT => Category::Conflict,
            s if s.is_client_error() => Category::BadRequest,
            _ => Category::Internal,
        };
        match response.json::<WireError>().await {
            Ok(wire) if wire.category.is_some() || !wire.messages.is_empty() => wire.into_error(),
            _ => Error::new(
                fallback_category,
                causes::NETWORK_FAILURE,
                format!("cluster returned {}", status),
            ),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn raw(&self, query: &str, variables: Value) -> Result<Value, Error> {
        self.exchange(query, variables, None).await
    }

    async fn authenticated(&self, query: &str, variables: Value) -> Result<Value, Error> {
        if self.token.is_empty() {
            return Err(Error::unauthorized(
                causes::AUTHENTICATION_FAILURE,
                "not logged in to this cluster; run 'cape login'",
            ));
        }
        self.exchange(query, variables, Some(self.token.reveal()))
            .await
    }
}

/// Factory producing [`HttpTransport`] instances from cluster records.
#[derive(Debug, Default)]
pub struct HttpTransportFactory;

impl TransportFactory for HttpTransportFactory {
    fn transport(&self, cluster: &Cluster) -> Result<Arc<dyn Transport>, Error> {
        Ok(Arc::new(HttpTransport::for_cluster(cluster)?))
    }
}
