//! Inbound request descriptor.
//!
//! # Responsibilities
//! - Capture method, URI, headers and buffered body of an inbound request
//! - Carry the request ID assigned by the request-id layer
//! - Hold the mutable host the dispatcher rewrites
//! - Build the outbound request for the chosen endpoint
//!
//! # Design Decisions
//! - Everything except the host passes through unmodified
//! - Upstream requests are always plain HTTP/1.1 to `http://{host}`

use axum::body::{Body, Bytes};
use axum::http::{header, request::Parts, HeaderMap, HeaderValue, Method, Request, Uri, Version};
use thiserror::Error;
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request has no host to forward to")]
    MissingHost,

    #[error("invalid upstream host {host}: {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),
}

/// A request in flight through the router.
#[derive(Debug, Clone)]
pub struct EdgeRequest {
    pub request_id: String,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    host: Option<String>,
}

impl EdgeRequest {
    /// Build a descriptor from request parts and an already buffered body.
    ///
    /// The initial host is the `Host` header, falling back to the URI authority.
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()));

        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            request_id,
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            host,
        }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = Some(host.into());
    }

    /// Outbound request to `http://{host}{path_and_query}`.
    pub fn into_upstream(self) -> Result<Request<Body>, RequestError> {
        let host = self.host.ok_or(RequestError::MissingHost)?;

        let path_and_query = self
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let uri: Uri = format!("http://{}{}", host, path_and_query)
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| RequestError::InvalidHost {
                host: host.clone(),
                reason: e.to_string(),
            })?;

        let host_value = HeaderValue::from_str(&host).map_err(|e| RequestError::InvalidHost {
            host: host.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = self.headers;
        headers.insert(header::HOST, host_value);

        let mut builder = Request::builder()
            .method(self.method)
            .uri(uri)
            .version(Version::HTTP_11);
        if let Some(h) = builder.headers_mut() {
            *h = headers;
        }

        Ok(builder.body(Body::from(self.body))?)
    }
}
