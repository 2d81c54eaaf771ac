//! Directly generated responses.
//!
//! The router only answers on its own when neither endpoint is usable;
//! everything else is the upstream's response passed through.

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper::ext::ReasonPhrase;

/// Body of the response sent when failover is exhausted.
pub const FAILOVER_EXHAUSTED_BODY: &str = "Nope - generated by Lambda@Edge function.";

/// Reason phrase paired with the 404 status of the exhausted response.
pub const FAILOVER_EXHAUSTED_DESCRIPTION: &str = "Bad Request";

/// A response produced by the router instead of an upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeResponse {
    pub status: StatusCode,
    pub status_description: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl EdgeResponse {
    /// The fixed response for "no usable endpoint".
    pub fn failover_exhausted() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            status_description: FAILOVER_EXHAUSTED_DESCRIPTION.to_string(),
            headers: HeaderMap::new(),
            body: FAILOVER_EXHAUSTED_BODY.to_string(),
        }
    }
}

impl IntoResponse for EdgeResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;

        match ReasonPhrase::try_from(self.status_description) {
            Ok(reason) => {
                response.extensions_mut().insert(reason);
            }
            Err(_) => tracing::warn!("Status description is not a valid reason phrase"),
        }

        response
    }
}
