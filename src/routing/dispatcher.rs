//! Primary/secondary failover decision.
//!
//! # Flow
//! ```text
//! query primary ──ok──▶ evaluate ──healthy──▶ Forward(host = primary)
//!      │ err                 │ unhealthy
//!      ▼                     ▼
//! query secondary ─ok─▶ evaluate ──healthy──▶ Forward(host = secondary)
//!      │ err                 │ unhealthy
//!      ▼                     ▼
//!             Respond(404 failover exhausted)
//! ```
//!
//! # Design Decisions
//! - Each endpoint is queried at most once per request, strictly in order
//! - A broken status query and an unhealthy verdict take the same path
//! - No state survives between calls; the same health answers give the same decision
//! - The dispatcher only decides; forwarding is done by the HTTP layer

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::config::FailoverConfig;
use crate::health::{evaluate, HealthCheckSource, HealthError, QueryError, Tally};
use crate::http::request::EdgeRequest;
use crate::http::response::EdgeResponse;
use crate::observability::metrics;
use crate::routing::endpoint::{Endpoint, EndpointRole};

/// What to do with a request.
#[derive(Debug)]
pub enum Dispatch {
    /// Continue to the upstream named by the request's (rewritten) host.
    Forward(EdgeRequest),
    /// Answer the client directly.
    Respond(EdgeResponse),
}

/// Why an endpoint was passed over.
#[derive(Debug, Error)]
pub enum FailoverError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Unhealthy(#[from] HealthError),
}

impl FailoverError {
    fn outcome(&self) -> &'static str {
        match self {
            FailoverError::Query(_) => "query_error",
            FailoverError::Unhealthy(_) => "unhealthy",
        }
    }
}

/// Routes requests to the first healthy endpoint.
pub struct FailoverDispatcher {
    primary: Endpoint,
    secondary: Endpoint,
    source: Arc<dyn HealthCheckSource>,
}

impl FailoverDispatcher {
    pub fn new(primary: Endpoint, secondary: Endpoint, source: Arc<dyn HealthCheckSource>) -> Self {
        Self {
            primary,
            secondary,
            source,
        }
    }

    pub fn from_config(config: &FailoverConfig, source: Arc<dyn HealthCheckSource>) -> Self {
        Self::new(
            Endpoint::from_config(EndpointRole::Primary, &config.primary),
            Endpoint::from_config(EndpointRole::Secondary, &config.secondary),
            source,
        )
    }

    pub fn primary(&self) -> &Endpoint {
        &self.primary
    }

    pub fn secondary(&self) -> &Endpoint {
        &self.secondary
    }

    /// Endpoints in failover order.
    pub fn endpoints(&self) -> [&Endpoint; 2] {
        [&self.primary, &self.secondary]
    }

    /// Query and evaluate a single endpoint.
    pub async fn check_endpoint(&self, endpoint: &Endpoint) -> Result<Tally, FailoverError> {
        let result = match self.source.health_check_status(&endpoint.health_check_id).await {
            Ok(report) => evaluate(&report.observations).map_err(FailoverError::from),
            Err(e) => Err(FailoverError::from(e)),
        };

        let outcome = match &result {
            Ok(_) => "healthy",
            Err(e) => e.outcome(),
        };
        metrics::record_health_query(endpoint.role.as_str(), outcome);

        result
    }

    /// Decide where `request` goes.
    pub async fn dispatch(&self, request: EdgeRequest) -> Dispatch {
        let start = Instant::now();

        let primary_error = match self.check_endpoint(&self.primary).await {
            Ok(tally) => return self.forward(&self.primary, request, tally, start),
            Err(e) => e,
        };

        tracing::warn!(
            request_id = %request.request_id,
            health_check_id = %self.primary.health_check_id,
            error = %primary_error,
            "Primary failed, trying secondary"
        );

        match self.check_endpoint(&self.secondary).await {
            Ok(tally) => self.forward(&self.secondary, request, tally, start),
            Err(e) => {
                tracing::error!(
                    request_id = %request.request_id,
                    health_check_id = %self.secondary.health_check_id,
                    error = %e,
                    "Secondary failed, no usable endpoint"
                );
                metrics::record_decision("none", start);
                Dispatch::Respond(EdgeResponse::failover_exhausted())
            }
        }
    }

    fn forward(&self, endpoint: &Endpoint, mut request: EdgeRequest, tally: Tally, start: Instant) -> Dispatch {
        tracing::debug!(
            request_id = %request.request_id,
            endpoint = %endpoint.role,
            host = %endpoint.host,
            ok = tally.ok,
            failed = tally.failed,
            "Forwarding request"
        );
        request.set_host(endpoint.host.clone());
        metrics::record_decision(endpoint.role.as_str(), start);
        Dispatch::Forward(request)
    }
}
