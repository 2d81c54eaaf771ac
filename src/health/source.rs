//! Health-check status query interface.

use async_trait::async_trait;
use thiserror::Error;

use crate::health::observation::HealthReport;

/// Errors from querying the status service.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Connection failure, timeout, or any other transport problem.
    #[error("health query transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("health query returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a health report.
    #[error("health query response could not be decoded: {0}")]
    Decode(String),

    #[error("invalid health query URL: {0}")]
    InvalidUrl(String),
}

/// Fetches the current observations for a health-check identifier.
#[async_trait]
pub trait HealthCheckSource: Send + Sync {
    async fn health_check_status(&self, health_check_id: &str) -> Result<HealthReport, QueryError>;
}
