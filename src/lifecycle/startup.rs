//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the health-check source from configuration
//! - Assemble the HTTP server around it
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal

use std::sync::Arc;
use thiserror::Error;

use crate::config::FailoverConfig;
use crate::health::{HttpHealthCheckSource, QueryError};
use crate::http::HttpServer;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create health-check client: {0}")]
    HealthSource(#[from] QueryError),
}

/// Build a server that queries the configured status service.
pub fn build_server(config: FailoverConfig) -> Result<HttpServer, StartupError> {
    let source = HttpHealthCheckSource::new(&config.health_source)?;

    tracing::info!(
        base_url = %config.health_source.base_url,
        primary_check = %config.primary.health_check_id,
        secondary_check = %config.secondary.health_check_id,
        "Health-check source ready"
    );

    Ok(HttpServer::new(config, Arc::new(source)))
}
