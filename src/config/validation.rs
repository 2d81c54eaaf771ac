//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics and returns every
//! failure it finds, not just the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{EndpointConfig, FailoverConfig};

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("health_source.base_url is not a valid URL: {0}")]
    InvalidBaseUrl(String),

    #[error("health_source.status_path must contain the {{id}} placeholder")]
    MissingIdPlaceholder,

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("timeouts.request_secs ({request_secs}) must exceed two health queries ({minimum}s)")]
    RequestTimeoutTooShort { request_secs: u64, minimum: u64 },

    #[error("primary and secondary share the host {0}")]
    DuplicateHost(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_endpoint(&mut errors, ("primary.host", "primary.health_check_id"), &config.primary);
    check_endpoint(&mut errors, ("secondary.host", "secondary.health_check_id"), &config.secondary);

    if !config.primary.host.is_empty() && config.primary.host == config.secondary.host {
        errors.push(ValidationError::DuplicateHost(config.primary.host.clone()));
    }

    if let Err(e) = Url::parse(&config.health_source.base_url) {
        errors.push(ValidationError::InvalidBaseUrl(e.to_string()));
    }
    if !config.health_source.status_path.contains("{id}") {
        errors.push(ValidationError::MissingIdPlaceholder);
    }
    if config.health_source.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "health_source.timeout_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.request_secs" });
    }
    check_timeout_budget(&mut errors, config.timeouts.request_secs, config.health_source.timeout_secs);

    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::Empty { field: "admin.api_key" });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(
    errors: &mut Vec<ValidationError>,
    (host_field, id_field): (&'static str, &'static str),
    endpoint: &EndpointConfig,
) {
    if endpoint.host.trim().is_empty() {
        errors.push(ValidationError::Empty { field: host_field });
    }
    if endpoint.health_check_id.trim().is_empty() {
        errors.push(ValidationError::Empty { field: id_field });
    }
}

/// A request may wait on two sequential health queries before it is routed or
/// answered with the fixed 404, so the request timeout has to outlast both.
fn check_timeout_budget(errors: &mut Vec<ValidationError>, request_secs: u64, query_secs: u64) {
    if request_secs == 0 || query_secs == 0 {
        return;
    }
    let minimum = query_secs.saturating_mul(2);
    if request_secs <= minimum {
        errors.push(ValidationError::RequestTimeoutTooShort { request_secs, minimum });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
