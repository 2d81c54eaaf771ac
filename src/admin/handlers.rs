use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::health::HealthError;
use crate::http::server::AppState;
use crate::routing::FailoverError;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub primary_host: String,
    pub secondary_host: String,
}

/// Live verdict for one endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointStatus {
    pub role: String,
    pub host: String,
    pub health_check_id: String,
    pub healthy: bool,
    pub ok: Option<usize>,
    pub failed: Option<usize>,
    pub error: Option<String>,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        primary_host: state.dispatcher.primary().host.clone(),
        secondary_host: state.dispatcher.secondary().host.clone(),
    })
}

/// Checks both endpoints in failover order. Nothing is cached.
pub async fn get_endpoints(State(state): State<AppState>) -> Json<Vec<EndpointStatus>> {
    let mut statuses = Vec::new();

    for endpoint in state.dispatcher.endpoints() {
        let mut status = EndpointStatus {
            role: endpoint.role.to_string(),
            host: endpoint.host.clone(),
            health_check_id: endpoint.health_check_id.clone(),
            healthy: false,
            ok: None,
            failed: None,
            error: None,
        };

        match state.dispatcher.check_endpoint(endpoint).await {
            Ok(tally) => {
                status.healthy = true;
                status.ok = Some(tally.ok);
                status.failed = Some(tally.failed);
            }
            Err(e) => {
                if let FailoverError::Unhealthy(HealthError::EndpointUnhealthy { ok, failed }) = &e {
                    status.ok = Some(*ok);
                    status.failed = Some(*failed);
                }
                status.error = Some(e.to_string());
            }
        }

        statuses.push(status);
    }

    Json(statuses)
}
