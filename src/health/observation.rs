//! Health report wire types.
//!
//! Field names follow the status service's PascalCase JSON, e.g.
//! ```json
//! {"HealthCheckObservations": [
//!     {"Region": "us-east-1", "IPAddress": "15.177.2.5",
//!      "StatusReport": {"Status": "Success: HTTP Status Code 200, OK",
//!                       "CheckedTime": "2024-05-02T10:41:09Z"}}
//! ]}
//! ```

use serde::{Deserialize, Serialize};

/// Status prefix that marks a passing observation.
pub const SUCCESS_PREFIX: &str = "Success";

/// One monitoring location's result for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Observation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(rename = "IPAddress", default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    pub status_report: StatusReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusReport {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_time: Option<String>,
}

impl Observation {
    /// Build an observation carrying only a status string.
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            region: None,
            ip_address: None,
            status_report: StatusReport {
                status: status.into(),
                checked_time: None,
            },
        }
    }

    pub fn status(&self) -> &str {
        &self.status_report.status
    }

    /// Case-sensitive prefix match on [`SUCCESS_PREFIX`].
    pub fn is_success(&self) -> bool {
        self.status().starts_with(SUCCESS_PREFIX)
    }
}

/// Observations for one endpoint, fetched fresh for every evaluation.
///
/// The observation list is required. A reply without it fails to decode and
/// is handled like any other failed query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthReport {
    #[serde(rename = "HealthCheckObservations")]
    pub observations: Vec<Observation>,
}

impl HealthReport {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Convenience for building reports from bare status strings.
    pub fn from_statuses<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(statuses.into_iter().map(Observation::new).collect())
    }
}
