//! Failover targets.

use std::fmt;

use crate::config::EndpointConfig;

/// Position of an endpoint in the failover order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    Primary,
    Secondary,
}

impl EndpointRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointRole::Primary => "primary",
            EndpointRole::Secondary => "secondary",
        }
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend the router can forward to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub role: EndpointRole,
    /// Key used to query the status service.
    pub health_check_id: String,
    /// Host written into forwarded requests.
    pub host: String,
}

impl Endpoint {
    pub fn new(role: EndpointRole, health_check_id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            role,
            health_check_id: health_check_id.into(),
            host: host.into(),
        }
    }

    pub fn from_config(role: EndpointRole, config: &EndpointConfig) -> Self {
        Self::new(role, config.health_check_id.clone(), config.host.clone())
    }
}
