//! Health evaluation policy.
//!
//! # Rule
//! ```text
//! ok     = observations whose status starts with "Success"
//! failed = all other observations
//!
//! ok <= failed && ok > 0  → Unhealthy
//! otherwise               → Healthy
//! ```
//!
//! An empty report and a report with no passing observations are both
//! healthy under this rule. That is kept as-is; see DESIGN.md.

use thiserror::Error;

use crate::health::observation::Observation;

/// Pass/fail counts for one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub ok: usize,
    pub failed: usize,
}

/// Outcome of the majority policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthVerdict {
    Healthy,
    Unhealthy,
}

/// Raised when the policy rejects an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    #[error("endpoint is unhealthy ({ok} ok, {failed} failed)")]
    EndpointUnhealthy { ok: usize, failed: usize },
}

/// Count passing and failing observations.
pub fn tally(observations: &[Observation]) -> Tally {
    observations.iter().fold(Tally::default(), |mut t, o| {
        if o.is_success() {
            t.ok += 1;
        } else {
            t.failed += 1;
        }
        t
    })
}

/// Majority vote with a zero-success exception.
pub fn majority_policy(tally: Tally) -> HealthVerdict {
    if tally.ok <= tally.failed && tally.ok > 0 {
        HealthVerdict::Unhealthy
    } else {
        HealthVerdict::Healthy
    }
}

/// Evaluate a report. `Ok` carries the counts for logging.
pub fn evaluate(observations: &[Observation]) -> Result<Tally, HealthError> {
    let counts = tally(observations);
    match majority_policy(counts) {
        HealthVerdict::Healthy => Ok(counts),
        HealthVerdict::Unhealthy => Err(HealthError::EndpointUnhealthy {
            ok: counts.ok,
            failed: counts.failed,
        }),
    }
}
