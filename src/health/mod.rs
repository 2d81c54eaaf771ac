//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Health-check id
//!     → source.rs (HealthCheckSource trait)
//!     → client.rs (HTTP query against the status service)
//!     → observation.rs (HealthReport decoded from JSON)
//!     → evaluator.rs (majority policy → Healthy / Unhealthy)
//! ```
//!
//! # Design Decisions
//! - Reports are fetched fresh for every evaluation; nothing is cached
//! - The evaluator is a pure function over observations
//! - Query failures are reported as `QueryError`, never folded into a verdict here

pub mod client;
pub mod evaluator;
pub mod observation;
pub mod source;

pub use client::HttpHealthCheckSource;
pub use evaluator::{evaluate, majority_policy, tally, HealthError, HealthVerdict, Tally};
pub use observation::{HealthReport, Observation, StatusReport};
pub use source::{HealthCheckSource, QueryError};
