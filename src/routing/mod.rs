//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! EdgeRequest
//!     → dispatcher.rs (check primary, then secondary on failure)
//!     → endpoint.rs (host to write into the request)
//!     → Dispatch::Forward(request) | Dispatch::Respond(response)
//! ```
//!
//! # Design Decisions
//! - Endpoints are fixed at startup, immutable at runtime
//! - The decision is a value; the HTTP layer performs the I/O
//! - Deterministic: same health answers always produce the same decision

pub mod dispatcher;
pub mod endpoint;

pub use dispatcher::{Dispatch, FailoverDispatcher, FailoverError};
pub use endpoint::{Endpoint, EndpointRole};
