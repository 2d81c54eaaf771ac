//! Request-time primary/secondary failover router.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::FailoverConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Dispatch, FailoverDispatcher};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
