//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (EdgeRequest: buffered body, request ID, host)
//!     → routing dispatcher decides
//!         Forward → server.rs sends to http://{host}, streams response back
//!         Respond → response.rs (EdgeResponse into HTTP response)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{EdgeRequest, RequestError, X_REQUEST_ID};
pub use response::EdgeResponse;
pub use server::{AppState, HttpServer};
