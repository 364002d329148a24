//! Dialcast Infrastructure Library
//!
//! Shared infrastructure for the Dialcast binaries:
//! - Middleware (request ID, security headers)
//! - Tracing initialization
//! - The HTTP error envelope

pub mod error;
pub mod middleware;
pub mod telemetry;

pub use error::ErrorResponse;
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
    REQUEST_ID_HEADER,
};
pub use telemetry::{init_telemetry, LogFormat};
