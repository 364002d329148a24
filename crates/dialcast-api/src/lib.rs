//! Dialcast API Library
//!
//! HTTP handlers, bearer-token authentication and application setup for the
//! campaign workflow.

mod api_doc;
pub mod constants;
pub mod handlers;
pub mod setup;
mod utils;

pub mod auth;
pub mod error;
pub mod state;

pub use api_doc::get_openapi_spec;
pub use error::ErrorResponse;
