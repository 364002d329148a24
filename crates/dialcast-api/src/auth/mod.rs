//! Bearer token authentication

pub mod middleware;
pub mod models;
pub mod token;

pub use middleware::{auth_middleware, AuthFailureLimiter, AuthState};
pub use models::AuthUser;
