//! Data models for the application
//!
//! Each sub-module represents one entity of the campaign workflow.

mod audio;
mod campaign;
mod provider;
mod settings;
mod subscriber;
mod user;

pub use audio::*;
pub use campaign::*;
pub use provider::*;
pub use settings::*;
pub use subscriber::*;
pub use user::*;
