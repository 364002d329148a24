//! OpenAPI documentation.
//!
//! Served at `/api/openapi.json` and rendered by RapiDoc under `/docs`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use dialcast_core::models;
use dialcast_core::validation;

/// Registers the `bearer` scheme referenced by the protected handlers.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dialcast API",
        version = "0.1.0",
        description = "Robocall campaigns: register a SIP provider, upload an MP3 announcement and a subscriber list, then dial every subscriber and play the announcement. REST resources are versioned under /api/v1/."
    ),
    modifiers(&BearerAuth),
    paths(
        // Health
        health::liveness_check,
        health::health_check,
        // Accounts
        handlers::accounts::register,
        handlers::accounts::login,
        handlers::accounts::logout,
        handlers::accounts::current_user,
        handlers::accounts::delete_account,
        // Workflow
        handlers::workflow::save_provider,
        handlers::workflow::save_audio_file,
        handlers::workflow::save_subscriber_list,
        handlers::workflow::make_calls,
        handlers::workflow::make_calls_done,
        // Telephony providers
        handlers::providers::list_providers,
        handlers::providers::create_provider,
        handlers::providers::get_provider,
        handlers::providers::update_provider,
        handlers::providers::delete_provider,
        // Audio files
        handlers::audio_files::list_audio_files,
        handlers::audio_files::create_audio_file,
        handlers::audio_files::get_audio_file,
        handlers::audio_files::update_audio_file,
        handlers::audio_files::delete_audio_file,
        // Subscribers
        handlers::subscribers::list_subscribers,
        handlers::subscribers::create_subscriber,
        handlers::subscribers::get_subscriber,
        handlers::subscribers::update_subscriber,
        handlers::subscribers::delete_subscriber,
        // Campaign settings
        handlers::settings::list_settings,
        handlers::settings::create_settings,
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::delete_settings,
    ),
    components(
        schemas(
            models::RegisterRequest,
            models::LoginRequest,
            models::LoginResponse,
            models::UserResponse,
            models::ProviderRequest,
            models::UpdateProviderRequest,
            models::ProviderResponse,
            models::AudioFileResponse,
            models::UpdateAudioFileRequest,
            models::Subscriber,
            models::SubscriberRequest,
            models::IngestReport,
            models::CampaignSettings,
            models::SettingsRequest,
            models::CallState,
            models::CallOutcome,
            models::CampaignReport,
            validation::FieldViolation,
            handlers::MessageResponse,
            handlers::workflow::ProviderSaved,
            handlers::workflow::AudioFileSaved,
            handlers::workflow::SubscriberListSaved,
            handlers::workflow::CallsMade,
            handlers::workflow::WorkflowStep,
            health::HealthResponse,
            // Error
            error::ErrorResponse,
            dialcast_infra::error::FieldError,
        )
    ),
    tags(
        (name = "health", description = "Liveness and dependency checks"),
        (name = "accounts", description = "Registration, token login and logout"),
        (name = "workflow", description = "Guided provider, audio, subscriber list and call sequence"),
        (name = "telephony-providers", description = "SIP gateway credentials"),
        (name = "audio-files", description = "MP3 announcements"),
        (name = "subscribers", description = "Phone numbers to dial, in order"),
        (name = "user-settings", description = "The provider and audio file used by the next campaign")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_workflow_and_rest_paths() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/make_calls"));
        assert!(spec.paths.paths.contains_key("/api/v1/subscribers/{id}"));
        assert!(spec.paths.paths.contains_key("/accounts/login"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let spec = get_openapi_spec();
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
