//! Protected route groups: account, workflow and the REST resources.

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn account_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts/logout", post(handlers::accounts::logout))
        .route(
            "/accounts/me",
            get(handlers::accounts::current_user).delete(handlers::accounts::delete_account),
        )
}

pub fn workflow_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/save_provider", post(handlers::workflow::save_provider))
        .route("/save_audio_file", post(handlers::workflow::save_audio_file))
        .route(
            "/save_subscriber_list",
            post(handlers::workflow::save_subscriber_list),
        )
        .route("/make_calls", post(handlers::workflow::make_calls))
        .route("/make_calls_done", get(handlers::workflow::make_calls_done))
}

pub fn provider_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/telephony-providers", API_PREFIX),
            get(handlers::providers::list_providers).post(handlers::providers::create_provider),
        )
        .route(
            &format!("{}/telephony-providers/{{id}}", API_PREFIX),
            get(handlers::providers::get_provider)
                .put(handlers::providers::update_provider)
                .delete(handlers::providers::delete_provider),
        )
}

pub fn audio_file_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/audio-files", API_PREFIX),
            get(handlers::audio_files::list_audio_files)
                .post(handlers::audio_files::create_audio_file),
        )
        .route(
            &format!("{}/audio-files/{{id}}", API_PREFIX),
            get(handlers::audio_files::get_audio_file)
                .put(handlers::audio_files::update_audio_file)
                .delete(handlers::audio_files::delete_audio_file),
        )
}

pub fn subscriber_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/subscribers", API_PREFIX),
            get(handlers::subscribers::list_subscribers)
                .post(handlers::subscribers::create_subscriber),
        )
        .route(
            &format!("{}/subscribers/{{id}}", API_PREFIX),
            get(handlers::subscribers::get_subscriber)
                .put(handlers::subscribers::update_subscriber)
                .delete(handlers::subscribers::delete_subscriber),
        )
}

pub fn settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/user-settings", API_PREFIX),
            get(handlers::settings::list_settings).post(handlers::settings::create_settings),
        )
        .route(
            &format!("{}/user-settings/{{id}}", API_PREFIX),
            get(handlers::settings::get_settings)
                .put(handlers::settings::update_settings)
                .delete(handlers::settings::delete_settings),
        )
}
