//! HTTP surface for the notes service.
//!
//! Routes validate and deserialize requests, hand them to
//! `notes_core::NoteService` on the blocking pool, and map outcomes to
//! status codes. No storage logic lives here.

pub mod controllers;
pub mod error;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use actix_cors::Cors;
use actix_web::web;

/// Registers extractor settings, shared state and every route.
pub fn configure(cfg: &mut web::ServiceConfig, state: &web::Data<AppState>) {
    cfg.app_data(state.clone())
        .app_data(error::json_config(error::JSON_BODY_LIMIT))
        .app_data(error::query_config())
        .app_data(error::path_config())
        .configure(controllers::health::config)
        .service(controllers::notes::scope(&state.api_prefix));
}

/// Permissive CORS policy for the browser frontend.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}
