pub mod auth;
pub mod errors;
pub mod forms;
pub mod middleware;
pub mod profile;
pub mod routes;
pub mod server;
pub mod templates;
pub mod utils;

use csrf::AesGcmCsrfProtection;
use ntex_identity::Identity;

use crate::{services, session};

pub struct AppState {
    pub csrf_protec: AesGcmCsrfProtection,
    pub booking_api: services::ImplBookingApi,
    pub refresh_token_lifetime: chrono::TimeDelta,
}

/// Builds a [SessionManager](session::SessionManager) wired to this request's
/// identity cookie. Each request gets its own manager; the cookie is the
/// durable storage shared across them.
pub fn session_manager(identity: Identity, app_state: &AppState) -> session::SessionManager {
    session::SessionManager::new(
        Box::new(middleware::session_user::IdentityTokenStore::new(identity)),
        app_state.booking_api.clone(),
        app_state.refresh_token_lifetime,
    )
}
