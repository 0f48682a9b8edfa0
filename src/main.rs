//! # CineMax Web Application
//!
//! Main entry point for the movie ticket booking web frontend.
//! Configures SSL, middleware, cryptographic keys, and route handling.

#![recursion_limit = "256"]

pub mod config;
pub mod consts;
pub mod front;
pub mod logger;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use csrf::AesGcmCsrfProtection;
use ntex::web;
use ntex_identity::{CookieIdentityPolicy, IdentityService};
use ntex_session::CookieSession;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    config::init_config()?;
    logger::setup_simple_logger()?;

    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;

    // The identity cookie holds the raw session token, so its key has to be
    // stable across restarts; the csrf and session cookies can rotate freely.
    let csrf_key = utils::build_cookie_key(&app_config.csrf_pass, &app_config.csrf_salt)?;
    let identity_key = utils::build_cookie_key(&app_config.cookie_pass, &app_config.cookie_salt)?;
    let session_key = utils::build_random_cookie_key()?;

    configure_and_run_server(csrf_key, session_key, identity_key).await
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor() -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;
    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Creates application state shared by the request handlers
fn create_app_state(
    csrf_key: [u8; 32],
    booking_api: services::booking_api::HttpBookingApi,
    refresh_token_lifetime: chrono::TimeDelta,
) -> front::AppState {
    front::AppState {
        csrf_protec: AesGcmCsrfProtection::from_key(csrf_key),
        booking_api: Arc::new(booking_api),
        refresh_token_lifetime,
    }
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    csrf_key: [u8; 32],
    session_key: [u8; 32],
    identity_key: [u8; 32],
) -> anyhow::Result<()> {
    let app_config = config::APP_CONFIG
        .get()
        .context("failed to get app config")?;
    let server_addr = ("0.0.0.0", app_config.web_server_port);

    let booking_api = services::booking_api::HttpBookingApi::new()?;
    let refresh_token_lifetime = app_config.refresh_token_lifetime();

    let server = web::server(move || {
        web::App::new()
            .wrap(
                CookieSession::private(&session_key)
                    .secure(app_config.is_prod())
                    .domain(app_config.web_server_host.to_string())
                    .max_age(consts::MAX_AGE_COOKIES)
                    .name("cine-max-session"),
            )
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(&identity_key)
                    .name("token")
                    .domain(app_config.web_server_host.to_string())
                    .max_age(consts::MAX_AGE_COOKIES)
                    .secure(app_config.is_prod()),
            ))
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(
                csrf_key,
                booking_api.clone(),
                refresh_token_lifetime,
            ))
            .configure(front::routes::auth_flows)
            .configure(front::routes::user_profile)
            .service((
                ntex_files::Files::new("/static", "web/static/"),
                front::server::serve_favicon,
                front::server::index,
            ))
            .default_service(web::route().to(front::server::serve_not_found))
    });

    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor()?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
