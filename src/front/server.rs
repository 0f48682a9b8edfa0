//! Handlers not linked to a specific url

use ntex::web;
use ntex_files::NamedFile;

use crate::front::{AppState, errors, middleware, utils};

/// Serve `favicon.ico`
#[web::get("/favicon.ico")]
async fn serve_favicon() -> Result<impl web::Responder, web::Error> {
    Ok(NamedFile::open("web/static/favicon.ico")?)
}

/// Return a [UrlNotFound](errors::UserError::UrlNotFound) error for urls not defined
pub async fn serve_not_found() -> Result<web::HttpResponse, web::Error> {
    Err(errors::UserError::UrlNotFound.into())
}

/// Endpoint to render the landing view
#[web::get("/")]
async fn index(
    session: middleware::session_user::MaybeSession,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    let mut context = tera::Context::new();
    context.insert("logged_in", &session.0.is_some());
    if let Some(claims) = &session.0 {
        // the navbar renders the logout form, which needs a csrf pair
        middleware::csrf_token::issue_for_session(&cookie, &app_state)?;
        context.insert("username", &claims.sub);
    }

    utils::render_view("index.html", &context)
}
