use crate::consts;
use crate::front::{errors, templates};

/// Renders `template` into an html response
pub fn render_view(
    template: &str,
    context: &tera::Context,
) -> Result<ntex::web::HttpResponse, ntex::web::Error> {
    let content = templates::WEB_TEMPLATES
        .render(template, context)
        .map_err(|e| {
            errors::ServerError::TemplateError(format!(
                "template {template} couldn't be rendered: {e}"
            ))
        })?;

    Ok(ntex::web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(content))
}

/// [ntex responder](ntex::web::HttpResponse) to redirect to `url`
pub fn redirect_to(url: &str) -> Result<ntex::web::HttpResponse, ntex::web::Error> {
    Ok(ntex::web::HttpResponse::Found()
        .header("location", url)
        .finish())
}

/// Only same-site paths may be used as post-login redirect targets
pub fn is_safe_redirect_target(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//")
}

/// Remembers where to send the user after a successful login. Unsafe targets
/// (absolute URLs, protocol-relative) are dropped.
pub fn remember_redirect_target(cookie: &ntex_session::Session, target: &str) {
    if is_safe_redirect_target(target) {
        let _ = cookie.set(consts::REDIRECT_TO_COOKIE_NAME, target.to_string());
    }
}

/// Takes the stored redirect target, falling back to the home page
pub fn pop_redirect_target(cookie: &ntex_session::Session) -> String {
    if let Ok(Some(target)) = cookie.get::<String>(consts::REDIRECT_TO_COOKIE_NAME) {
        cookie.remove(consts::REDIRECT_TO_COOKIE_NAME);
        if is_safe_redirect_target(&target) {
            return target;
        }
    }

    "/".into()
}
