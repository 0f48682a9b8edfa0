//! Authentication flow handlers: login, signup, email verification and
//! password recovery. Server rejections from the remote API re-render the
//! submitted form with the server-provided message; everything session
//! related goes through the per-request [SessionManager](crate::session::SessionManager).

use ntex::web;
use ntex_identity::Identity;
use serde::Deserialize;

use crate::front::{self, AppState, forms, middleware, utils};

#[derive(Deserialize)]
struct RedirectQuery {
    redirect: Option<String>,
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn form_view(
    template: &str,
    cookie: &ntex_session::Session,
    app_state: &AppState,
    context: tera::Context,
) -> Result<web::HttpResponse, web::Error> {
    // every form view carries a fresh csrf pair
    middleware::csrf_token::issue_for_session(cookie, app_state)?;
    utils::render_view(template, &context)
}

fn error_context(error: &str) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("error", error);
    context
}

#[web::get("/login")]
async fn get_login_view(
    query: web::types::Query<RedirectQuery>,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
    session: middleware::session_user::MaybeSession,
) -> Result<web::HttpResponse, web::Error> {
    if session.0.is_some() {
        return utils::redirect_to("/profile");
    }

    if let Some(target) = &query.redirect {
        utils::remember_redirect_target(&cookie, target);
    }

    form_view("auth/login.html", &cookie, &app_state, tera::Context::new())
}

#[web::post("/login")]
async fn login(
    form: web::types::Form<forms::user::LoginForm>,
    identity: Identity,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
    _: middleware::csrf_token::CsrfToken,
) -> Result<web::HttpResponse, web::Error> {
    if !form.fields_are_valid() {
        return form_view(
            "auth/login.html",
            &cookie,
            &app_state,
            error_context("Please fill in all fields"),
        );
    }

    let issued = match app_state
        .booking_api
        .login(&form.username, &form.password)
        .await
    {
        Ok(issued) => issued,
        Err(err) => {
            return form_view(
                "auth/login.html",
                &cookie,
                &app_state,
                error_context(&err.to_string()),
            );
        }
    };

    // a success body without a token means the account still awaits
    // email verification
    let Some(fresh_token) = issued else {
        return utils::redirect_to("/confirm-email");
    };

    let manager = front::session_manager(identity, &app_state);
    manager.login(&fresh_token).await;

    if !manager.current().is_authenticated() {
        return form_view(
            "auth/login.html",
            &cookie,
            &app_state,
            error_context("Login failed. Please try again."),
        );
    }

    let target = utils::pop_redirect_target(&cookie);
    utils::redirect_to(&target)
}

#[web::get("/signup")]
async fn get_signup_view(
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
    session: middleware::session_user::MaybeSession,
) -> Result<web::HttpResponse, web::Error> {
    if session.0.is_some() {
        return utils::redirect_to("/profile");
    }

    form_view("auth/signup.html", &cookie, &app_state, tera::Context::new())
}

#[web::post("/signup")]
async fn signup(
    form: web::types::Form<forms::user::SignupForm>,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
    _: middleware::csrf_token::CsrfToken,
) -> Result<web::HttpResponse, web::Error> {
    if !form.fields_are_valid() {
        return form_view(
            "auth/signup.html",
            &cookie,
            &app_state,
            error_context("Please fill in all fields"),
        );
    }

    if !form.passwords_match() {
        return form_view(
            "auth/signup.html",
            &cookie,
            &app_state,
            error_context("Passwords do not match"),
        );
    }

    match app_state
        .booking_api
        .signup(&form.username, &form.password)
        .await
    {
        Ok(()) => utils::redirect_to("/confirm-email"),
        Err(err) => form_view(
            "auth/signup.html",
            &cookie,
            &app_state,
            error_context(&err.to_string()),
        ),
    }
}

#[web::get("/confirm-email")]
async fn get_confirm_email_view(
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    form_view(
        "auth/confirm_email.html",
        &cookie,
        &app_state,
        tera::Context::new(),
    )
}

#[web::post("/confirm-email/resend")]
async fn resend_verification(
    form: web::types::Form<forms::user::ResendVerificationForm>,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
    _: middleware::csrf_token::CsrfToken,
) -> Result<web::HttpResponse, web::Error> {
    let context = match app_state.booking_api.resend_verification(&form.email).await {
        Ok(()) => {
            let mut context = tera::Context::new();
            context.insert(
                "message",
                &format!("Verification email sent to {}", form.email),
            );
            context
        }
        Err(err) => error_context(&err.to_string()),
    };

    form_view("auth/confirm_email.html", &cookie, &app_state, context)
}

#[web::get("/verify-email")]
async fn get_verify_email_view(
    query: web::types::Query<TokenQuery>,
    identity: Identity,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    let Some(verification_token) = &query.token else {
        return utils::render_view(
            "auth/verify_email.html",
            &error_context("Missing verification token."),
        );
    };

    match app_state.booking_api.verify_email(verification_token).await {
        Ok(session_token) => {
            // the verified account is logged in right away
            let manager = front::session_manager(identity, &app_state);
            manager.login(&session_token).await;

            let mut context = tera::Context::new();
            context.insert("verified", &true);
            utils::render_view("auth/verify_email.html", &context)
        }
        Err(err) => utils::render_view("auth/verify_email.html", &error_context(&err.to_string())),
    }
}

#[web::get("/forgot-password")]
async fn get_forgot_password_view(
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    form_view(
        "auth/forgot_password.html",
        &cookie,
        &app_state,
        tera::Context::new(),
    )
}

#[web::post("/forgot-password")]
async fn forgot_password(
    form: web::types::Form<forms::user::ForgotPasswordForm>,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
    _: middleware::csrf_token::CsrfToken,
) -> Result<web::HttpResponse, web::Error> {
    if !form.fields_are_valid() {
        return form_view(
            "auth/forgot_password.html",
            &cookie,
            &app_state,
            error_context("Please enter your email address."),
        );
    }

    let context = match app_state.booking_api.forgot_password(&form.email).await {
        Ok(()) => {
            let mut context = tera::Context::new();
            context.insert(
                "message",
                "A reset link has been sent to your email address.",
            );
            context
        }
        Err(err) => error_context(&err.to_string()),
    };

    form_view("auth/forgot_password.html", &cookie, &app_state, context)
}

#[web::get("/reset-password")]
async fn get_reset_password_view(
    query: web::types::Query<TokenQuery>,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
) -> Result<web::HttpResponse, web::Error> {
    let Some(reset_token) = &query.token else {
        return utils::render_view(
            "auth/reset_password.html",
            &error_context("Invalid or missing token."),
        );
    };

    match app_state
        .booking_api
        .verify_password_reset_token(reset_token)
        .await
    {
        Ok(()) => {
            let mut context = tera::Context::new();
            context.insert("token_valid", &true);
            context.insert("token", reset_token);
            form_view("auth/reset_password.html", &cookie, &app_state, context)
        }
        Err(err) => {
            utils::render_view("auth/reset_password.html", &error_context(&err.to_string()))
        }
    }
}

#[web::post("/reset-password")]
async fn reset_password(
    form: web::types::Form<forms::user::ResetPasswordForm>,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
    _: middleware::csrf_token::CsrfToken,
) -> Result<web::HttpResponse, web::Error> {
    let form_error_view = |error: &str| {
        let mut context = error_context(error);
        context.insert("token_valid", &true);
        context.insert("token", &form.token);
        form_view("auth/reset_password.html", &cookie, &app_state, context)
    };

    if !form.fields_are_valid() {
        return form_error_view("Please fill out all fields.");
    }

    if !form.passwords_match() {
        return form_error_view("Passwords do not match.");
    }

    match app_state
        .booking_api
        .reset_password(&form.token, &form.password)
        .await
    {
        Ok(()) => {
            let mut context = tera::Context::new();
            context.insert(
                "message",
                "Password reset successful! You can now log in.",
            );
            utils::render_view("auth/reset_password.html", &context)
        }
        Err(err) => form_error_view(&err.to_string()),
    }
}

#[web::post("/logout")]
async fn logout(
    identity: Identity,
    app_state: web::types::State<AppState>,
    _: middleware::csrf_token::CsrfToken,
) -> Result<web::HttpResponse, web::Error> {
    let manager = front::session_manager(identity, &app_state);
    manager.logout().await;

    utils::redirect_to("/")
}
