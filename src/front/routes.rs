//! Frontend route configuration module.
//!
//! Routes are grouped by functionality into logical scopes.

use super::{auth, profile};
use ntex::web;

/// Configures the authentication and account recovery routes.
///
/// # Routes
/// - `GET /login` - Login form
/// - `POST /login` - Authenticate and open a session
/// - `GET /signup` - Registration form
/// - `POST /signup` - Create an account
/// - `GET /confirm-email` - Post-signup instructions view
/// - `POST /confirm-email/resend` - Resend the verification email
/// - `GET /verify-email` - Consume an email verification token
/// - `GET /forgot-password` - Password recovery form
/// - `POST /forgot-password` - Request a password reset email
/// - `GET /reset-password` - Password reset form, token checked upfront
/// - `POST /reset-password` - Apply the new password
/// - `POST /logout` - Close the session
pub fn auth_flows(cfg: &mut web::ServiceConfig) {
    cfg.service((
        auth::get_login_view,
        auth::login,
        auth::get_signup_view,
        auth::signup,
        auth::get_confirm_email_view,
        auth::resend_verification,
        auth::get_verify_email_view,
        auth::get_forgot_password_view,
        auth::forgot_password,
        auth::get_reset_password_view,
        auth::reset_password,
        auth::logout,
    ));
}

/// Configures the user profile routes.
///
/// # Routes
/// - `GET /profile` - Profile view with booking history
pub fn user_profile(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/profile").service((profile::get_profile_view,)));
}
