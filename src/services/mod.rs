pub mod booking_api;

use crate::models;
use async_trait::async_trait;
use std::sync::Arc;

/// Remote booking/authentication API, consumed as a black box.
///
/// Every method maps to one HTTP endpoint. Server rejections surface as
/// `anyhow` errors whose display text is the human-readable message the
/// server sent (or a generic fallback), so form handlers can show it as-is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingApi {
    /// Exchanges credentials for a session token. `Ok(None)` means the
    /// account exists but is not verified yet (the API omits the token).
    async fn login(&self, username: &str, password: &str) -> anyhow::Result<Option<String>>;

    async fn signup(&self, username: &str, password: &str) -> anyhow::Result<()>;

    /// Exchanges a near-expiry token for a fresh one
    async fn refresh(&self, token: &str) -> anyhow::Result<String>;

    /// Retires the token server-side. Callers treat failures as non-fatal.
    async fn logout(&self, token: &str) -> anyhow::Result<()>;

    /// Current identity plus ordered booking history
    async fn my_info(&self, token: &str) -> anyhow::Result<models::user::User>;

    /// Confirms an email-verification token and returns the session token
    /// issued for the now-enabled account
    async fn verify_email(&self, verification_token: &str) -> anyhow::Result<String>;

    async fn forgot_password(&self, email: &str) -> anyhow::Result<()>;

    async fn reset_password(&self, reset_token: &str, password: &str) -> anyhow::Result<()>;

    async fn verify_password_reset_token(&self, reset_token: &str) -> anyhow::Result<()>;

    async fn resend_verification(&self, email: &str) -> anyhow::Result<()>;
}

pub type ImplBookingApi = Arc<dyn BookingApi>;
