//! # Booking API Client
//!
//! reqwest-backed implementation of [BookingApi](super::BookingApi) against
//! the remote booking service. Success bodies come wrapped in a
//! `{ result, message }` envelope; rejection bodies carry a `message` meant
//! for the end user.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use crate::{config, models, services::BookingApi, utils};

#[derive(Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct LoginResult {
    token: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResult {
    token: String,
}

#[derive(Deserialize)]
struct VerifyEmailResult {
    token: Option<String>,
    #[serde(default)]
    enabled: bool,
}

/// HTTP client for the remote booking API
#[derive(Clone)]
pub struct HttpBookingApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookingApi {
    pub fn new() -> anyhow::Result<Self> {
        let app_config = config::APP_CONFIG
            .get()
            .context("failed to get app config")?;

        Ok(Self {
            client: utils::REQUEST_CLIENT.clone(),
            base_url: app_config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-success response into an error showing the server-provided
    /// message when there is one, otherwise `fallback`.
    async fn rejection(response: reqwest::Response, fallback: &str) -> anyhow::Error {
        let status = response.status();
        let message = response
            .json::<Envelope<serde_json::Value>>()
            .await
            .ok()
            .and_then(|body| body.message);

        match message {
            Some(message) if !message.trim().is_empty() => anyhow::anyhow!(message),
            _ => anyhow::anyhow!("{fallback} (status {status})"),
        }
    }

    async fn post_json<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> anyhow::Result<reqwest::Response> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, fallback).await);
        }

        Ok(response)
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn login(&self, username: &str, password: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .post_json(
                "/auth/login",
                &serde_json::json!({ "username": username, "password": password }),
                "Login failed",
            )
            .await?;

        let body: Envelope<LoginResult> = response
            .json()
            .await
            .context("login response is not the expected shape")?;

        Ok(body.result.and_then(|r| r.token))
    }

    async fn signup(&self, username: &str, password: &str) -> anyhow::Result<()> {
        self.post_json(
            "/users",
            &serde_json::json!({ "username": username, "password": password }),
            "Sign up failed",
        )
        .await?;

        Ok(())
    }

    async fn refresh(&self, token: &str) -> anyhow::Result<String> {
        let response = self
            .post_json(
                "/auth/refresh",
                &serde_json::json!({ "token": token }),
                "Token refresh rejected",
            )
            .await?;

        let body: RefreshResult = response
            .json()
            .await
            .context("refresh response is not the expected shape")?;

        Ok(body.token)
    }

    async fn logout(&self, token: &str) -> anyhow::Result<()> {
        self.post_json(
            "/auth/logout",
            &serde_json::json!({ "token": token }),
            "Logout rejected",
        )
        .await?;

        Ok(())
    }

    async fn my_info(&self, token: &str) -> anyhow::Result<models::user::User> {
        let response = self
            .client
            .get(self.url("/users/myInfo"))
            .bearer_auth(token)
            .send()
            .await
            .context("request to /users/myInfo failed")?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, "Could not load user info").await);
        }

        let body: Envelope<models::user::User> = response
            .json()
            .await
            .context("myInfo response is not the expected shape")?;

        body.result.context("myInfo response is missing its result")
    }

    async fn verify_email(&self, verification_token: &str) -> anyhow::Result<String> {
        let response = self
            .post_json(
                "/auth/verify-email",
                &serde_json::json!({ "token": verification_token }),
                "Invalid or expired verification link",
            )
            .await?;

        let body: Envelope<VerifyEmailResult> = response
            .json()
            .await
            .context("verify-email response is not the expected shape")?;

        let result = body
            .result
            .context("verify-email response is missing its result")?;

        if !result.enabled {
            anyhow::bail!("Invalid or expired verification link");
        }

        result
            .token
            .context("verify-email response did not include a session token")
    }

    async fn forgot_password(&self, email: &str) -> anyhow::Result<()> {
        self.post_json(
            "/auth/forgot-password",
            &serde_json::json!({ "email": email }),
            "Failed to send reset link",
        )
        .await?;

        Ok(())
    }

    async fn reset_password(&self, reset_token: &str, password: &str) -> anyhow::Result<()> {
        self.post_json(
            "/auth/reset-password",
            &serde_json::json!({ "token": reset_token, "password": password }),
            "Failed to reset password",
        )
        .await?;

        Ok(())
    }

    async fn verify_password_reset_token(&self, reset_token: &str) -> anyhow::Result<()> {
        self.post_json(
            "/auth/verify-password-reset-token",
            &serde_json::json!({ "token": reset_token }),
            "Reset link is invalid or expired",
        )
        .await?;

        Ok(())
    }

    async fn resend_verification(&self, email: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .post(self.url("/auth/resend-verification"))
            .query(&[("email", email)])
            .send()
            .await
            .context("request to /auth/resend-verification failed")?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, "Could not resend the verification email").await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_success_shape() {
        let body: Envelope<LoginResult> =
            serde_json::from_str(r#"{"result":{"token":"abc"}}"#).unwrap();

        assert_eq!(body.result.and_then(|r| r.token).as_deref(), Some("abc"));
        assert!(body.message.is_none());
    }

    #[test]
    fn test_envelope_parses_rejection_shape() {
        let body: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"message":"Invalid credentials"}"#).unwrap();

        assert_eq!(body.message.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_login_result_token_is_optional() {
        // the API omits the token for accounts pending email verification
        let body: Envelope<LoginResult> = serde_json::from_str(r#"{"result":{}}"#).unwrap();

        assert!(body.result.and_then(|r| r.token).is_none());
    }

    #[test]
    fn test_verify_email_result_defaults_to_disabled() {
        let result: VerifyEmailResult = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();

        assert!(!result.enabled);
    }
}
