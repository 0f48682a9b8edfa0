//! Local token inspection.
//!
//! The session token is a JWT issued by the remote API. Its signature is never
//! verified here — the remote API is the only authority — but the claims are
//! decoded locally to know who is logged in and whether the token is still
//! inside its access or refresh validity window. Anything that fails to decode
//! is treated as "not authenticated", never as an error to the caller.

use anyhow::Context;
use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

/// Claims carried by the session token
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject, the username used to authenticate
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }
}

/// Decodes the claims segment of a JWT-style token without verifying it
pub fn decode_claims(token: &str) -> anyhow::Result<TokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .context("token has no claims segment")?;

    let raw = BASE64_URL_SAFE_NO_PAD
        .decode(payload.as_bytes())
        .context("token claims are not valid base64url")?;

    serde_json::from_slice(&raw).context("token claims are not valid JSON")
}

/// A token is access-valid when it decodes and its expiry is strictly in the
/// future at `now`.
pub fn is_access_valid(token: &str, now: DateTime<Utc>) -> bool {
    decode_claims(token)
        .map(|claims| claims.exp > now.timestamp())
        .unwrap_or(false)
}

/// A token is refresh-valid when it decodes and its issued-at plus the
/// configured refresh lifetime is strictly in the future at `now`. An expired
/// token inside this window can still be exchanged for a fresh one.
pub fn is_refresh_valid(token: &str, refresh_lifetime: TimeDelta, now: DateTime<Utc>) -> bool {
    decode_claims(token)
        .map(|claims| claims.iat + refresh_lifetime.num_seconds() > now.timestamp())
        .unwrap_or(false)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_claims_extracts_identity() {
        let token = test_tokens::make_token("ana@example.com", 9, -60, 3600);

        let claims = decode_claims(&token).unwrap();

        assert_eq!(claims.sub, "ana@example.com");
        assert_eq!(claims.user_id, 9);
        assert!(claims.expires_at().unwrap() > claims.issued_at().unwrap());
    }

    #[test]
    fn test_token_with_past_expiry_is_not_access_valid() {
        let token = test_tokens::make_token("u", 1, -3600, -1);
        assert!(!is_access_valid(&token, Utc::now()));
    }

    #[test]
    fn test_token_with_future_expiry_is_access_valid() {
        let token = test_tokens::make_token("u", 1, -3600, 600);
        assert!(is_access_valid(&token, Utc::now()));
    }

    #[test]
    fn test_expiry_must_be_strictly_in_the_future() {
        let now = Utc::now();
        let claims = BASE64_URL_SAFE_NO_PAD.encode(
            serde_json::json!({"sub": "u", "userId": 1, "iat": 0, "exp": now.timestamp()})
                .to_string(),
        );
        let token = format!("h.{claims}.s");

        assert!(!is_access_valid(&token, now));
    }

    #[test]
    fn test_malformed_tokens_fail_both_checks_without_panicking() {
        let lifetime = TimeDelta::days(7);

        for bad in ["", "garbage", "only.two", "a.!!!not-base64!!!.c", "a.b.c"] {
            assert!(!is_access_valid(bad, Utc::now()), "access: {bad:?}");
            assert!(!is_refresh_valid(bad, lifetime, Utc::now()), "refresh: {bad:?}");
        }

        // valid base64url but not the expected JSON shape
        let not_claims = BASE64_URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        let token = format!("h.{not_claims}.s");
        assert!(!is_access_valid(&token, Utc::now()));
        assert!(!is_refresh_valid(&token, lifetime, Utc::now()));
    }

    #[test]
    fn test_refresh_window_follows_issued_at() {
        let lifetime = TimeDelta::days(7);

        let inside = test_tokens::make_token("u", 1, -TimeDelta::days(1).num_seconds(), -60);
        assert!(is_refresh_valid(&inside, lifetime, Utc::now()));

        let elapsed = test_tokens::make_token("u", 1, -TimeDelta::days(10).num_seconds(), -60);
        assert!(!is_refresh_valid(&elapsed, lifetime, Utc::now()));
    }
}
