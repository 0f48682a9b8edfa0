//! Helper functions shared across services/ and front/

use anyhow::anyhow;
use argon2::Argon2;
use std::{str::FromStr, sync::LazyLock};
use uuid::Uuid;

/// Derives a 32-byte cookie-encryption key from a configured password and
/// salt (both UUIDs). The identity cookie must stay readable across restarts,
/// so this is deterministic for a given secret pair.
pub fn build_cookie_key(pwd: &str, salt: &str) -> anyhow::Result<[u8; 32]> {
    let mut cookie_key = [0u8; 32];
    Argon2::default()
        .hash_password_into(
            Uuid::from_str(pwd)?.as_bytes(),
            Uuid::from_str(salt)?.as_bytes(),
            &mut cookie_key,
        )
        .map_err(|err| anyhow!("cookie key couldn't be derived: {}", err))?;

    Ok(cookie_key)
}

/// Derives a throwaway key for cookies that may die on restart (CSRF session)
pub fn build_random_cookie_key() -> anyhow::Result<[u8; 32]> {
    build_cookie_key(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string())
}

/// Client to make http requests against the remote booking API
pub static REQUEST_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);
