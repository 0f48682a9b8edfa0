use serde::{Deserialize, Serialize};

use crate::models::booking::Booking;
use crate::session::token::TokenClaims;

/// Identity snapshot of the logged user as asserted by the remote API.
///
/// There is no local user storage; this struct is always a cache of
/// `/users/myInfo`, or a minimal claims-derived stand-in right after login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub enabled: bool,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl User {
    /// Minimal identity decoded from token claims, used for a responsive UI
    /// between login and the authoritative `/users/myInfo` fetch.
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.sub.to_string(),
            enabled: true,
            bookings: vec![],
        }
    }
}
