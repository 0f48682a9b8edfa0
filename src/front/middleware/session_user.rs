use ntex::{
    http::Payload,
    web::{Error, FromRequest, HttpRequest},
};
use ntex_identity::{Identity, RequestIdentity};

use crate::session::store::TokenStore;
use crate::session::token::{self, TokenClaims};

/// Durable client storage for the session token, backed by the encrypted
/// identity cookie. One instance serves one request; the session manager
/// writes through it and the cookie travels back with the response.
pub struct IdentityTokenStore {
    identity: Identity,
}

impl IdentityTokenStore {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }
}

impl TokenStore for IdentityTokenStore {
    fn load(&self) -> Option<String> {
        self.identity.identity()
    }

    fn save(&self, token: &str) {
        self.identity.remember(token.to_string());
    }

    fn clear(&self) {
        self.identity.forget();
    }
}

/// Claims of an access-valid stored token, for views that only need to know
/// whether someone is logged in. Never fails: an absent, expired or
/// undecodable token just yields `None`.
pub struct MaybeSession(pub Option<TokenClaims>);

fn decode_valid_claims(stored_token: Option<String>) -> Option<TokenClaims> {
    let stored_token = stored_token?;

    if !token::is_access_valid(&stored_token, chrono::Utc::now()) {
        return None;
    }

    token::decode_claims(&stored_token).ok()
}

impl<Err> FromRequest<Err> for MaybeSession {
    type Error = Error;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        futures::future::ready(Ok(Self(decode_valid_claims(req.get_identity()))))
    }
}
