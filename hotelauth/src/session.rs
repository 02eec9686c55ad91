use crate::codec;
use crate::error::AuthError;
use crate::internal::claims::ClaimSet;
use crate::internal::unixtime::UnixTimestamp;
use crate::store::TokenStore;
use tracing::{debug, error, warn};

//--------------------------------------------------------------------------------------------------
// Session validity
//--------------------------------------------------------------------------------------------------

/// Decides whether the stored token is still usable. Reading through the validator has a side
/// effect: a token found to be malformed or expired is removed from the store before the caller
/// sees the result.
pub struct SessionValidator<S> {
    store: S,
}

impl<S: TokenStore> SessionValidator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decodes `token` and checks its expiration without touching the store
    pub fn check(&self, token: &str, now: UnixTimestamp) -> Result<ClaimSet, AuthError> {
        let claims = codec::decode(token)?;

        let Some(expires_at) = claims.expires_at_seconds() else {
            return Err(AuthError::MalformedToken(
                "token has no expiration claim".to_string(),
            ));
        };

        if expires_at < now.seconds() {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }

    pub fn is_valid(&self, token: &str, now: UnixTimestamp) -> bool {
        if token.is_empty() {
            return false;
        }

        match self.check(token, now) {
            Ok(_) => true,
            Err(err) => {
                warn!("Discarding stored token: {}", err);
                self.evict();
                false
            }
        }
    }

    pub fn get_valid_token(&self) -> Option<String> {
        self.valid_token_at(UnixTimestamp::now())
    }

    pub fn valid_token_at(&self, now: UnixTimestamp) -> Option<String> {
        self.load(now).map(|(token, _)| token)
    }

    /// The claims of the stored token, if it is still valid at `now`
    pub fn valid_claims_at(&self, now: UnixTimestamp) -> Option<ClaimSet> {
        self.load(now).map(|(_, claims)| claims)
    }

    pub fn set_token(&self, token: String) -> bool {
        self.set_token_at(token, UnixTimestamp::now())
    }

    /// Stores `token` unless it is malformed or already expired at `now`. A token without an
    /// expiration claim is stored, but the next read will discard it.
    pub fn set_token_at(&self, token: String, now: UnixTimestamp) -> bool {
        let claims = match codec::decode(&token) {
            Ok(claims) => claims,
            Err(err) => {
                error!("Refusing to store token: {}", err);
                return false;
            }
        };

        if claims
            .expires_at_seconds()
            .is_some_and(|expires_at| expires_at < now.seconds())
        {
            error!("Refusing to store a token that has already expired");
            return false;
        }

        self.store.set(token);
        debug!("Token stored");
        true
    }

    pub fn evict(&self) {
        self.store.remove();
        debug!("Stored token removed");
    }

    fn load(&self, now: UnixTimestamp) -> Option<(String, ClaimSet)> {
        let token = self.store.get()?;

        if token.is_empty() {
            self.evict();
            return None;
        }

        match self.check(&token, now) {
            Ok(claims) => Some((token, claims)),
            Err(err) => {
                warn!("Discarding stored token: {}", err);
                self.evict();
                None
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
