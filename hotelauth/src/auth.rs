use crate::backend::Backend;
use crate::error::AuthError;
use crate::internal::claims::ClaimSet;
use crate::internal::unixtime::UnixTimestamp;
use crate::resolver::ClaimResolver;
use crate::role::Role;
use crate::session::SessionValidator;
use crate::store::TokenStore;
use crate::types::{Credentials, ResolvedIdentity, SignUpRequest};
use reqwest::StatusCode;
use tracing::{error, info, warn};

//--------------------------------------------------------------------------------------------------

const AUTHORIZATION_BEARER_PREFIX: &str = "Bearer ";

//--------------------------------------------------------------------------------------------------
// Session facade
//--------------------------------------------------------------------------------------------------

/// The one place the rest of the application asks about the signed-in user.
///
/// Every accessor re-reads and re-validates the stored token, so an expired or malformed token is
/// discarded the first time anything looks at it.
pub struct AuthSession<S, B> {
    validator: SessionValidator<S>,
    backend: B,
    resolver: ClaimResolver,
}

impl<S, B> AuthSession<S, B>
where
    S: TokenStore,
    B: Backend,
{
    pub fn new(store: S, backend: B, resolver: ClaimResolver) -> Self {
        Self {
            validator: SessionValidator::new(store),
            backend,
            resolver,
        }
    }

    pub fn validator(&self) -> &SessionValidator<S> {
        &self.validator
    }

    pub fn resolver(&self) -> &ClaimResolver {
        &self.resolver
    }

    /// Signs in and stores the issued token. `Ok(false)` when no usable token came back; transport
    /// errors are returned as they are, and a 401 also clears any existing session.
    pub async fn login(&self, credentials: &Credentials) -> Result<bool, AuthError> {
        let token = match self.backend.sign_in(credentials).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!("Sign-in for {} returned no token", credentials.email);
                return Ok(false);
            }
            Err(err) => {
                error!("Login error: {}", err);
                if err.evicts_session() {
                    self.validator.evict();
                }
                return Err(err);
            }
        };

        let stored = self.validator.set_token(token.into_inner());
        if stored {
            info!("Signed in {} as {}", credentials.email, credentials.role);
        }

        Ok(stored)
    }

    pub async fn sign_up(&self, role: Role, request: &SignUpRequest) -> Result<bool, AuthError> {
        match self.backend.sign_up(role, request).await {
            Ok(created) => Ok(created),
            Err(err) => {
                error!("Sign-up error for {}: {}", request.email, err);
                Err(err)
            }
        }
    }

    pub fn logout(&self) {
        self.validator.evict();
        info!("Signed out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.validator.get_valid_token().is_some()
    }

    pub fn current_role(&self) -> Option<Role> {
        self.resolver.role(&self.valid_claims()?)
    }

    pub fn current_hotel_id(&self) -> Option<i64> {
        self.resolver.hotel_id(&self.valid_claims()?)
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.resolver.user_id(&self.valid_claims()?)
    }

    pub fn identity(&self) -> Option<ResolvedIdentity> {
        Some(self.resolver.identity(&self.valid_claims()?))
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.current_role() == Some(role)
    }

    pub fn decoded_claims(&self) -> Option<ClaimSet> {
        self.valid_claims()
    }

    /// Value for the `Authorization` header of an outgoing request. A stored token that is no
    /// longer valid is removed and reported, so the request is not sent with it.
    pub fn authorization_header(&self) -> Result<Option<String>, AuthError> {
        let Some(token) = self.validator.store().get() else {
            return Ok(None);
        };

        match self.validator.check(&token, UnixTimestamp::now()) {
            Ok(_) => Ok(Some(format!("{}{}", AUTHORIZATION_BEARER_PREFIX, token))),
            Err(err) => {
                warn!("Your session has expired, sign in again: {}", err);
                self.validator.evict();
                Err(err)
            }
        }
    }

    /// Inspects the status of any backend response; a 401 ends the session
    pub fn handle_response_status(&self, status: StatusCode) -> Result<(), AuthError> {
        if status != StatusCode::UNAUTHORIZED {
            return Ok(());
        }

        let err = AuthError::Unauthorized;
        if err.evicts_session() {
            warn!("Backend returned 401, clearing session");
            self.validator.evict();
        }
        Err(err)
    }

    fn valid_claims(&self) -> Option<ClaimSet> {
        self.validator.valid_claims_at(UnixTimestamp::now())
    }
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::claims::{LOCALITY_CLAIM, ROLE_CLAIM, SID_CLAIM};
    use crate::internal::testing::{token_expiring_in, token_with};
    use crate::store::MemoryTokenStore;
    use crate::types::AccessToken;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    struct StubBackend {
        sign_in: Result<Option<String>, AuthError>,
        signed_up: Mutex<Vec<Role>>,
    }

    impl StubBackend {
        fn answering(sign_in: Result<Option<String>, AuthError>) -> Self {
            Self {
                sign_in,
                signed_up: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Backend for StubBackend {
        async fn sign_in(&self, _: &Credentials) -> Result<Option<AccessToken>, AuthError> {
            self.sign_in.clone().map(|token| token.map(AccessToken::from))
        }

        async fn sign_up(&self, role: Role, _: &SignUpRequest) -> Result<bool, AuthError> {
            self.signed_up.lock().push(role);
            Ok(true)
        }
    }

    type TestSession = AuthSession<Arc<MemoryTokenStore>, StubBackend>;

    fn session(
        store: &Arc<MemoryTokenStore>,
        sign_in: Result<Option<String>, AuthError>,
    ) -> TestSession {
        AuthSession::new(
            Arc::clone(store),
            StubBackend::answering(sign_in),
            ClaimResolver::new(false),
        )
    }

    fn credentials() -> Credentials {
        Credentials::new("owner@hotel.test", "secret", Role::Owner)
    }

    fn owner_token() -> String {
        token_expiring_in(
            3600,
            json!({
                ROLE_CLAIM: "ROLE_OWNER",
                LOCALITY_CLAIM: "7",
                SID_CLAIM: "owner-1",
            }),
        )
    }

    #[test]
    fn empty_store_is_anonymous() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&store, Ok(None));

        assert!(!session.is_authenticated());
        assert_eq!(session.current_role(), None);
        assert_eq!(session.current_hotel_id(), None);
        assert_eq!(session.identity(), None);
    }

    #[tokio::test]
    async fn login_stores_token_and_resolves_identity() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&store, Ok(Some(owner_token())));

        assert_eq!(session.login(&credentials()).await, Ok(true));
        assert!(session.is_authenticated());
        assert_eq!(session.current_role(), Some(Role::Owner));
        assert_eq!(session.current_hotel_id(), Some(7));
        assert_eq!(session.current_user_id(), Some("owner-1".to_string()));
        assert!(session.has_role(Role::Owner));
        assert!(!session.has_role(Role::Admin));
    }

    #[tokio::test]
    async fn login_without_token_fails_softly() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&store, Ok(None));

        assert_eq!(session.login(&credentials()).await, Ok(false));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn login_with_expired_token_is_refused() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&store, Ok(Some(token_expiring_in(-60, json!({})))));

        assert_eq!(session.login(&credentials()).await, Ok(false));
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn login_transport_failure_is_propagated() {
        let store = Arc::new(MemoryTokenStore::new());
        let failure = AuthError::TransportFailure("connection refused".to_string());
        let session = session(&store, Err(failure.clone()));

        assert_eq!(session.login(&credentials()).await, Err(failure));
    }

    #[tokio::test]
    async fn login_unauthorized_clears_existing_session() {
        let store = Arc::new(MemoryTokenStore::with_token(owner_token()));
        let session = session(&store, Err(AuthError::Unauthorized));

        assert_eq!(
            session.login(&credentials()).await,
            Err(AuthError::Unauthorized)
        );
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn login_transport_failure_keeps_existing_session() {
        let store = Arc::new(MemoryTokenStore::with_token(owner_token()));
        let failure = AuthError::TransportFailure("timed out".to_string());
        let session = session(&store, Err(failure.clone()));

        assert_eq!(session.login(&credentials()).await, Err(failure));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn sign_up_goes_to_backend() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&store, Ok(None));
        let request = SignUpRequest {
            id: 1,
            username: "w".to_string(),
            name: "W".to_string(),
            surname: "K".to_string(),
            email: "w@hotel.test".to_string(),
            phone: "1".to_string(),
            password: "p".to_string(),
        };

        assert_eq!(session.sign_up(Role::Worker, &request).await, Ok(true));
        assert_eq!(*session.backend.signed_up.lock(), vec![Role::Worker]);
    }

    #[test]
    fn logout_clears_the_session() {
        let store = Arc::new(MemoryTokenStore::with_token(owner_token()));
        let session = session(&store, Ok(None));

        assert!(session.is_authenticated());
        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(store.get(), None);
    }

    #[test]
    fn expired_session_reads_as_anonymous_and_is_evicted() {
        let token = token_expiring_in(-60, json!({ ROLE_CLAIM: "ROLE_ADMIN" }));
        let store = Arc::new(MemoryTokenStore::with_token(token));
        let session = session(&store, Ok(None));

        assert_eq!(session.current_role(), None);
        assert_eq!(store.get(), None);
    }

    #[test]
    fn development_fallback_applies_to_hotel_id() {
        let token = token_expiring_in(3600, json!({ ROLE_CLAIM: "ROLE_WORKER" }));
        let store = Arc::new(MemoryTokenStore::with_token(token));
        let session = AuthSession::new(
            Arc::clone(&store),
            StubBackend::answering(Ok(None)),
            ClaimResolver::new(true),
        );

        assert_eq!(session.current_hotel_id(), Some(1));
        assert_eq!(session.current_user_id(), None);
    }

    #[test]
    fn identity_includes_expiration() {
        let store = Arc::new(MemoryTokenStore::with_token(owner_token()));
        let session = session(&store, Ok(None));

        let identity = session.identity().unwrap();
        assert_eq!(identity.role, Some(Role::Owner));
        assert!(identity.expires_at.unwrap() > UnixTimestamp::now());
    }

    #[test]
    fn authorization_header_for_valid_token() {
        let token = owner_token();
        let store = Arc::new(MemoryTokenStore::with_token(token.clone()));
        let session = session(&store, Ok(None));

        assert_eq!(
            session.authorization_header(),
            Ok(Some(format!("Bearer {}", token)))
        );
    }

    #[test]
    fn authorization_header_without_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = session(&store, Ok(None));

        assert_eq!(session.authorization_header(), Ok(None));
    }

    #[test]
    fn authorization_header_with_expired_token_evicts() {
        let store = Arc::new(MemoryTokenStore::with_token(token_expiring_in(-5, json!({}))));
        let session = session(&store, Ok(None));

        assert_eq!(session.authorization_header(), Err(AuthError::ExpiredToken));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn unauthorized_response_evicts() {
        let store = Arc::new(MemoryTokenStore::with_token(owner_token()));
        let session = session(&store, Ok(None));

        assert_eq!(session.handle_response_status(StatusCode::OK), Ok(()));
        assert!(session.is_authenticated());

        assert_eq!(
            session.handle_response_status(StatusCode::UNAUTHORIZED),
            Err(AuthError::Unauthorized)
        );
        assert!(!session.is_authenticated());
    }

    #[test]
    fn decoded_claims_of_valid_session() {
        let token = token_with(&json!({ "exp": 4102444800u64, "hotel": 3 }));
        let store = Arc::new(MemoryTokenStore::with_token(token));
        let session = session(&store, Ok(None));

        let claims = session.decoded_claims().unwrap();
        assert_eq!(claims.get("hotel"), Some(&json!(3)));
        assert_eq!(session.current_hotel_id(), Some(3));
    }
}

//--------------------------------------------------------------------------------------------------
