use crate::internal::claims::ClaimSet;
use crate::resolver::ClaimResolver;
use crate::role::Role;
use crate::types::ResolvedIdentity;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Serialize;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, error, warn};

//--------------------------------------------------------------------------------------------------
// Trait for Axum states to comply with to provide the token verification key
//--------------------------------------------------------------------------------------------------

pub trait TokenKeyProvider {
    fn decoding_key(&self) -> &DecodingKey;

    fn algorithm(&self) -> Algorithm {
        Algorithm::HS256
    }
}

impl<T: TokenKeyProvider> TokenKeyProvider for Arc<T> {
    fn decoding_key(&self) -> &DecodingKey {
        self.deref().decoding_key()
    }

    fn algorithm(&self) -> Algorithm {
        self.deref().algorithm()
    }
}

//--------------------------------------------------------------------------------------------------
// Type-level roles, and sets of them
//--------------------------------------------------------------------------------------------------

pub trait RoleMarker {
    fn role() -> Role;
}

pub struct OwnerRole;
pub struct AdminRole;
pub struct WorkerRole;

impl RoleMarker for OwnerRole {
    fn role() -> Role {
        Role::Owner
    }
}

impl RoleMarker for AdminRole {
    fn role() -> Role {
        Role::Admin
    }
}

impl RoleMarker for WorkerRole {
    fn role() -> Role {
        Role::Worker
    }
}

trait RoleSet {
    fn roles() -> Vec<Role>;
}

impl<T: RoleMarker> RoleSet for T {
    fn roles() -> Vec<Role> {
        vec![T::role()]
    }
}

#[allow(private_bounds)]
pub struct Or<T, U>(PhantomData<T>, PhantomData<U>)
where
    T: RoleSet,
    U: RoleSet;

impl<T, U> RoleSet for Or<T, U>
where
    T: RoleSet,
    U: RoleSet,
{
    fn roles() -> Vec<Role> {
        let mut roles = T::roles();
        roles.extend(U::roles());
        roles
    }
}

#[allow(private_bounds)]
pub struct Or3<T, U, V>(PhantomData<T>, PhantomData<U>, PhantomData<V>)
where
    T: RoleSet,
    U: RoleSet,
    V: RoleSet;

impl<T, U, V> RoleSet for Or3<T, U, V>
where
    T: RoleSet,
    U: RoleSet,
    V: RoleSet,
{
    fn roles() -> Vec<Role> {
        let mut roles = T::roles();
        roles.extend(U::roles());
        roles.extend(V::roles());
        roles
    }
}

//--------------------------------------------------------------------------------------------------
// Extract Error
//--------------------------------------------------------------------------------------------------

pub enum ExtractError {
    NoAuthorizationHeader,
    InvalidAuthorizationHeader,
    BadToken,
    NoRolesAcceptable,
    UserDoesNotHaveAcceptableRole,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

fn error_response_unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            code: "unauthorized",
            message: "Unauthorized".to_string(),
        }),
    )
        .into_response()
}

fn error_response_forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse {
            code: "forbidden",
            message: "Forbidden".to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        match self {
            ExtractError::NoAuthorizationHeader => error_response_unauthorized(),
            ExtractError::InvalidAuthorizationHeader => error_response_unauthorized(),
            ExtractError::BadToken => error_response_unauthorized(),
            ExtractError::NoRolesAcceptable => error_response_forbidden(),
            ExtractError::UserDoesNotHaveAcceptableRole => error_response_forbidden(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Decoding and validation function
//--------------------------------------------------------------------------------------------------

const AUTHORIZATION_HEADER: &str = "Authorization";
const AUTHORIZATION_BEARER_PREFIX: &str = "Bearer ";

fn validate_request<S>(parts: &mut Parts, state: &S) -> Result<ResolvedIdentity, ExtractError>
where
    S: TokenKeyProvider + Send + Sync,
{
    // Check to see if we already validated and resolved the token
    if let Some(identity) = parts.extensions.get::<ResolvedIdentity>() {
        debug!("Token already validated for {:?}", identity.user_id);
        return Ok(identity.clone());
    }

    let Some(auth_header) = parts.headers.get(AUTHORIZATION_HEADER) else {
        warn!("Request made with no Authorization header");
        return Err(ExtractError::NoAuthorizationHeader);
    };

    let Ok(auth_header_str) = auth_header.to_str() else {
        warn!("Request made with Authorization header with more than visible ASCII characters");
        return Err(ExtractError::InvalidAuthorizationHeader);
    };

    let Some(auth_token) = auth_header_str.strip_prefix(AUTHORIZATION_BEARER_PREFIX) else {
        warn!("Request made with Authorization header without Bearer prefix");
        return Err(ExtractError::InvalidAuthorizationHeader);
    };

    // Unlike the client, a service must check the signature before trusting any claim
    let mut validation = Validation::new(state.algorithm());
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);

    let claims = match decode::<ClaimSet>(auth_token, state.decoding_key(), &validation) {
        Ok(token) => token.claims,
        Err(err) => {
            return if *err.kind() == ErrorKind::InvalidToken {
                warn!("Request made with token that wasn't a JWT: {:?}", err);
                Err(ExtractError::InvalidAuthorizationHeader)
            } else {
                warn!("Request made with token that failed validation: {:?}", err);
                Err(ExtractError::BadToken)
            }
        }
    };

    // No development fallbacks on the server side
    let identity = ClaimResolver::new(false).identity(&claims);

    parts.extensions.insert(identity.clone());

    debug!("Token validated for {:?}", identity.user_id);

    Ok(identity)
}

//--------------------------------------------------------------------------------------------------
// Axum extractor to enforce role
//--------------------------------------------------------------------------------------------------

#[allow(private_bounds)]
pub struct RequireRole<T>(PhantomData<T>)
where
    T: RoleSet;

#[async_trait]
impl<S, T> FromRequestParts<S> for RequireRole<T>
where
    S: TokenKeyProvider + Send + Sync,
    T: RoleSet + Send + Sync,
{
    type Rejection = ExtractError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = validate_request(parts, state)?;

        let acceptable_roles = T::roles();

        // Check the roles isn't empty - that isn't allowed
        if acceptable_roles.is_empty() {
            error!("No acceptable roles provided for RequireRole");
            return Err(ExtractError::NoRolesAcceptable);
        }

        match identity.role {
            Some(role) if acceptable_roles.contains(&role) => {
                debug!("User {:?} has acceptable role {}", identity.user_id, role);
                Ok(RequireRole(PhantomData))
            }
            role => {
                warn!(
                    "User {:?} with role {:?} does not have acceptable role",
                    identity.user_id, role
                );
                Err(ExtractError::UserDoesNotHaveAcceptableRole)
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Axum extractor to get the resolved identity
//--------------------------------------------------------------------------------------------------

pub struct Identity(pub ResolvedIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: TokenKeyProvider + Send + Sync,
{
    type Rejection = ExtractError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = validate_request(parts, state)?;

        Ok(Identity(identity))
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
