use crate::error::AuthError;
use crate::role::Role;
use crate::types::{AccessToken, Credentials, SignUpRequest};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

//--------------------------------------------------------------------------------------------------
// Trait for the authentication endpoints of the backend
//--------------------------------------------------------------------------------------------------

#[async_trait]
pub trait Backend: Send + Sync {
    /// `Ok(None)` when the backend answered successfully but did not issue a token
    async fn sign_in(&self, credentials: &Credentials) -> Result<Option<AccessToken>, AuthError>;

    async fn sign_up(&self, role: Role, request: &SignUpRequest) -> Result<bool, AuthError>;
}

//--------------------------------------------------------------------------------------------------
// Types for the constant strings in the request
//--------------------------------------------------------------------------------------------------

pub struct AccountStateActive;

impl Serialize for AccountStateActive {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const ACCOUNT_STATE: &str = "ACTIVE";
        ACCOUNT_STATE.serialize(serializer)
    }
}

//--------------------------------------------------------------------------------------------------
// Request and response bodies
//--------------------------------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
    roles_id: u8,
}

impl<'a> From<&'a Credentials> for SignInBody<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        SignInBody {
            email: &credentials.email,
            password: &credentials.password,
            roles_id: credentials.role.id(),
        }
    }
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(default)]
    token: Option<AccessToken>,
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    id: u64,
    username: &'a str,
    name: &'a str,
    surname: &'a str,
    email: &'a str,
    phone: &'a str,
    state: AccountStateActive,
    password: &'a str,
}

impl<'a> From<&'a SignUpRequest> for SignUpBody<'a> {
    fn from(request: &'a SignUpRequest) -> Self {
        SignUpBody {
            id: request.id,
            username: &request.username,
            name: &request.name,
            surname: &request.surname,
            email: &request.email,
            phone: &request.phone,
            state: AccountStateActive,
            password: &request.password,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// HTTP implementation
//--------------------------------------------------------------------------------------------------

const SIGN_IN_PATH: &str = "sign-in";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn sign_up_path(role: Role) -> &'static str {
    match role {
        Role::Owner => "sign-up-owner",
        Role::Admin => "sign-up-admin",
        Role::Worker => "sign-up-worker",
    }
}

/// Talks to the backend's authentication controller, e.g.
/// `https://localhost:44390/api/v1/authentication`
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

// 401 gets its own error so callers know to drop the session
async fn check_status(response: Response) -> Result<Response, AuthError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        warn!("Backend rejected the request as unauthorized");
        return Err(AuthError::Unauthorized);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("Backend responded with {}", status);
        let details = if body.is_empty() {
            "No error details".to_string()
        } else {
            body
        };
        return Err(AuthError::TransportFailure(format!(
            "server responded with {} - {}",
            status, details
        )));
    }

    Ok(response)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Option<AccessToken>, AuthError> {
        debug!("Signing in {} as {}", credentials.email, credentials.role);

        let response = self
            .client
            .post(self.endpoint(SIGN_IN_PATH))
            .json(&SignInBody::from(credentials))
            .send()
            .await?;
        let response = check_status(response).await?;

        if response.status() != StatusCode::OK {
            warn!("Sign-in answered with {}, no token issued", response.status());
            return Ok(None);
        }

        let body: SignInResponse = response.json().await?;
        Ok(body.token)
    }

    async fn sign_up(&self, role: Role, request: &SignUpRequest) -> Result<bool, AuthError> {
        debug!("Signing up {} as {}", request.email, role);

        let response = self
            .client
            .post(self.endpoint(sign_up_path(role)))
            .json(&SignUpBody::from(request))
            .send()
            .await?;
        let response = check_status(response).await?;

        Ok(response.status() == StatusCode::OK)
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
