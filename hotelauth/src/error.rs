use crate::resolver::Field;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Errors surfaced by token handling and the backend client
//--------------------------------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("token has expired")]
    ExpiredToken,
    #[error("no {0} claim could be resolved from the token")]
    ClaimNotFound(Field),
    #[error("transport failure: {0}")]
    TransportFailure(String),
    #[error("unauthorized")]
    Unauthorized,
}

impl AuthError {
    /// Whether the locally stored session must be dropped when this error is seen
    pub fn evicts_session(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken(_) | AuthError::ExpiredToken | AuthError::Unauthorized
        )
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AuthError::TransportFailure(format!("no response received from server: {}", err))
        } else {
            AuthError::TransportFailure(err.to_string())
        }
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
