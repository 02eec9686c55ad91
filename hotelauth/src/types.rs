use crate::internal::unixtime::UnixTimestamp;
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

//--------------------------------------------------------------------------------------------------
// Access token returned by the backend
//--------------------------------------------------------------------------------------------------

#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        AccessToken(token)
    }
}

// Tokens end up in logs through Debug, so only show that one is there
impl Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(..)")
    }
}

//--------------------------------------------------------------------------------------------------
// Sign-in and sign-up inputs
//--------------------------------------------------------------------------------------------------

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role,
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .field("role", &self.role)
            .finish()
    }
}

/// Registration details for a new owner, admin or worker. `id` is the person's national id
/// (DNI) for admins and workers.
#[derive(Clone)]
pub struct SignUpRequest {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

//--------------------------------------------------------------------------------------------------
// Identity derived from a token
//--------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub role: Option<Role>,
    pub hotel_id: Option<i64>,
    pub user_id: Option<String>,
    pub expires_at: Option<UnixTimestamp>,
}

impl Display for ResolvedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn or_unknown<T: Display>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map_or_else(|| "unknown".to_string(), ToString::to_string)
        }

        write!(
            f,
            "role: {}, hotel id: {}, user id: {}, expires: {}",
            or_unknown(&self.role),
            or_unknown(&self.hotel_id),
            or_unknown(&self.user_id),
            or_unknown(&self.expires_at)
        )
    }
}

//--------------------------------------------------------------------------------------------------
