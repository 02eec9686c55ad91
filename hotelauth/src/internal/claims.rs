use crate::internal::unixtime::UnixTimestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

//--------------------------------------------------------------------------------------------------
// Claim names issued by the backend
//--------------------------------------------------------------------------------------------------

pub const ROLE_CLAIM: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
pub const LOCALITY_CLAIM: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/locality";
pub const SID_CLAIM: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/sid";
pub const NAME_IDENTIFIER_CLAIM: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
pub const EXPIRATION_CLAIM: &str = "exp";

//--------------------------------------------------------------------------------------------------
// JWT Claims object
//--------------------------------------------------------------------------------------------------

/// The decoded payload of a token. There is no fixed schema, so claims are kept as JSON values in
/// the order the payload listed them.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    /// The claim's value, treating an explicit JSON null as absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn expires_at_seconds(&self) -> Option<i64> {
        match self.get(EXPIRATION_CLAIM)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn expires_at(&self) -> Option<UnixTimestamp> {
        self.expires_at_seconds()
            .and_then(UnixTimestamp::from_seconds)
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(claims: Map<String, Value>) -> Self {
        ClaimSet(claims)
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
