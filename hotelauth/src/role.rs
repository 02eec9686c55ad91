use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Roles a hotel user can sign in with
//--------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    Admin,
    Worker,
}

const ROLE_OWNER: &str = "ROLE_OWNER";
const ROLE_ADMIN: &str = "ROLE_ADMIN";
const ROLE_WORKER: &str = "ROLE_WORKER";

impl Role {
    /// Maps the value of a role claim. Anything other than the three known role strings is not a
    /// role.
    pub fn from_claim(value: &str) -> Option<Self> {
        match value {
            ROLE_OWNER => Some(Role::Owner),
            ROLE_ADMIN => Some(Role::Admin),
            ROLE_WORKER => Some(Role::Worker),
            _ => None,
        }
    }

    /// Numeric id the backend uses for the role when signing in
    pub fn id(self) -> u8 {
        match self {
            Role::Owner => 1,
            Role::Admin => 2,
            Role::Worker => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Owner),
            2 => Some(Role::Admin),
            3 => Some(Role::Worker),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Worker => "worker",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(String);

// Accepts the short names, the claim strings and the numeric ids
impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(role) = Role::from_claim(s) {
            return Ok(role);
        }
        if let Some(role) = s.parse::<u8>().ok().and_then(Role::from_id) {
            return Ok(role);
        }
        match s.to_ascii_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "worker" => Ok(Role::Worker),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_claim_values() {
        assert_eq!(Role::from_claim("ROLE_OWNER"), Some(Role::Owner));
        assert_eq!(Role::from_claim("ROLE_ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_claim("ROLE_WORKER"), Some(Role::Worker));
    }

    #[test]
    fn unknown_claim_values_are_not_roles() {
        assert_eq!(Role::from_claim("ROLE_GUEST"), None);
        assert_eq!(Role::from_claim("role_owner"), None);
        assert_eq!(Role::from_claim(""), None);
    }

    #[test]
    fn ids_round_trip() {
        for role in [Role::Owner, Role::Admin, Role::Worker] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
    }

    #[test]
    fn parses_names_claims_and_ids() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("ROLE_WORKER".parse::<Role>(), Ok(Role::Worker));
        assert_eq!("1".parse::<Role>(), Ok(Role::Owner));
        assert_eq!(
            "manager".parse::<Role>().unwrap_err().to_string(),
            "unknown role 'manager'"
        );
    }
}

//--------------------------------------------------------------------------------------------------
