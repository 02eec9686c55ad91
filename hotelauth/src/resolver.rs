use crate::error::AuthError;
use crate::internal::claims::{
    ClaimSet, LOCALITY_CLAIM, NAME_IDENTIFIER_CLAIM, ROLE_CLAIM, SID_CLAIM,
};
use crate::role::Role;
use crate::types::ResolvedIdentity;
use serde_json::Value;
use std::fmt::Display;
use tracing::{debug, warn};

//--------------------------------------------------------------------------------------------------
// Candidate claim names
//--------------------------------------------------------------------------------------------------

// Order matters: different backends populate different keys and the first present one wins

const ROLE_KEYS: &[&str] = &[ROLE_CLAIM, "role", "roles", "userRole", "user_role", "Role"];

const HOTEL_ID_KEYS: &[&str] = &[
    LOCALITY_CLAIM,
    "locality",
    "hotelId",
    "hotel_id",
    "hotel",
    "HotelId",
    "HOTELID",
];

const USER_ID_KEYS: &[&str] = &[
    SID_CLAIM,
    "sid",
    "sub",
    "subject",
    "id",
    "userId",
    "user_id",
    "nameidentifier",
    NAME_IDENTIFIER_CLAIM,
];

const ROLE_KEY_FRAGMENTS: &[&str] = &["role"];
const HOTEL_ID_KEY_FRAGMENTS: &[&str] = &["hotel", "locality", "property"];
const USER_ID_KEY_FRAGMENTS: &[&str] = &["sid", "nameidentifier", "userid", "sub"];

// Bounds (exclusive) for a bare number to pass as a hotel id
const PLAUSIBLE_ID_MIN: f64 = 0.0;
const PLAUSIBLE_ID_MAX: f64 = 10000.0;

const DEVELOPMENT_HOTEL_ID: i64 = 1;

//--------------------------------------------------------------------------------------------------
// Fields and resolved values
//--------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Role,
    HotelId,
    UserId,
}

impl Field {
    fn candidate_keys(self) -> &'static [&'static str] {
        match self {
            Field::Role => ROLE_KEYS,
            Field::HotelId => HOTEL_ID_KEYS,
            Field::UserId => USER_ID_KEYS,
        }
    }

    fn key_fragments(self) -> &'static [&'static str] {
        match self {
            Field::Role => ROLE_KEY_FRAGMENTS,
            Field::HotelId => HOTEL_ID_KEY_FRAGMENTS,
            Field::UserId => USER_ID_KEY_FRAGMENTS,
        }
    }

    fn key_matches(self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.key_fragments()
            .iter()
            .any(|fragment| key.contains(fragment))
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Role => "role",
            Field::HotelId => "hotel id",
            Field::UserId => "user id",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedClaim {
    Role(Role),
    HotelId(i64),
    UserId(String),
}

//--------------------------------------------------------------------------------------------------
// Resolver
//--------------------------------------------------------------------------------------------------

/// Finds the role, hotel id and user id in a claim set whose key names are not fixed.
///
/// Resolution runs in three phases and stops at the first hit:
///
/// 1. the field's known claim names, in order;
/// 2. a scan of every claim, in payload order, for a name that looks like the field (and, for the
///    hotel id, for a number small enough to be an id);
/// 3. in local development only, a default hotel id.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClaimResolver {
    local_development: bool,
}

impl ClaimResolver {
    pub fn new(local_development: bool) -> Self {
        Self { local_development }
    }

    pub fn local_development(&self) -> bool {
        self.local_development
    }

    pub fn resolve(&self, claims: &ClaimSet, field: Field) -> Result<ResolvedClaim, AuthError> {
        let found = find_exact(claims, field).or_else(|| find_heuristic(claims, field));

        let Some((key, value)) = found else {
            return match self.fallback(field) {
                Some(resolved) => Ok(resolved),
                None => {
                    debug!("No {} claim in token", field);
                    Err(AuthError::ClaimNotFound(field))
                }
            };
        };

        // A value that was found but can't be interpreted ends the search
        interpret(field, value).ok_or_else(|| {
            warn!("Claim {:?} has an unusable {} value: {}", key, field, value);
            AuthError::ClaimNotFound(field)
        })
    }

    pub fn role(&self, claims: &ClaimSet) -> Option<Role> {
        match self.resolve(claims, Field::Role) {
            Ok(ResolvedClaim::Role(role)) => Some(role),
            _ => None,
        }
    }

    pub fn hotel_id(&self, claims: &ClaimSet) -> Option<i64> {
        match self.resolve(claims, Field::HotelId) {
            Ok(ResolvedClaim::HotelId(hotel_id)) => Some(hotel_id),
            _ => None,
        }
    }

    pub fn user_id(&self, claims: &ClaimSet) -> Option<String> {
        match self.resolve(claims, Field::UserId) {
            Ok(ResolvedClaim::UserId(user_id)) => Some(user_id),
            _ => None,
        }
    }

    pub fn identity(&self, claims: &ClaimSet) -> ResolvedIdentity {
        ResolvedIdentity {
            role: self.role(claims),
            hotel_id: self.hotel_id(claims),
            user_id: self.user_id(claims),
            expires_at: claims.expires_at(),
        }
    }

    fn fallback(&self, field: Field) -> Option<ResolvedClaim> {
        match field {
            Field::HotelId if self.local_development => {
                warn!(
                    "Local development: using fallback hotel id {}",
                    DEVELOPMENT_HOTEL_ID
                );
                Some(ResolvedClaim::HotelId(DEVELOPMENT_HOTEL_ID))
            }
            _ => None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Search phases
//--------------------------------------------------------------------------------------------------

fn find_exact(claims: &ClaimSet, field: Field) -> Option<(&str, &Value)> {
    field.candidate_keys().iter().find_map(|key| {
        claims.get(key).map(|value| {
            debug!("Found {} using claim {:?}", field, key);
            (*key, value)
        })
    })
}

fn find_heuristic(claims: &ClaimSet, field: Field) -> Option<(&str, &Value)> {
    // Null claims count as absent here too, same as in the exact lookup
    let found = claims.iter().filter(|(_, value)| !value.is_null()).find(|(key, value)| {
        field.key_matches(key) || (field == Field::HotelId && is_plausible_id(value))
    });

    // Hotel ids are sometimes nested inside an object claim
    let found = match (found, field) {
        (None, Field::HotelId) => claims
            .iter()
            .find_map(|(_, value)| find_nested(value, field)),
        (found, _) => found,
    };

    if let Some((key, _)) = found {
        debug!("Found possible {} in claim {:?}", field, key);
    }
    found
}

fn find_nested(value: &Value, field: Field) -> Option<(&str, &Value)> {
    match value {
        Value::Object(entries) => entries.iter().find_map(|(key, value)| {
            if field.key_matches(key) && !value.is_null() {
                Some((key.as_str(), value))
            } else {
                find_nested(value, field)
            }
        }),
        Value::Array(items) => items.iter().find_map(|item| find_nested(item, field)),
        _ => None,
    }
}

fn is_plausible_id(value: &Value) -> bool {
    value
        .as_f64()
        .is_some_and(|n| n > PLAUSIBLE_ID_MIN && n < PLAUSIBLE_ID_MAX)
}

//--------------------------------------------------------------------------------------------------
// Value interpretation
//--------------------------------------------------------------------------------------------------

fn interpret(field: Field, value: &Value) -> Option<ResolvedClaim> {
    match field {
        Field::Role => role_from_value(value).map(ResolvedClaim::Role),
        Field::HotelId => integer_from_value(value).map(ResolvedClaim::HotelId),
        Field::UserId => string_from_value(value).map(ResolvedClaim::UserId),
    }
}

fn role_from_value(value: &Value) -> Option<Role> {
    // Multi-role tokens carry an array; the first role listed is the one that counts
    let claim = match value {
        Value::String(claim) => claim.as_str(),
        Value::Array(items) => items.iter().find_map(Value::as_str)?,
        _ => return None,
    };

    let role = Role::from_claim(claim);
    if role.is_none() {
        warn!("Unknown role in token: {}", claim);
    }
    role
}

fn integer_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_integer(s),
        _ => None,
    }
}

fn string_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Reads an optional sign and the digits that follow, ignoring any trailing text
fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let magnitude: i64 = unsigned[..end].parse().ok()?;

    Some(if negative { -magnitude } else { magnitude })
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> ClaimSet {
        serde_json::from_value(value).unwrap()
    }

    const PRODUCTION: ClaimResolver = ClaimResolver {
        local_development: false,
    };
    const DEVELOPMENT: ClaimResolver = ClaimResolver {
        local_development: true,
    };

    // Role

    #[test]
    fn role_from_long_form_claim() {
        let set = claims(json!({ ROLE_CLAIM: "ROLE_ADMIN" }));
        assert_eq!(
            PRODUCTION.resolve(&set, Field::Role),
            Ok(ResolvedClaim::Role(Role::Admin))
        );
    }

    #[test]
    fn long_form_role_wins_over_alias() {
        let set = claims(json!({ "role": "ROLE_WORKER", ROLE_CLAIM: "ROLE_OWNER" }));
        assert_eq!(PRODUCTION.role(&set), Some(Role::Owner));
    }

    #[test]
    fn role_from_any_role_like_claim() {
        let set = claims(json!({ "sub": "u1", "app_ROLE_name": "ROLE_WORKER" }));
        assert_eq!(PRODUCTION.role(&set), Some(Role::Worker));
    }

    #[test]
    fn role_from_array_claim() {
        let set = claims(json!({ "roles": ["ROLE_ADMIN", "ROLE_WORKER"] }));
        assert_eq!(PRODUCTION.role(&set), Some(Role::Admin));
    }

    #[test]
    fn missing_role_is_not_found_even_in_development() {
        let set = claims(json!({ "sub": "u1", "exp": 1 }));
        assert_eq!(
            PRODUCTION.resolve(&set, Field::Role),
            Err(AuthError::ClaimNotFound(Field::Role))
        );
        assert_eq!(DEVELOPMENT.role(&set), None);
    }

    #[test]
    fn unknown_role_is_not_found() {
        let set = claims(json!({ ROLE_CLAIM: "ROLE_GUEST" }));
        assert_eq!(
            PRODUCTION.resolve(&set, Field::Role),
            Err(AuthError::ClaimNotFound(Field::Role))
        );
    }

    #[test]
    fn unknown_exact_role_does_not_fall_through_to_scan() {
        let set = claims(json!({ "role": "ROLE_GUEST", "x_role": "ROLE_OWNER" }));
        assert_eq!(PRODUCTION.role(&set), None);
    }

    // Hotel id

    #[test]
    fn hotel_id_parsed_from_locality_string() {
        let set = claims(json!({ LOCALITY_CLAIM: "7" }));
        assert_eq!(
            PRODUCTION.resolve(&set, Field::HotelId),
            Ok(ResolvedClaim::HotelId(7))
        );
    }

    #[test]
    fn hotel_id_candidate_order() {
        let set = claims(json!({ "hotel": 3, "hotelId": 5, "locality": "9" }));
        assert_eq!(PRODUCTION.hotel_id(&set), Some(9));
    }

    #[test]
    fn hotel_id_from_short_alias() {
        let set = claims(json!({ "hotel": 3 }));
        assert_eq!(PRODUCTION.hotel_id(&set), Some(3));
    }

    #[test]
    fn hotel_id_from_key_substring() {
        let set = claims(json!({ "exp": 1700000000, "PropertyNumber": "12" }));
        assert_eq!(PRODUCTION.hotel_id(&set), Some(12));
    }

    #[test]
    fn hotel_id_from_plausible_number() {
        let set = claims(json!({ "exp": 1700000000, "big": 20000, "n": 42, "hotel_ref": 5 }));
        assert_eq!(PRODUCTION.hotel_id(&set), Some(42));
    }

    #[test]
    fn numbers_at_the_bounds_are_not_plausible_ids() {
        let set = claims(json!({ "a": 0, "b": 10000, "c": -5 }));
        assert_eq!(PRODUCTION.hotel_id(&set), None);
    }

    #[test]
    fn hotel_id_from_nested_claim() {
        let set = claims(json!({ "sub": "u1", "tenant": { "meta": { "hotelCode": "15" } } }));
        assert_eq!(PRODUCTION.hotel_id(&set), Some(15));
    }

    #[test]
    fn hotel_id_development_fallback() {
        let set = claims(json!({}));
        assert_eq!(
            DEVELOPMENT.resolve(&set, Field::HotelId),
            Ok(ResolvedClaim::HotelId(1))
        );
        assert_eq!(
            PRODUCTION.resolve(&set, Field::HotelId),
            Err(AuthError::ClaimNotFound(Field::HotelId))
        );
    }

    #[test]
    fn null_hotel_like_claims_are_skipped() {
        let set = claims(json!({ "hotelCode": null }));
        assert_eq!(
            DEVELOPMENT.resolve(&set, Field::HotelId),
            Ok(ResolvedClaim::HotelId(1))
        );
        assert_eq!(
            PRODUCTION.resolve(&set, Field::HotelId),
            Err(AuthError::ClaimNotFound(Field::HotelId))
        );

        let nested = claims(json!({ "hotelRef": null, "tenant": { "hotel": null, "hotelNo": 4 } }));
        assert_eq!(PRODUCTION.hotel_id(&nested), Some(4));
    }

    #[test]
    fn unparseable_hotel_id_is_not_found_and_skips_fallback() {
        let set = claims(json!({ "hotelId": "main-building" }));
        assert_eq!(PRODUCTION.hotel_id(&set), None);
        assert_eq!(DEVELOPMENT.hotel_id(&set), None);
    }

    #[test]
    fn hotel_id_strings_parse_like_leading_integers() {
        assert_eq!(parse_leading_integer("7"), Some(7));
        assert_eq!(parse_leading_integer("  12abc"), Some(12));
        assert_eq!(parse_leading_integer("-4"), Some(-4));
        assert_eq!(parse_leading_integer("+8"), Some(8));
        assert_eq!(parse_leading_integer("abc"), None);
        assert_eq!(parse_leading_integer(""), None);
        assert_eq!(parse_leading_integer("99999999999999999999"), None);
    }

    // User id

    #[test]
    fn user_id_from_sid() {
        let set = claims(json!({ "sub": "fallback", SID_CLAIM: "42" }));
        assert_eq!(
            PRODUCTION.resolve(&set, Field::UserId),
            Ok(ResolvedClaim::UserId("42".to_string()))
        );
    }

    #[test]
    fn numeric_user_id_becomes_string() {
        let set = claims(json!({ "userId": 17 }));
        assert_eq!(PRODUCTION.user_id(&set), Some("17".to_string()));
    }

    #[test]
    fn user_id_from_key_substring() {
        let set = claims(json!({ "exp": 1, "AccountUserID": "abc" }));
        assert_eq!(PRODUCTION.user_id(&set), Some("abc".to_string()));
    }

    #[test]
    fn missing_user_id_is_not_found() {
        let set = claims(json!({ "exp": 1, "role": "ROLE_OWNER" }));
        assert_eq!(DEVELOPMENT.user_id(&set), None);
    }

    // Identity

    #[test]
    fn identity_collects_every_field() {
        let set = claims(json!({
            ROLE_CLAIM: "ROLE_OWNER",
            LOCALITY_CLAIM: "7",
            NAME_IDENTIFIER_CLAIM: "owner-1",
            "exp": 1700000000,
        }));
        let identity = PRODUCTION.identity(&set);
        assert_eq!(identity.role, Some(Role::Owner));
        assert_eq!(identity.hotel_id, Some(7));
        assert_eq!(identity.user_id, Some("owner-1".to_string()));
        assert_eq!(identity.expires_at.map(|ts| ts.seconds()), Some(1700000000));
    }
}

//--------------------------------------------------------------------------------------------------
