use crate::internal::unixtime::UnixTimestamp;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::{json, Value};

//--------------------------------------------------------------------------------------------------
// Token builders shared by the unit tests
//--------------------------------------------------------------------------------------------------

/// An unsigned token carrying the given payload. The signature segment is junk, which is fine
/// because nothing on the client verifies it.
pub(crate) fn token_with(payload: &Value) -> String {
    let header = json!({"alg": "HS256", "typ": "JWT"});
    format!(
        "{}.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

/// `payload` with an `exp` claim `offset` seconds from now
pub(crate) fn token_expiring_in(offset: i64, mut payload: Value) -> String {
    let exp = UnixTimestamp::now().add_seconds(offset).seconds();
    if let Value::Object(claims) = &mut payload {
        claims.insert("exp".to_string(), json!(exp));
    }
    token_with(&payload)
}

//--------------------------------------------------------------------------------------------------
