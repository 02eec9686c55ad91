//! Decoding of the compact `header.payload.signature` token format.
//!
//! Only the payload is read. The signature is never checked here: the backend that issued the
//! token is the authority on it, and the client only needs the claims to decide what to show.

use crate::error::AuthError;
use crate::internal::claims::ClaimSet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::{Map, Value};

//--------------------------------------------------------------------------------------------------

const SEGMENT_DELIMITER: char = '.';
const SEGMENT_COUNT: usize = 3;
const PAYLOAD_SEGMENT: usize = 1;

/// Decodes the payload of `token` into its claims.
///
/// Fails with [`AuthError::MalformedToken`] when the token does not have exactly three segments,
/// the payload is not base64, or the decoded payload is not a JSON object.
pub fn decode(token: &str) -> Result<ClaimSet, AuthError> {
    let segments: Vec<&str> = token.split(SEGMENT_DELIMITER).collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(AuthError::MalformedToken(format!(
            "expected {} segments, found {}",
            SEGMENT_COUNT,
            segments.len()
        )));
    }

    let payload = decode_segment(segments[PAYLOAD_SEGMENT])?;

    let claims: Map<String, Value> = serde_json::from_slice(&payload).map_err(|err| {
        AuthError::MalformedToken(format!("payload is not a JSON object: {}", err))
    })?;

    Ok(ClaimSet::from(claims))
}

// Accepts padded input and the standard alphabet as well as strict base64url
fn decode_segment(segment: &str) -> Result<Vec<u8>, AuthError> {
    let normalised: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    URL_SAFE_NO_PAD
        .decode(normalised)
        .map_err(|err| AuthError::MalformedToken(format!("payload is not base64url: {}", err)))
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
