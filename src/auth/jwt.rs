//! Access token claims.
//!
//! The client never verifies signatures; the backend does. Claims are read only to learn
//! the user id and expiry.

use jsonwebtoken::{DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
struct RawClaims {
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default, rename = "userId")]
    user_id_camel: Option<Value>,
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Claims the client cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Option<i64>,
    /// Expiry in seconds since the epoch.
    pub exp: Option<i64>,
}

fn numeric(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Decode the claims of a JWT without verifying it. `None` if `token` is not a JWT.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = match jsonwebtoken::decode::<RawClaims>(
        token,
        &DecodingKey::from_secret(&[]),
        &validation,
    ) {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!("Token is not a readable JWT: {}", e);
            return None;
        }
    };

    let claims = data.claims;
    // First id claim present wins, even if it is not numeric.
    let user_id = claims
        .user_id
        .or(claims.user_id_camel)
        .or(claims.sub)
        .and_then(|v| numeric(&v));

    Some(TokenClaims {
        user_id,
        exp: claims.exp,
    })
}
