//! Client-side JWT inspection.
//!
//! The backend signs tokens; this client only ever needs to know whether a
//! token is still usable before attaching it to a request. That means
//! decoding the payload segment and comparing `exp` against the clock.
//! Signature verification stays on the server, which holds the key.

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Payload fields the client cares about. Everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub exp: i64,
    #[serde(default)]
    pub sub: Option<String>,
}

/// Decodes the payload segment of a compact JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let mut segments = token.split('.');
    let _header = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("token has no header segment"))?;
    let payload = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("token has no payload segment"))?;

    let raw = URL_SAFE_NO_PAD
        .decode(payload)
        .context("token payload is not valid base64url")?;
    let claims: Claims =
        serde_json::from_slice(&raw).context("token payload is not valid JSON")?;
    Ok(claims)
}

/// True when the token decodes and its `exp` lies in the future.
/// Malformed tokens are invalid, never an error: the caller's reaction is
/// the same either way (drop the session, ask the user to log in again).
pub fn token_is_valid(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.exp > now.timestamp(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_token(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_decode_claims() {
        let token = make_token(serde_json::json!({
            "exp": 1_900_000_000i64,
            "sub": "marcelo@demo.com"
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, 1_900_000_000);
        assert_eq!(claims.sub.as_deref(), Some("marcelo@demo.com"));
    }

    #[test]
    fn test_future_exp_is_valid() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let token = make_token(serde_json::json!({ "exp": 1_700_000_100i64 }));
        assert!(token_is_valid(&token, now));
    }

    #[test]
    fn test_past_exp_is_rejected() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let token = make_token(serde_json::json!({ "exp": 1_699_999_900i64 }));
        assert!(!token_is_valid(&token, now));
    }

    #[test]
    fn test_exp_equal_to_now_is_rejected() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let token = make_token(serde_json::json!({ "exp": 1_700_000_000i64 }));
        assert!(!token_is_valid(&token, now));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let now = Utc::now();
        assert!(!token_is_valid("", now));
        assert!(!token_is_valid("not-a-jwt", now));
        assert!(!token_is_valid("a.b.c", now));

        // Valid base64 but not JSON
        let garbage = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"garbage"));
        assert!(!token_is_valid(&garbage, now));

        // Valid JSON but no exp
        let no_exp = make_token(serde_json::json!({ "sub": "x" }));
        assert!(!token_is_valid(&no_exp, now));
    }
}
