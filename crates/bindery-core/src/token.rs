//! Stateless session tokens.
//!
//! Tokens are HS256 JWTs: a header, a payload carrying issue time, expiry,
//! and a scope tag, and an HMAC signature over the first two parts. Nothing
//! is persisted server-side; a token is valid exactly when its signature
//! checks out against the shared secret and its expiry has not passed.
//!
//! Both [`issue`] and [`verify`] take the current time explicitly instead of
//! reading the clock, so expiry behavior is testable without sleeping.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// The only permission class issued by this system.
pub const ADMIN_SCOPE: &str = "admin";

/// Signed token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issue time, Unix seconds.
    pub iat: u64,
    /// Expiry, Unix seconds. The token is invalid once `now >= exp`.
    pub exp: u64,
    /// Permission class tag, always [`ADMIN_SCOPE`] for issued tokens.
    pub scope: String,
}

/// Issues a signed admin token valid for `ttl_seconds` from `now`.
///
/// Returns the encoded token and its expiry timestamp.
pub fn issue(secret: &str, now: u64, ttl_seconds: u64) -> Result<(String, u64), TokenError> {
    let exp = now + ttl_seconds;
    let claims = Claims {
        iat: now,
        exp,
        scope: ADMIN_SCOPE.to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))?;

    Ok((token, exp))
}

/// Verifies a token against the shared secret at the given time.
///
/// Checks, in order: signature over header+payload, payload decodability,
/// expiry against `now`, and the scope tag. A pure function of
/// `(token, now, secret)` with no side effects.
pub fn verify(secret: &str, token: &str, now: u64) -> Result<Claims, TokenError> {
    // Expiry is checked against the caller-supplied clock below, not the
    // system clock inside the JWT library.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        _ => TokenError::Malformed,
    })?;

    let claims = data.claims;

    if now >= claims.exp {
        return Err(TokenError::Expired(claims.exp));
    }

    if claims.scope != ADMIN_SCOPE {
        return Err(TokenError::WrongScope(claims.scope));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";
    const NOW: u64 = 1_700_000_000;
    const TTL: u64 = 7200;

    #[test]
    fn round_trip_before_expiry() {
        let (token, exp) = issue(SECRET, NOW, TTL).unwrap();
        assert_eq!(exp, NOW + TTL);

        let claims = verify(SECRET, &token, NOW + TTL - 1).unwrap();
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, exp);
        assert_eq!(claims.scope, ADMIN_SCOPE);
    }

    #[test]
    fn rejected_at_and_after_expiry() {
        let (token, exp) = issue(SECRET, NOW, TTL).unwrap();

        match verify(SECRET, &token, exp) {
            Err(TokenError::Expired(at)) => assert_eq!(at, exp),
            other => panic!("expected Expired, got {other:?}"),
        }
        assert!(matches!(
            verify(SECRET, &token, exp + 3600),
            Err(TokenError::Expired(_))
        ));
    }

    #[test]
    fn wrong_secret_fails_signature() {
        let (token, _) = issue(SECRET, NOW, TTL).unwrap();
        assert!(matches!(
            verify("another-secret-another-secret-xx", &token, NOW + 1),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn tampered_payload_fails() {
        let (token, _) = issue(SECRET, NOW, TTL).unwrap();

        // Flip one character inside the payload segment.
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        assert_eq!(parts.len(), 3);
        let mut payload: Vec<u8> = parts[1].clone().into_bytes();
        payload[4] = if payload[4] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        assert!(verify(SECRET, &tampered, NOW + 1).is_err());
    }

    #[test]
    fn tampered_signature_fails() {
        let (token, _) = issue(SECRET, NOW, TTL).unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut sig: Vec<u8> = parts[2].clone().into_bytes();
        sig[0] = if sig[0] == b'A' { b'B' } else { b'A' };
        parts[2] = String::from_utf8(sig).unwrap();
        let tampered = parts.join(".");

        assert!(matches!(
            verify(SECRET, &tampered, NOW + 1),
            Err(TokenError::BadSignature) | Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn truncated_token_is_malformed() {
        assert!(matches!(
            verify(SECRET, "not.a-token", NOW),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(verify(SECRET, "", NOW), Err(TokenError::Malformed)));
    }

    #[test]
    fn foreign_scope_is_rejected() {
        // Hand-roll a token with a different scope using the same key.
        let claims = Claims {
            iat: NOW,
            exp: NOW + TTL,
            scope: "reader".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        match verify(SECRET, &token, NOW + 1) {
            Err(TokenError::WrongScope(scope)) => assert_eq!(scope, "reader"),
            other => panic!("expected WrongScope, got {other:?}"),
        }
    }
}
