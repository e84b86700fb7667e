//! Error types for `bindery-core`.

/// Why a session token failed to issue or verify.
///
/// Verification distinguishes signature failures from expiry so callers can
/// log them differently, but both map to the same client-facing 401.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token does not split into header/payload/signature or the payload
    /// is not valid base64/JSON.
    #[error("malformed token")]
    Malformed,

    /// The recomputed signature over header+payload does not match.
    #[error("token signature mismatch")]
    BadSignature,

    /// The current time is at or past the encoded expiry.
    #[error("token expired at {0}")]
    Expired(u64),

    /// The payload carries a scope other than the expected one.
    #[error("unexpected token scope: {0}")]
    WrongScope(String),

    /// Signing failed while issuing a token.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Returned by the rate limiter when an identifier is over its budget.
///
/// `retry_after` is the number of seconds until the oldest still-counted
/// attempt leaves the window, never zero.
#[derive(Debug, thiserror::Error)]
#[error("too many attempts, retry in {retry_after}s")]
pub struct RateLimited {
    pub retry_after: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_error_displays_expiry() {
        let err = TokenError::Expired(1_700_000_000);
        assert_eq!(err.to_string(), "token expired at 1700000000");
    }

    #[test]
    fn rate_limited_displays_retry_after() {
        let err = RateLimited { retry_after: 42 };
        assert_eq!(err.to_string(), "too many attempts, retry in 42s");
    }
}
