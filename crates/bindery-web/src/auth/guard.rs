use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Method;

use bindery_core::{csrf, token, Claims};

use crate::auth::cookie;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor guarding the admin surface.
///
/// Pulls the session token from the `Authorization: Bearer` header or the
/// session cookie and verifies signature, expiry, and scope. For anything
/// other than GET/HEAD it additionally requires a non-empty CSRF token in
/// the `x-csrf-token` header. The CSRF value is only checked for presence;
/// there is no server-side store to cross-reference.
pub struct AdminUser {
    #[allow(dead_code)]
    pub claims: Claims,
}

/// Extracts the token from request parts, header first, cookie second.
pub fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string());

    bearer.or_else(|| {
        parts
            .headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .and_then(cookie::token_from_cookie_header)
    })
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = &state.config.auth.session_secret;
        if secret.is_empty() {
            return Err(AppError::ServiceUnavailable(
                "Authentication is not configured".to_string(),
            ));
        }

        let token = token_from_parts(parts)
            .ok_or_else(|| AppError::Auth("No token provided".to_string()))?;

        let claims = token::verify(secret, &token, crate::auth::unix_now()).map_err(|e| {
            tracing::warn!("Rejected admin token: {e}");
            AppError::Auth("Invalid or expired token".to_string())
        })?;

        if parts.method != Method::GET && parts.method != Method::HEAD {
            let csrf_header = parts
                .headers
                .get("x-csrf-token")
                .and_then(|v| v.to_str().ok());
            if !csrf::is_present(csrf_header) {
                return Err(AppError::Forbidden("Missing CSRF token".to_string()));
            }
        }

        Ok(AdminUser { claims })
    }
}

/// Token-verified admin identity without the CSRF gate.
///
/// For handlers that accept the CSRF token in their JSON body as a fallback
/// (clients that cannot set custom headers, e.g. `navigator.sendBeacon`);
/// those handlers call [`require_csrf`] themselves with both sources.
pub struct AdminToken {
    #[allow(dead_code)]
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = &state.config.auth.session_secret;
        if secret.is_empty() {
            return Err(AppError::ServiceUnavailable(
                "Authentication is not configured".to_string(),
            ));
        }

        let token = token_from_parts(parts)
            .ok_or_else(|| AppError::Auth("No token provided".to_string()))?;

        let claims = token::verify(secret, &token, crate::auth::unix_now()).map_err(|e| {
            tracing::warn!("Rejected admin token: {e}");
            AppError::Auth("Invalid or expired token".to_string())
        })?;

        Ok(AdminToken { claims })
    }
}

/// The CSRF presence gate for state-changing requests: header wins, body is
/// the fallback. Any non-empty value passes.
pub fn require_csrf(header: Option<&str>, body: Option<&str>) -> Result<(), AppError> {
    if csrf::is_present(header) || csrf::is_present(body) {
        return Ok(());
    }
    Err(AppError::Forbidden("Missing CSRF token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csrf_gate_accepts_either_source() {
        assert!(require_csrf(Some("tok"), None).is_ok());
        assert!(require_csrf(None, Some("tok")).is_ok());
        assert!(require_csrf(Some(""), Some("tok")).is_ok());
    }

    #[test]
    fn csrf_gate_rejects_absence() {
        assert!(matches!(
            require_csrf(None, None),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            require_csrf(Some(""), Some("  ")),
            Err(AppError::Forbidden(_))
        ));
    }
}
