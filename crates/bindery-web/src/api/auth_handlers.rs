use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use bindery_core::{csrf, token, TokenError};

use crate::auth::cookie::build_session_cookie;
use crate::auth::{cookie, unix_now};
use crate::dto::{LoginRequest, LoginResponse, VerifyResponse};
use crate::error::AppError;
use crate::state::AppState;

/// The client identity used for rate limiting: first `x-forwarded-for`
/// entry when a proxy supplied one, otherwise the peer address.
fn client_identifier(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}

pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    if body.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    let auth = &state.config.auth;
    if auth.session_secret.is_empty() || auth.admin_password_hash.is_empty() {
        // Fail closed rather than running with no secret.
        return Err(AppError::ServiceUnavailable(
            "Authentication is not configured".to_string(),
        ));
    }

    let identifier = client_identifier(&headers, peer);
    let now = unix_now();

    state
        .login_limiter
        .check(&identifier, now)
        .map_err(|e| AppError::RateLimited {
            retry_after: e.retry_after,
        })?;

    let hash = auth.admin_password_hash.clone();
    let password = body.password;

    let valid = tokio::task::spawn_blocking(move || {
        crate::auth::password::verify_password(&hash, &password)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if !valid {
        state.login_limiter.record_failure(&identifier, now);
        tracing::warn!("Failed login attempt from {identifier}");
        // Same message for wrong password and absent configuration details.
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let ttl = auth.session_ttl_seconds;
    let (token, _exp) = token::issue(&auth.session_secret, now, ttl)
        .map_err(|e| AppError::Internal(format!("Token issuance failed: {e}")))?;
    let csrf_token = csrf::generate_token();

    tracing::info!("Admin login from {identifier}");

    let response = Json(LoginResponse {
        token: token.clone(),
        csrf_token,
        expires_in: ttl,
        message: "Login successful".to_string(),
    });

    Ok((
        [(header::SET_COOKIE, build_session_cookie(&token, ttl))],
        response,
    )
        .into_response())
}

/// `GET /api/auth/verify`.
///
/// Unlike the other handlers this one answers its own error bodies: the
/// contract is `{ valid, … }` on every outcome, not the generic envelope.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let secret = &state.config.auth.session_secret;
    if secret.is_empty() {
        return verify_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error",
        );
    }

    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string());
    let token = bearer.or_else(|| {
        headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .and_then(cookie::token_from_cookie_header)
    });

    let Some(token) = token else {
        return verify_failure(StatusCode::UNAUTHORIZED, "No token provided");
    };

    let now = unix_now();
    match token::verify(secret, &token, now) {
        Ok(claims) => Json(VerifyResponse {
            valid: true,
            exp: Some(claims.exp),
            time_to_expiry: Some(claims.exp - now),
            error: None,
        })
        .into_response(),
        Err(TokenError::Expired(_)) => verify_failure(StatusCode::UNAUTHORIZED, "Token expired"),
        Err(TokenError::WrongScope(_)) => {
            verify_failure(StatusCode::UNAUTHORIZED, "Invalid token scope")
        }
        Err(_) => verify_failure(StatusCode::UNAUTHORIZED, "Invalid token"),
    }
}

fn verify_failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(VerifyResponse {
            valid: false,
            exp: None,
            time_to_expiry: None,
            error: Some(message.to_string()),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "203.0.113.9:51234".parse().unwrap()
    }

    #[test]
    fn forwarded_for_takes_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.7, 10.0.0.1"),
        );
        assert_eq!(client_identifier(&headers, peer()), "198.51.100.7");
    }

    #[test]
    fn falls_back_to_peer_address() {
        assert_eq!(client_identifier(&HeaderMap::new(), peer()), "203.0.113.9");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        assert_eq!(client_identifier(&headers, peer()), "203.0.113.9");
    }
}
