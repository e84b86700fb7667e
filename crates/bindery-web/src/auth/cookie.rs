//! Session cookie plumbing.
//!
//! The login response sets the token as a cookie so the static admin pages
//! can call the API without holding the token in script-accessible storage;
//! the verifier accepts either the cookie or a bearer header.

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "bindery_session";

/// Builds the `Set-Cookie` value for a freshly issued token.
pub fn build_session_cookie(token: &str, max_age_seconds: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_seconds}")
}

/// Pulls the session token out of a `Cookie` request header value.
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        let cookie = build_session_cookie("tok123", 7200);
        assert!(cookie.starts_with("bindery_session=tok123; "));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=7200"));
    }

    #[test]
    fn parses_among_other_cookies() {
        let header = "theme=dark; bindery_session=abc.def.ghi; lang=en";
        assert_eq!(
            token_from_cookie_header(header),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn absent_or_empty_cookie_is_none() {
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header("bindery_session="), None);
        assert_eq!(token_from_cookie_header(""), None);
    }
}
