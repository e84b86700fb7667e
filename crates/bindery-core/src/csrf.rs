//! CSRF tokens.
//!
//! An opaque random value handed out at login and echoed back on
//! state-changing requests. There is no server-side store cross-checking the
//! value: the gate is a presence check, not a cryptographic guarantee.

use rand::RngCore;

/// Generates a fresh CSRF token: 32 random bytes, lowercase hex.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The presence check applied to state-changing requests.
pub fn is_present(candidate: Option<&str>) -> bool {
    candidate.map(|t| !t.trim().is_empty()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_hex_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn presence_check() {
        assert!(is_present(Some("anything")));
        assert!(!is_present(Some("")));
        assert!(!is_present(Some("   ")));
        assert!(!is_present(None));
    }
}
