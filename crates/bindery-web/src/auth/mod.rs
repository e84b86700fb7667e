pub mod cookie;
pub mod guard;
pub mod password;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in seconds.
///
/// Handlers read the clock once here and pass it into the core token and
/// rate-limit functions, which take time explicitly.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
