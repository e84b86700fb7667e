//! Windowed login-attempt limiting.
//!
//! The limiter maps a client identifier (an address string) to the epoch
//! seconds of its recent failed attempts. Entries older than the window are
//! pruned before every check. State lives in process memory only: it is lost
//! on restart and under-counts across multiple instances, which is an
//! accepted property of this deployment.
//!
//! The window arithmetic ([`prune_window`], [`retry_after`]) is kept as pure
//! functions over slices so it can be tested without the shared map.

use dashmap::DashMap;

use crate::error::RateLimited;

/// Attempt budget for one identifier.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Failed attempts tolerated inside the window before rejecting.
    pub max_attempts: usize,
    /// Sliding window length in seconds.
    pub window_seconds: u64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 900,
        }
    }
}

/// Keeps attempts that are still inside the window at `now`.
pub fn prune_window(attempts: &[u64], now: u64, window_seconds: u64) -> Vec<u64> {
    let cutoff = now.saturating_sub(window_seconds);
    attempts.iter().copied().filter(|&t| t > cutoff).collect()
}

/// Seconds until the oldest in-window attempt ages out, never zero.
///
/// Returns 1 when `attempts` is empty so a 429 always carries a positive
/// retry hint.
pub fn retry_after(attempts: &[u64], now: u64, window_seconds: u64) -> u64 {
    attempts
        .iter()
        .min()
        .map(|&oldest| (oldest + window_seconds).saturating_sub(now).max(1))
        .unwrap_or(1)
}

/// Per-process failed-login limiter, injected into the server state.
pub struct LoginRateLimiter {
    attempts: DashMap<String, Vec<u64>>,
    policy: RateLimitPolicy,
}

impl LoginRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            attempts: DashMap::new(),
            policy,
        }
    }

    /// Checks whether `identifier` may attempt a login at `now`.
    ///
    /// Prunes the identifier's stale attempts as a side effect. Rejects with
    /// a retry-after duration once `max_attempts` failures sit inside the
    /// window.
    pub fn check(&self, identifier: &str, now: u64) -> Result<(), RateLimited> {
        let mut entry = self.attempts.entry(identifier.to_string()).or_default();
        let pruned = prune_window(&entry, now, self.policy.window_seconds);
        *entry = pruned;

        if entry.len() >= self.policy.max_attempts {
            let retry_after = retry_after(&entry, now, self.policy.window_seconds);
            tracing::warn!("Rate limited login attempts from {identifier}");
            return Err(RateLimited { retry_after });
        }

        Ok(())
    }

    /// Records one failed attempt for `identifier` at `now`.
    pub fn record_failure(&self, identifier: &str, now: u64) {
        self.attempts
            .entry(identifier.to_string())
            .or_default()
            .push(now);
    }

    /// Drops identifiers whose attempts have all aged out of the window.
    ///
    /// Called from a periodic background task so one-off visitors do not
    /// accumulate in the map forever.
    pub fn sweep(&self, now: u64) {
        let window = self.policy.window_seconds;
        self.attempts
            .retain(|_, attempts| attempts.iter().any(|&t| t > now.saturating_sub(window)));
    }

    #[cfg(test)]
    fn tracked_identifiers(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn limiter() -> LoginRateLimiter {
        LoginRateLimiter::new(RateLimitPolicy {
            max_attempts: 3,
            window_seconds: 60,
        })
    }

    #[test]
    fn prune_drops_only_stale_attempts() {
        let attempts = vec![NOW - 120, NOW - 61, NOW - 60, NOW - 59, NOW];
        let kept = prune_window(&attempts, NOW, 60);
        assert_eq!(kept, vec![NOW - 59, NOW]);
    }

    #[test]
    fn retry_after_counts_from_oldest() {
        let attempts = vec![NOW - 40, NOW - 10];
        assert_eq!(retry_after(&attempts, NOW, 60), 20);
    }

    #[test]
    fn retry_after_is_always_positive() {
        assert_eq!(retry_after(&[], NOW, 60), 1);
        // Oldest attempt about to age out still yields at least one second.
        assert_eq!(retry_after(&[NOW - 60], NOW, 60), 1);
    }

    #[test]
    fn under_budget_attempts_pass() {
        let limiter = limiter();
        limiter.record_failure("1.2.3.4", NOW);
        limiter.record_failure("1.2.3.4", NOW + 1);
        assert!(limiter.check("1.2.3.4", NOW + 2).is_ok());
    }

    #[test]
    fn over_budget_rejects_with_retry_after() {
        let limiter = limiter();
        for i in 0..3 {
            limiter.record_failure("1.2.3.4", NOW + i);
        }

        let err = limiter.check("1.2.3.4", NOW + 10).unwrap_err();
        // Oldest attempt at NOW leaves the window at NOW + 60.
        assert_eq!(err.retry_after, 50);
    }

    #[test]
    fn window_elapse_readmits() {
        let limiter = limiter();
        for i in 0..3 {
            limiter.record_failure("1.2.3.4", NOW + i);
        }
        assert!(limiter.check("1.2.3.4", NOW + 10).is_err());

        // All three attempts fall out of the window.
        assert!(limiter.check("1.2.3.4", NOW + 100).is_ok());
    }

    #[test]
    fn identifiers_are_independent() {
        let limiter = limiter();
        for i in 0..3 {
            limiter.record_failure("1.2.3.4", NOW + i);
        }
        assert!(limiter.check("1.2.3.4", NOW + 5).is_err());
        assert!(limiter.check("5.6.7.8", NOW + 5).is_ok());
    }

    #[test]
    fn sweep_drops_expired_identifiers() {
        let limiter = limiter();
        limiter.record_failure("stale", NOW - 300);
        limiter.record_failure("fresh", NOW - 5);
        assert_eq!(limiter.tracked_identifiers(), 2);

        limiter.sweep(NOW);
        assert_eq!(limiter.tracked_identifiers(), 1);
        assert!(limiter.check("fresh", NOW).is_ok());
    }
}
