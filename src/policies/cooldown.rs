//! # Cooldown guard for rotation.
//!
//! [`CooldownGuard`] is a passive deadline: arming it records `now + duration`,
//! and the guard reads as [`RotationState::Cooldown`] until a later `now` passes
//! the deadline. Nothing sleeps and nothing fires when it lapses.
//!
//! ```text
//!   arm(t0) ──► Cooldown ──(now >= t0 + duration)──► Idle
//! ```
//!
//! A guard with `duration = 0` never blocks.

use std::time::{Duration, Instant};

use tracing::warn;

/// Interval between accepted `next` calls.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Longest interval a guard honors; longer ones are cut down to it.
pub const MAX_COOLDOWN: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Observable state of the rotation guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationState {
    /// `next` is accepted.
    Idle,
    /// `next` is rejected until `until`.
    Cooldown {
        /// Deadline after which the guard is idle again.
        until: Instant,
    },
}

/// Deadline-based rate guard.
#[derive(Clone, Copy, Debug)]
pub struct CooldownGuard {
    duration: Duration,
    until: Option<Instant>,
}

impl CooldownGuard {
    /// Creates an idle guard with the given interval, capped at [`MAX_COOLDOWN`].
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: duration.min(MAX_COOLDOWN),
            until: None,
        }
    }

    /// Configured interval.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// State as observed at `now`.
    pub fn state(&self, now: Instant) -> RotationState {
        match self.until {
            Some(until) if now < until => RotationState::Cooldown { until },
            _ => RotationState::Idle,
        }
    }

    /// True when the guard blocks at `now`.
    pub fn is_cooling(&self, now: Instant) -> bool {
        matches!(self.state(now), RotationState::Cooldown { .. })
    }

    /// Starts a new cooldown period at `now`.
    ///
    /// A deadline past what `Instant` can represent leaves the guard idle.
    pub fn arm(&mut self, now: Instant) {
        self.until = now.checked_add(self.duration);
        if self.until.is_none() {
            warn!(duration = ?self.duration, "cooldown deadline out of range; not armed");
        }
    }

    /// Time left at `now` (zero when idle).
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.state(now) {
            RotationState::Cooldown { until } => until - now,
            RotationState::Idle => Duration::ZERO,
        }
    }
}

impl Default for CooldownGuard {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let guard = CooldownGuard::new(Duration::from_secs(10));
        assert_eq!(guard.state(Instant::now()), RotationState::Idle);
    }

    #[test]
    fn test_cooling_until_deadline() {
        let mut guard = CooldownGuard::new(Duration::from_secs(10));
        let t0 = Instant::now();
        guard.arm(t0);

        assert!(guard.is_cooling(t0));
        assert!(guard.is_cooling(t0 + Duration::from_millis(9_999)));
        assert_eq!(guard.remaining(t0 + Duration::from_secs(4)), Duration::from_secs(6));
        assert!(!guard.is_cooling(t0 + Duration::from_secs(10)));
        assert_eq!(guard.remaining(t0 + Duration::from_secs(11)), Duration::ZERO);
    }

    #[test]
    fn test_oversized_duration_is_capped() {
        let mut guard = CooldownGuard::new(Duration::from_secs(u64::MAX));
        assert_eq!(guard.duration(), MAX_COOLDOWN);

        let t0 = Instant::now();
        guard.arm(t0);
        assert!(guard.is_cooling(t0 + Duration::from_secs(3600)));
        assert_eq!(guard.remaining(t0), MAX_COOLDOWN);
    }

    #[test]
    fn test_zero_duration_never_blocks() {
        let mut guard = CooldownGuard::new(Duration::ZERO);
        let t0 = Instant::now();
        guard.arm(t0);
        assert!(!guard.is_cooling(t0));
    }
}
