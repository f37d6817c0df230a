use std::time::Duration;

use rand::Rng;

/// Retry policy for one class of operations.
///
/// Pure data — the five numeric/boolean fields that distinguish the named
/// presets. Delay for attempt `n` (zero-based) is
/// `min(initial_delay * backoff_factor^n, max_delay)`, plus, when jitter
/// is enabled, a uniformly random extra in `[0, delay/2]`, floored to
/// whole milliseconds.
///
/// The executor imposes no wall-clock deadline across a retry sequence;
/// the worst-case totals quoted on each preset are documentation, an
/// emergent property of `max_retries` and `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum retries after the initial attempt. The operation is
    /// invoked at most `max_retries + 1` times.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for the computed (pre-jitter) delay.
    pub max_delay: Duration,
    /// Multiplier applied to the delay on each successive retry.
    pub backoff_factor: f64,
    /// Whether to add random jitter, decorrelating concurrent callers.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::interactive()
    }
}

impl RetryPolicy {
    /// Preset for interactive API calls (chapter fetches, image lookups):
    /// 3 retries, 500 ms initial, capped at 10 s, factor 2.0, jitter on.
    /// Worst case ≈ 3.5 s of delay before jitter.
    pub fn interactive() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
        }
    }

    /// Preset for long-running generation jobs (illustration rendering):
    /// 5 retries, 2 s initial, capped at 60 s, factor 2.0, jitter on.
    /// Worst case ≈ 62 s of delay before jitter.
    pub fn generation() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            backoff_factor: 2.0,
            jitter: true,
        }
    }

    /// Single attempt, for non-idempotent calls.
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_factor: 1.0,
            jitter: false,
        }
    }

    /// Validates policy invariants.
    ///
    /// # Panics
    ///
    /// Panics if `backoff_factor` is below 1.0 or not finite — either
    /// would break delay monotonicity.
    pub fn validate(&self) {
        assert!(
            self.backoff_factor >= 1.0 && self.backoff_factor.is_finite(),
            "backoff_factor must be finite and >= 1.0"
        );
    }

    /// Computed delay before retry `attempt` (zero-based), without jitter.
    ///
    /// Non-decreasing in `attempt` and capped at `max_delay`.
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        let initial = self.initial_delay.as_millis() as f64;
        let max = self.max_delay.as_millis() as f64;
        let delay = (initial * self.backoff_factor.powi(attempt as i32)).min(max);
        Duration::from_millis(delay as u64)
    }

    /// Delay before retry `attempt`, with jitter applied when enabled.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay_for(attempt).as_millis() as u64;
        if !self.jitter || base == 0 {
            return Duration::from_millis(base);
        }
        let extra = rand::rng().random_range(0..=base / 2);
        Duration::from_millis(base + extra)
    }
}
