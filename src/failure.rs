//! Injectable failure policy for exercising the retry path.
//!
//! Listener modules and the in-memory store take a `FailurePolicy`
//! explicitly; nothing reads a process-wide random source on its own.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::Rng;

#[derive(Debug, Clone)]
enum Mode {
    Never,
    Always,
    Probability(f64),
    FirstN {
        remaining: Arc<AtomicUsize>,
    },
}

/// Decides whether a simulated failure should happen on a given call.
///
/// Clones share state, so a `first_n` policy counts down across every
/// holder of the same policy.
#[derive(Debug, Clone)]
pub struct FailurePolicy {
    mode: Mode,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::never()
    }
}

impl FailurePolicy {
    pub fn never() -> Self {
        Self { mode: Mode::Never }
    }

    pub fn always() -> Self {
        Self { mode: Mode::Always }
    }

    /// Fail each call independently with probability `p`, clamped to `[0, 1]`.
    pub fn with_probability(p: f64) -> Self {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        Self {
            mode: Mode::Probability(p),
        }
    }

    /// Fail the first `n` calls, then succeed forever.
    pub fn first_n(n: usize) -> Self {
        Self {
            mode: Mode::FirstN {
                remaining: Arc::new(AtomicUsize::new(n)),
            },
        }
    }

    /// Returns `true` if this call should fail.
    pub fn should_fail(&self) -> bool {
        match &self.mode {
            Mode::Never => false,
            Mode::Always => true,
            Mode::Probability(p) => rand::rng().random_bool(*p),
            Mode::FirstN { remaining } => remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok(),
        }
    }

    /// Human readable description used in failure messages.
    pub fn describe(&self) -> String {
        match &self.mode {
            Mode::Never => "never".to_string(),
            Mode::Always => "always".to_string(),
            Mode::Probability(p) => format!("probability {}", p),
            Mode::FirstN { remaining } => {
                format!("first-n ({} left)", remaining.load(Ordering::SeqCst))
            }
        }
    }
}
