//! Token Budget Gate: a fixed one-minute token allowance shared by every LLM call site.
//!
//! The window resets in one step once 60 seconds have passed since the last reset.
//! It is not a sliding window: a burst right after a reset is under-counted.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

/// Length of one budget window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Default tokens admitted per window.
pub const DEFAULT_TOKENS_PER_MINUTE: u64 = 60_000;

#[derive(Debug)]
struct TokenBudget {
    capacity: u64,
    consumed: u64,
    window_start: Instant,
}

impl TokenBudget {
    fn roll_window(&mut self, now: Instant) {
        if now.duration_since(self.window_start) >= WINDOW {
            self.consumed = 0;
            self.window_start = now;
        }
    }
}

/// Cloneable handle to a single token budget.
///
/// Clones share state, so every call site that draws from the same quota must
/// hold a clone of the same gate. The read-modify-write in [`TokenGate::try_consume`]
/// runs under one lock.
#[derive(Debug, Clone)]
pub struct TokenGate {
    inner: Arc<Mutex<TokenBudget>>,
}

impl TokenGate {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TokenBudget {
                capacity,
                consumed: 0,
                window_start: Instant::now(),
            })),
        }
    }

    /// Admits `tokens` if they fit in the current window.
    ///
    /// A refused request leaves the budget untouched.
    pub fn try_consume(&self, tokens: u64) -> bool {
        let mut budget = self.lock();
        budget.roll_window(Instant::now());

        match budget.consumed.checked_add(tokens) {
            Some(total) if total <= budget.capacity => {
                budget.consumed = total;
                true
            }
            _ => false,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.lock().capacity
    }

    /// Tokens consumed in the current window. A stale window reads as zero.
    pub fn consumed(&self) -> u64 {
        let mut budget = self.lock();
        budget.roll_window(Instant::now());
        budget.consumed
    }

    pub fn remaining(&self) -> u64 {
        let mut budget = self.lock();
        budget.roll_window(Instant::now());
        budget.capacity.saturating_sub(budget.consumed)
    }

    fn lock(&self) -> MutexGuard<'_, TokenBudget> {
        // The budget holds plain integers; a panic mid-update cannot leave it torn.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TokenGate {
    fn default() -> Self {
        Self::new(DEFAULT_TOKENS_PER_MINUTE)
    }
}
