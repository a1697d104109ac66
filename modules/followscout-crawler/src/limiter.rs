//! Outbound request budget: a token bucket over a fixed window.
//!
//! Every request-issuing call passes through [`RateLimiter::acquire`],
//! which suspends the caller until a token is legal. Cache hits never
//! reach the limiter.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Window-scoped token bucket. A window opens with `budget` tokens; each
/// acquisition consumes one; when the window is spent, callers sleep until
/// it reopens. The mutex is held across the sleep, so waiters queue FIFO
/// and capacity is never overcounted.
pub struct RateLimiter {
    budget: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

struct WindowState {
    opened_at: Instant,
    used: u32,
}

impl RateLimiter {
    pub fn new(budget: u32, window: Duration) -> Self {
        Self {
            budget: budget.max(1),
            window,
            state: Mutex::new(WindowState {
                opened_at: Instant::now(),
                used: 0,
            }),
        }
    }

    /// Suspend until an outbound request may legally be issued.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        loop {
            let now = Instant::now();
            if now.duration_since(state.opened_at) >= self.window {
                state.opened_at = now;
                state.used = 0;
            }
            if state.used < self.budget {
                state.used += 1;
                return;
            }
            let reopens_at = state.opened_at + self.window;
            tokio::time::sleep_until(reopens_at).await;
        }
    }
}
