//! Per-socket message rate limiting.
//!
//! Each WebSocket gets a [`MessageLimiter`]: a burst window and a sustained
//! window, both sliding. A message must fit in both to be accepted.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Messages allowed per second before the burst window trips.
pub const BURST_LIMIT: usize = 10;

/// Messages allowed per minute before the sustained window trips.
pub const SUSTAINED_LIMIT: usize = 100;

/// Sliding window over request timestamps
#[derive(Debug)]
pub struct RateLimiter {
    timestamps: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Allow `max_requests` within any `window`-long span.
    ///
    /// ```
    /// use om_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let mut limiter = RateLimiter::new(2, Duration::from_secs(1));
    /// assert!(limiter.check());
    /// assert!(limiter.check());
    /// assert!(!limiter.check());
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    /// Record a request made at `now` if the window has room for it.
    pub fn check_at(&mut self, now: Instant) -> bool {
        self.evict(now);
        if self.timestamps.len() >= self.max_requests {
            return false;
        }
        self.timestamps.push_back(now);
        true
    }

    fn evict(&mut self, now: Instant) {
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Requests still allowed in the current window
    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }
}

/// Which window rejected a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limited {
    Burst,
    Sustained,
}

impl Limited {
    /// Label used in logs and metrics
    pub fn label(self) -> &'static str {
        match self {
            Self::Burst => "burst",
            Self::Sustained => "sustained",
        }
    }

    /// Text of the `error` event sent back to the client
    pub fn message(self) -> &'static str {
        match self {
            Self::Burst => "Rate limit exceeded. Please slow down.",
            Self::Sustained => "Too many messages. Please wait before sending more.",
        }
    }
}

/// Burst plus sustained limiter guarding one socket.
#[derive(Debug)]
pub struct MessageLimiter {
    burst: RateLimiter,
    sustained: RateLimiter,
}

impl Default for MessageLimiter {
    fn default() -> Self {
        Self::new(
            RateLimiter::new(BURST_LIMIT, Duration::from_secs(1)),
            RateLimiter::new(SUSTAINED_LIMIT, Duration::from_secs(60)),
        )
    }
}

impl MessageLimiter {
    pub fn new(burst: RateLimiter, sustained: RateLimiter) -> Self {
        Self { burst, sustained }
    }

    pub fn check(&mut self) -> Result<(), Limited> {
        self.check_at(Instant::now())
    }

    /// A message rejected by the burst window does not count against the
    /// sustained one.
    pub fn check_at(&mut self, now: Instant) -> Result<(), Limited> {
        if !self.burst.check_at(now) {
            return Err(Limited::Burst);
        }
        if !self.sustained.check_at(now) {
            return Err(Limited::Sustained);
        }
        Ok(())
    }
}
