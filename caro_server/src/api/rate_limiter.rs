//! Rate limiting for WebSocket message handling.
//!
//! Each connection gets a [`MessageLimiter`] pairing a short burst window
//! with a longer sustained window.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::WebSocketConfig;

/// Sliding window counter
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of accepted messages still inside the window
    timestamps: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window`
    ///
    /// # Example
    ///
    /// ```
    /// use caro_server::api::rate_limiter::RateLimiter;
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

    /// Record a message if the window has room for it.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    fn check_at(&mut self, now: Instant) -> bool {
        while self
            .timestamps
            .front()
            .is_some_and(|ts| now.duration_since(*ts) > self.window)
        {
            self.timestamps.pop_front();
        }

        if self.timestamps.len() >= self.max_requests {
            return false;
        }
        self.timestamps.push_back(now);
        true
    }

    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }
}

/// Which window rejected a message
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LimitWindow {
    Burst,
    Sustained,
}

impl LimitWindow {
    /// Message sent back to the client
    pub fn client_message(self) -> &'static str {
        match self {
            Self::Burst => "Rate limit exceeded. Please slow down.",
            Self::Sustained => "Too many messages. Please wait before sending more.",
        }
    }
}

impl fmt::Display for LimitWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Burst => write!(f, "burst"),
            Self::Sustained => write!(f, "sustained"),
        }
    }
}

/// Burst (per second) and sustained (per minute) limits for one connection
#[derive(Debug)]
pub struct MessageLimiter {
    burst: RateLimiter,
    sustained: RateLimiter,
}

impl MessageLimiter {
    pub fn new(burst_limit: usize, sustained_limit: usize) -> Self {
        Self {
            burst: RateLimiter::new(burst_limit, Duration::from_secs(1)),
            sustained: RateLimiter::new(sustained_limit, Duration::from_secs(60)),
        }
    }

    pub fn from_config(config: &WebSocketConfig) -> Self {
        Self::new(config.burst_limit, config.sustained_limit)
    }

    /// Admit one message or name the window it would overflow.
    ///
    /// A message refused by the burst window does not count against the
    /// sustained one.
    pub fn check(&mut self) -> Result<(), LimitWindow> {
        if !self.burst.check() {
            return Err(LimitWindow::Burst);
        }
        if !self.sustained.check() {
            return Err(LimitWindow::Sustained);
        }
        Ok(())
    }
}
