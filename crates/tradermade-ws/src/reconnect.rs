//! Reconnection policy with a fixed delay

use std::time::Duration;

/// Default number of reconnection attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay between reconnection attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Bounded, fixed-delay retry policy for the feed
///
/// Values are taken as given; a zero `max_attempts` means the first lost
/// connection is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of reconnection attempts after a connection is lost
    pub max_attempts: u32,
    /// Wait between a failed attempt and the next one
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum attempts
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set the delay between attempts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Check if attempt number `attempt` (1-indexed) is allowed
    pub fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }
}
