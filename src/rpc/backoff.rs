//! Exponential backoff between connection attempts.

use std::time::Duration;

/// Delay before the first retry.
pub const INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Doubling delay sequence with a sticky cap.
///
/// The delay doubles after every use until it reaches or passes the
/// ceiling, then stays at that value. The cap is not a clamp: with a
/// ceiling of 10s the sequence is 1, 2, 4, 8, 16, 16, ...
///
/// ```
/// use std::time::Duration;
/// use gojsonrpc_client::rpc::Backoff;
///
/// let secs: Vec<u64> = Backoff::new(Duration::from_secs(32))
///     .take(8)
///     .map(|d| d.as_secs())
///     .collect();
/// assert_eq!(secs, [1, 2, 4, 8, 16, 32, 32, 32]);
/// ```
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    ceiling: Duration,
}

impl Backoff {
    pub fn new(ceiling: Duration) -> Self {
        Self::starting_at(INITIAL_DELAY, ceiling)
    }

    pub fn starting_at(initial: Duration, ceiling: Duration) -> Self {
        Self {
            current: initial,
            ceiling,
        }
    }

    /// Delay to sleep now; advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        if self.current < self.ceiling {
            self.current = self.current.saturating_mul(2);
        }
        delay
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}
