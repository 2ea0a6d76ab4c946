use std::thread;
use std::time::Duration;

use crate::store::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// A connection that can be rebuilt after the transport dropped.
pub trait Reconnect {
    fn reconnect(&mut self) -> Result<(), QueryError>;
}

/// Runs `op`, retrying transient failures with a fixed delay and a fresh
/// connection between attempts. `on_retry(attempt, max_attempts, err)` is
/// called before each wait.
pub fn execute_with_retry<C, T, F, L>(
    conn: &mut C,
    policy: &RetryPolicy,
    mut on_retry: L,
    mut op: F,
) -> Result<T, QueryError>
where
    C: Reconnect + ?Sized,
    F: FnMut(&C) -> Result<T, QueryError>,
    L: FnMut(u32, u32, &QueryError),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(&*conn) {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                on_retry(attempt, max_attempts, &err);
                if !policy.delay.is_zero() {
                    thread::sleep(policy.delay);
                }
                conn.reconnect()?;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
