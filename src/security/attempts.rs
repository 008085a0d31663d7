//! Per-address login attempt limiting.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Addresses stay locked this long after exhausting their attempt budget.
const LOCKOUT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Records idle longer than this are dropped by the sweeper.
const STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// How often the background sweeper wakes.
const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Failure record for one client address.
#[derive(Debug, Clone)]
struct LoginAttempt {
    count: u32,
    last_attempt: Instant,
    locked_until: Option<Instant>,
}

/// In-memory failed-login tracker shared across request handlers.
///
/// Reads take the shared lock, mutations the exclusive lock; the locked
/// regions never perform I/O. Lockout log lines are emitted after the lock
/// is released.
pub struct AttemptLimiter {
    attempts: RwLock<HashMap<String, LoginAttempt>>,
    max_attempts: u32,
    lockout: Duration,
    stale_after: Duration,
}

impl AttemptLimiter {
    pub fn new(max_attempts: u32) -> Self {
        Self::with_windows(max_attempts, LOCKOUT_WINDOW, STALE_AFTER)
    }

    fn with_windows(max_attempts: u32, lockout: Duration, stale_after: Duration) -> Self {
        Self {
            attempts: RwLock::new(HashMap::new()),
            max_attempts,
            lockout,
            stale_after,
        }
    }

    /// Whether a login attempt from `addr` may proceed to credential
    /// evaluation. True when the address has no failure record, or when its
    /// lockout has lapsed and it still has budget left.
    pub fn permit(&self, addr: &str) -> bool {
        let attempts = self.attempts.read().expect("attempt table lock poisoned");
        match attempts.get(addr) {
            None => true,
            Some(record) => {
                if let Some(until) = record.locked_until {
                    if Instant::now() < until {
                        return false;
                    }
                }
                record.count < self.max_attempts
            }
        }
    }

    /// Record a failed attempt from `addr`, locking the address once its
    /// budget is exhausted.
    pub fn record_failure(&self, addr: &str) {
        let locked = {
            let mut attempts = self.attempts.write().expect("attempt table lock poisoned");
            let now = Instant::now();
            let record = attempts.entry(addr.to_string()).or_insert(LoginAttempt {
                count: 0,
                last_attempt: now,
                locked_until: None,
            });

            record.count += 1;
            record.last_attempt = now;

            if record.count >= self.max_attempts {
                record.locked_until = Some(now + self.lockout);
                true
            } else {
                false
            }
        };

        if locked {
            tracing::warn!(addr = %addr, "Address locked after too many failed login attempts");
        }
    }

    /// Forget the failure record for `addr` (successful login).
    pub fn reset(&self, addr: &str) {
        let mut attempts = self.attempts.write().expect("attempt table lock poisoned");
        attempts.remove(addr);
    }

    /// Drop records whose last attempt is older than the staleness window.
    pub fn sweep_stale(&self) -> usize {
        let mut attempts = self.attempts.write().expect("attempt table lock poisoned");
        let before = attempts.len();
        let stale_after = self.stale_after;
        attempts.retain(|_, record| record.last_attempt.elapsed() <= stale_after);
        before - attempts.len()
    }

    /// Background sweeper: wakes periodically and evicts stale records,
    /// exiting when shutdown is signalled.
    pub async fn sweep_loop(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.tick().await; // immediate first tick is a no-op

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep_stale();
                    if removed > 0 {
                        tracing::debug!(removed, "Swept stale login attempt records");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Attempt sweeper received shutdown signal, exiting");
                    break;
                }
            }
        }
    }
}
