//! Circuit breaker guarding one upstream provider.
//!
//! One breaker instance is shared by every invocation against the same
//! provider; the client holds it and all concurrent callers funnel through
//! [`CircuitBreaker::acquire`]. Consecutive overload rejections trip it
//! open, a cooldown later exactly one caller is released as a probe, and
//! everyone else waits on the probe's outcome instead of hammering an
//! endpoint that is already shedding load.
//!
//! State transitions happen under one mutex; waiters park on a
//! [`Notify`] and are woken on every transition.

use std::pin::pin;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::InvokeError;

/// Trip threshold and recovery window for a [`CircuitBreaker`].
#[derive(Debug, Clone, Copy)]
pub struct BreakerPolicy {
    /// Consecutive overloads that trip the breaker open.
    pub failure_ceiling: u32,
    /// How long the breaker stays open before releasing a probe.
    pub cooldown: Duration,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            failure_ceiling: 15,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Calls flow normally.
    Closed,
    /// Calls are held back until the cooldown elapses.
    Open,
    /// One probe is in flight; other callers wait on its outcome.
    HalfOpen,
}

/// What [`CircuitBreaker::acquire`] granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permit {
    /// Breaker is closed; proceed normally.
    Pass,
    /// This caller carries the half-open probe and must resolve it with
    /// [`CircuitBreaker::record_success`], [`CircuitBreaker::record_overload`],
    /// or [`CircuitBreaker::record_probe_failure`].
    Probe,
}

struct Inner {
    state: BreakerState,
    failures: u32,
    opened_at: Option<Instant>,
}

/// Shared overload guard for a single provider endpoint.
pub struct CircuitBreaker {
    policy: BreakerPolicy,
    inner: Mutex<Inner>,
    changed: Notify,
}

impl CircuitBreaker {
    /// A closed breaker with the given policy.
    #[must_use]
    pub fn new(policy: BreakerPolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                failures: 0,
                opened_at: None,
            }),
            changed: Notify::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    /// Consecutive overloads since the last success.
    #[must_use]
    pub fn failures(&self) -> u32 {
        self.inner.lock().failures
    }

    /// Wait for permission to attempt a call.
    ///
    /// Returns immediately with [`Permit::Pass`] while closed. While open,
    /// parks until the cooldown elapses and hands [`Permit::Probe`] to the
    /// first caller through; later callers park again until the probe
    /// resolves.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::ProviderSaturated`] when `deadline` passes
    /// before a permit is granted.
    pub async fn acquire(&self, deadline: Instant) -> Result<Permit, InvokeError> {
        loop {
            // Register for wakeups before reading state, so a transition
            // between the read and the park below is never missed.
            let mut notified = pin!(self.changed.notified());
            notified.as_mut().enable();

            let wait_until = {
                let mut inner = self.inner.lock();
                match inner.state {
                    BreakerState::Closed => return Ok(Permit::Pass),
                    BreakerState::Open => {
                        let reopen_at = inner
                            .opened_at
                            .map_or_else(Instant::now, |at| at + self.policy.cooldown);
                        if Instant::now() >= reopen_at {
                            inner.state = BreakerState::HalfOpen;
                            debug!("breaker cooldown elapsed, releasing one probe");
                            return Ok(Permit::Probe);
                        }
                        reopen_at.min(deadline)
                    }
                    BreakerState::HalfOpen => deadline,
                }
            };

            if Instant::now() >= deadline {
                return Err(InvokeError::ProviderSaturated);
            }
            tokio::select! {
                () = &mut notified => {}
                () = tokio::time::sleep_until(wait_until) => {}
            }
        }
    }

    /// Feed one overload rejection into the breaker.
    ///
    /// Trips it open at the failure ceiling; from half-open a single
    /// overload re-opens immediately with a fresh cooldown.
    pub fn record_overload(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed => {
                inner.failures += 1;
                if inner.failures >= self.policy.failure_ceiling {
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                    warn!(
                        failures = inner.failures,
                        cooldown_ms = self.policy.cooldown.as_millis() as u64,
                        "breaker opened, provider overloaded"
                    );
                    self.changed.notify_waiters();
                }
            }
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Open;
                inner.opened_at = Some(Instant::now());
                warn!("probe rejected, breaker re-opened");
                self.changed.notify_waiters();
            }
            BreakerState::Open => {
                inner.failures = inner.failures.saturating_add(1);
            }
        }
    }

    /// Record a successful call: the breaker closes and waiters are freed.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        let was = inner.state;
        inner.state = BreakerState::Closed;
        inner.failures = 0;
        inner.opened_at = None;
        if was != BreakerState::Closed {
            debug!("breaker closed after successful call");
            self.changed.notify_waiters();
        }
    }

    /// Resolve a half-open probe that could not reach the provider at all.
    ///
    /// Re-opens with a fresh cooldown. No-op outside half-open.
    pub fn record_probe_failure(&self) {
        let mut inner = self.inner.lock();
        if inner.state == BreakerState::HalfOpen {
            inner.state = BreakerState::Open;
            inner.opened_at = Some(Instant::now());
            warn!("probe failed to reach the provider, breaker re-opened");
            self.changed.notify_waiters();
        }
    }
}
