//! The remote transport seam.
//!
//! Every store operation performs one [`RemoteLink::round_trip`] before
//! touching state, modeling the latency and failure modes of the backing
//! service. Swapping in a real network client means implementing this
//! trait; the store itself never changes.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use flowdeck_core::CoreError;
use rand::Rng;

/// One simulated (or real) round trip to the backing service.
///
/// `op` is a short operation name (e.g. `"task.update"`) used for
/// diagnostics and failure messages.
#[async_trait]
pub trait RemoteLink: Send + Sync {
    async fn round_trip(&self, op: &'static str) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// LocalLink
// ---------------------------------------------------------------------------

/// Mutable failure-injection state of a [`LocalLink`].
#[derive(Debug, Default)]
struct FailurePlan {
    /// Number of upcoming round trips that must fail.
    queued_failures: u32,
    /// When set, every round trip fails until cleared.
    outage: bool,
}

/// In-process stand-in for a remote backend.
///
/// Sleeps for a configurable latency on every round trip and supports
/// three failure modes: a deterministic queue ([`fail_next`]), a permanent
/// outage toggle ([`set_outage`]), and a probabilistic rate
/// ([`with_failure_rate`]). Deterministic modes take precedence, which is
/// what tests want.
///
/// [`fail_next`]: LocalLink::fail_next
/// [`set_outage`]: LocalLink::set_outage
/// [`with_failure_rate`]: LocalLink::with_failure_rate
pub struct LocalLink {
    latency: Duration,
    failure_rate: f64,
    plan: Mutex<FailurePlan>,
}

impl LocalLink {
    /// A link with the given latency and no failures.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failure_rate: 0.0,
            plan: Mutex::new(FailurePlan::default()),
        }
    }

    /// A zero-latency, always-successful link. The default for tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Fail a fraction of round trips at random. `rate` is clamped to
    /// `0.0..=1.0`.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Queue the next `n` round trips to fail deterministically.
    pub fn fail_next(&self, n: u32) {
        self.plan.lock().unwrap().queued_failures = n;
    }

    /// Toggle a permanent outage.
    pub fn set_outage(&self, outage: bool) {
        self.plan.lock().unwrap().outage = outage;
    }

    fn should_fail(&self) -> bool {
        let mut plan = self.plan.lock().unwrap();
        if plan.outage {
            return true;
        }
        if plan.queued_failures > 0 {
            plan.queued_failures -= 1;
            return true;
        }
        drop(plan);
        self.failure_rate > 0.0 && rand::rng().random_bool(self.failure_rate)
    }
}

#[async_trait]
impl RemoteLink for LocalLink {
    async fn round_trip(&self, op: &'static str) -> Result<(), CoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.should_fail() {
            tracing::warn!(op, "Simulated transport failure");
            return Err(CoreError::Transient(format!(
                "simulated I/O failure during {op}"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
