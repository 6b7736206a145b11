//! Fixed-interval, non-reentrant job scheduling.
//!
//! Every tick tries to claim a single in-flight slot. If the previous job is
//! still running the tick is dropped: it is not queued and not retried early.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// A job the scheduler can run repeatedly.
pub type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Result of a single tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// The job was started on its own task.
    Started(JoinHandle<()>),
    /// A previous job is still in flight, nothing was started.
    Skipped,
}

impl TickOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, TickOutcome::Skipped)
    }
}

/// Releases the in-flight slot when dropped, including on panic.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    in_flight: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one tick: start `job` unless a previous one is still running.
    pub fn try_tick<F, Fut>(&self, job: F) -> TickOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Previous update still in flight, skipping tick");
            return TickOutcome::Skipped;
        }

        let guard = InFlightGuard(self.in_flight.clone());
        let fut = job();
        TickOutcome::Started(tokio::spawn(async move {
            let _guard = guard;
            fut.await;
        }))
    }

    /// Start the timing loop. The first tick fires immediately.
    pub fn spawn(self, job: Job) -> JoinHandle<()> {
        info!(interval_secs = self.interval.as_secs_f64(), "Starting scheduler");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let job = job.clone();
                self.try_tick(move || job());
            }
        })
    }
}
