use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// How many per-item tasks may run their external call at the same time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrencyLimit {
    /// One task per item, all in flight at once.
    #[default]
    Unbounded,
    Bounded(NonZeroUsize),
}

impl ConcurrencyLimit {
    /// `None` and `Some(0)` both mean no cap.
    pub fn from_max_in_flight(max_in_flight: Option<usize>) -> Self {
        match max_in_flight.and_then(NonZeroUsize::new) {
            Some(max) => ConcurrencyLimit::Bounded(max),
            None => ConcurrencyLimit::Unbounded,
        }
    }

    pub(crate) fn limiter(&self) -> Limiter {
        match self {
            ConcurrencyLimit::Unbounded => Limiter(None),
            ConcurrencyLimit::Bounded(max) => Limiter(Some(Arc::new(Semaphore::new(max.get())))),
        }
    }
}

/// Shared gate handed to every spawned task of one fan-out.
#[derive(Clone)]
pub(crate) struct Limiter(Option<Arc<Semaphore>>);

impl Limiter {
    /// Waits for a slot; the slot is released when the permit drops.
    pub(crate) async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        match &self.0 {
            // The semaphore is never closed, so acquiring only fails if it was.
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        }
    }
}

/// Concurrency settings injected into the engine components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub aggregation: ConcurrencyLimit,
    pub resolution: ConcurrencyLimit,
}
