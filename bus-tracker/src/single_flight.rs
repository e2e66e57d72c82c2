//! Single-flight coordination.
//!
//! Ensures only one execution of an operation runs at a time. Callers that
//! arrive while it is running wait for the same execution and receive a
//! clone of its result instead of starting their own.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

struct Flight<T> {
    id: u64,
    future: Shared<BoxFuture<'static, T>>,
}

/// Coordinator for an operation that must not run concurrently.
///
/// The in-flight slot is cleared once the operation completes, so the next
/// call after completion starts a fresh execution.
pub struct SingleFlight<T> {
    slot: Mutex<Option<Flight<T>>>,
    next_id: AtomicU64,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an idle coordinator.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    /// Whether an execution is currently registered.
    pub fn is_in_flight(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Run `start` unless an execution is already in flight, then wait for
    /// whichever execution is current and return its result.
    ///
    /// `start` is only called when this caller becomes the leader.
    pub async fn run<F, Fut>(&self, start: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (id, future) = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            match slot.as_ref() {
                Some(flight) => (flight.id, flight.future.clone()),
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let future = start().boxed().shared();
                    *slot = Some(Flight {
                        id,
                        future: future.clone(),
                    });
                    (id, future)
                }
            }
        };

        let output = future.await;

        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().is_some_and(|flight| flight.id == id) {
            *slot = None;
        }

        output
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}
