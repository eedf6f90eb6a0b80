//! Keyed single-flight memoization
//!
//! Concurrent misses for one key share a single in-flight future. Every
//! waiter observes the same `Ok` or `Err`; successes are kept, failures are
//! forgotten once the flight lands so the next call starts over.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::error::{ApiError, Result};

type Flight<T> = Shared<BoxFuture<'static, Result<T>>>;

/// Completed values and in-flight futures, by key.
pub(crate) struct Flights<T> {
    pub(crate) ready: HashMap<String, T>,
    pub(crate) pending: HashMap<String, Flight<T>>,
}

impl<T> Default for Flights<T> {
    fn default() -> Self {
        Self {
            ready: HashMap::new(),
            pending: HashMap::new(),
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError::Internal(format!("Single-flight lock poisoned: {e}"))
}

/// Return the ready value for `key`, join its in-flight future, or start one.
pub(crate) async fn coalesce<T, F, Fut>(
    flights: &Arc<Mutex<Flights<T>>>,
    key: String,
    start: F,
) -> Result<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let flight = {
        let mut guard = flights.lock().map_err(poisoned)?;
        if let Some(value) = guard.ready.get(&key) {
            tracing::trace!(%key, "hit");
            return Ok(value.clone());
        }
        if let Some(flight) = guard.pending.get(&key) {
            tracing::trace!(%key, "joining in-flight");
            flight.clone()
        } else {
            let slot = Arc::clone(flights);
            let slot_key = key.clone();
            let fut = start();
            let flight = async move {
                let result: Result<T> = fut.await;
                let mut guard = slot.lock().map_err(poisoned)?;
                guard.pending.remove(&slot_key);
                if let Ok(value) = &result {
                    guard.ready.insert(slot_key, value.clone());
                }
                result
            }
            .boxed()
            .shared();
            guard.pending.insert(key, flight.clone());
            flight
        }
    };
    flight.await
}
