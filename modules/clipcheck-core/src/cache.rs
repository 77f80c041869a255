use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use clipcheck_common::{CheckError, FactCheckResult};

type Slot = Option<Result<FactCheckResult, CheckError>>;

struct Entry {
    value: FactCheckResult,
    inserted_at: Instant,
}

struct Inner {
    entries: HashMap<String, Entry>,
    /// Insertion order, oldest first. Drives eviction at the size bound.
    order: VecDeque<String>,
    /// Keys with a computation in flight; waiters share the leader's slot.
    in_flight: HashMap<String, watch::Receiver<Slot>>,
}

enum Flight {
    Leader(watch::Sender<Slot>),
    Waiter(watch::Receiver<Slot>),
}

/// Bounded TTL cache with single-flight semantics: at most one computation
/// per key at a time, concurrent callers share the result. Expiry is lazy
/// (checked on lookup); failures are never stored. All bookkeeping happens
/// under a short-lived lock — the computation itself runs outside it, so
/// distinct keys never serialize behind each other.
pub struct ResultCache {
    ttl: Duration,
    max_entries: usize,
    inner: Mutex<Inner>,
}

impl ResultCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                in_flight: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("cache mutex poisoned")
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `key`, or run `compute` to produce it.
    /// While a computation is in flight, further callers for the same key
    /// wait on its outcome instead of computing again.
    pub async fn get_or_compute<F>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<FactCheckResult, CheckError>
    where
        F: Future<Output = Result<FactCheckResult, CheckError>>,
    {
        let flight = {
            let mut inner = self.lock();

            if let Some(entry) = inner.entries.get(key) {
                if entry.inserted_at.elapsed() < self.ttl {
                    tracing::debug!(key, "Cache hit");
                    return Ok(entry.value.clone());
                }
                inner.entries.remove(key);
                inner.order.retain(|k| k != key);
            }

            match inner.in_flight.get(key) {
                Some(rx) => Flight::Waiter(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    inner.in_flight.insert(key.to_string(), rx);
                    Flight::Leader(tx)
                }
            }
        };

        match flight {
            Flight::Waiter(mut rx) => loop {
                let published = rx.borrow_and_update().clone();
                if let Some(result) = published {
                    return result;
                }
                if rx.changed().await.is_err() {
                    // Leader dropped before publishing (request cancelled).
                    return Err(CheckError::Upstream(
                        "in-flight computation was cancelled".to_string(),
                    ));
                }
            },
            Flight::Leader(tx) => {
                // Unregisters the key even if this future is dropped mid-compute,
                // so a cancelled leader never wedges the key.
                let _guard = FlightGuard {
                    cache: self,
                    key: key.to_string(),
                };

                let result = compute.await;

                if let Ok(value) = &result {
                    let mut inner = self.lock();
                    while inner.entries.len() >= self.max_entries {
                        match inner.order.pop_front() {
                            Some(oldest) => {
                                inner.entries.remove(&oldest);
                            }
                            None => break,
                        }
                    }
                    inner.entries.insert(
                        key.to_string(),
                        Entry {
                            value: value.clone(),
                            inserted_at: Instant::now(),
                        },
                    );
                    inner.order.push_back(key.to_string());
                }

                let _ = tx.send(Some(result.clone()));
                result
            }
        }
    }
}

struct FlightGuard<'a> {
    cache: &'a ResultCache,
    key: String,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.cache.lock().in_flight.remove(&self.key);
    }
}
