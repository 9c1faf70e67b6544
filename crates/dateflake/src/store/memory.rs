use core::time::Duration;
use std::collections::HashMap;

use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    store::{CounterStore, SLOT_INITIAL_VALUE},
    time::{SystemClock, TimeSource},
};

/// Errors returned by [`MemoryCounterStore`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum MemoryStoreError {
    /// Incrementing the counter would overflow `i64`.
    #[error("counter {key} overflowed")]
    Overflow {
        /// The counter key.
        key: String,
    },
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    value: i64,
    expires_at: Option<u64>,
}

impl Entry {
    fn is_live(&self, now: u64) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// How often [`MemoryCounterStore`] drops expired keys, in milliseconds.
const SWEEP_INTERVAL_MILLIS: u64 = 1_000;

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, Entry>,
    next_sweep: u64,
}

/// An in-process [`CounterStore`] with Redis-like semantics.
///
/// Counters live in a mutex-guarded map. Keys created by
/// [`CounterStore::init_slot`] expire according to the store's own
/// [`TimeSource`]; expired keys behave as absent right away and are swept by
/// the first `init_slot` of each second.
///
/// Useful for tests and for deployments where every generator lives in one
/// process. Share it between generators with an [`Arc`] or a reference.
///
/// [`Arc`]: std::sync::Arc
pub struct MemoryCounterStore<T = SystemClock>
where
    T: TimeSource<u64>,
{
    entries: Mutex<Entries>,
    time: T,
}

impl Default for MemoryCounterStore<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<T> MemoryCounterStore<T>
where
    T: TimeSource<u64>,
{
    /// Creates an empty store that expires keys against `time`.
    pub fn new(time: T) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            time,
        }
    }

    /// Returns the current value at `key`, if it exists and has not expired.
    pub fn get(&self, key: &str) -> Option<i64> {
        let now = self.time.current_millis();
        self.entries
            .lock()
            .map
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value)
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = self.time.current_millis();
        self.entries
            .lock()
            .map
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Returns `true` if the store holds no live keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> CounterStore for MemoryCounterStore<T>
where
    T: TimeSource<u64>,
{
    type Err = MemoryStoreError;

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn init_slot(&self, key: &str, expiry: Duration) -> Result<(), Self::Err> {
        let now = self.time.current_millis();
        let expires_at = now.saturating_add(u64::try_from(expiry.as_millis()).unwrap_or(u64::MAX));

        let mut entries = self.entries.lock();
        if now >= entries.next_sweep {
            entries.map.retain(|_, entry| entry.is_live(now));
            entries.next_sweep = now.saturating_add(SWEEP_INTERVAL_MILLIS);
        }
        // An expired key that has not been swept yet counts as absent.
        let live = entries.map.get(key).is_some_and(|entry| entry.is_live(now));
        if !live {
            entries.map.insert(
                key.to_owned(),
                Entry {
                    value: SLOT_INITIAL_VALUE,
                    expires_at: Some(expires_at),
                },
            );
        }
        Ok(())
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn increment(&self, key: &str) -> Result<i64, Self::Err> {
        let now = self.time.current_millis();
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.map.get_mut(key).filter(|entry| entry.is_live(now)) {
            entry.value = entry
                .value
                .checked_add(1)
                .ok_or_else(|| MemoryStoreError::Overflow {
                    key: key.to_owned(),
                })?;
            return Ok(entry.value);
        }

        entries.map.insert(
            key.to_owned(),
            Entry {
                value: 1,
                expires_at: None,
            },
        );
        Ok(1)
    }
}
