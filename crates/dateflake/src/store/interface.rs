use core::{fmt, time::Duration};
use std::sync::Arc;

/// Expiry applied to a slot's counter when it is first created.
///
/// A slot is one millisecond wide, so a second comfortably outlives every
/// increment aimed at it while keeping the store from accumulating keys.
pub const SLOT_EXPIRY: Duration = Duration::from_secs(1);

/// Value a slot counter is initialized to, so its first increment yields `0`.
pub const SLOT_INITIAL_VALUE: i64 = -1;

/// A shared key-value store holding one atomic counter per slot.
///
/// Both operations must be atomic with respect to every caller in every
/// process using the store. That atomicity is the only thing keeping two
/// generators from handing out the same sequence, since generators hold no
/// cross-process locks of their own.
///
/// # Example
///
/// ```
/// use dateflake::{CounterStore, MemoryCounterStore, SLOT_EXPIRY};
///
/// let store = MemoryCounterStore::default();
/// store.init_slot("orders:0:0:1000", SLOT_EXPIRY).unwrap();
/// assert_eq!(store.increment("orders:0:0:1000").unwrap(), 0);
/// assert_eq!(store.increment("orders:0:0:1000").unwrap(), 1);
/// ```
pub trait CounterStore {
    /// The error type returned when the store is unreachable or rejects a
    /// command.
    type Err: fmt::Debug + fmt::Display;

    /// Creates `key` with value [`SLOT_INITIAL_VALUE`] expiring after
    /// `expiry`, but only if it does not already exist.
    ///
    /// An existing key is left untouched (value and expiry), and that is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the command could not be executed.
    fn init_slot(&self, key: &str, expiry: Duration) -> Result<(), Self::Err>;

    /// Atomically increments the counter at `key` and returns the new value.
    ///
    /// A missing key is created from `0`, so the call returns `1`; such a key
    /// carries no expiry.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the command could not be executed.
    fn increment(&self, key: &str) -> Result<i64, Self::Err>;
}

impl<S> CounterStore for &S
where
    S: CounterStore + ?Sized,
{
    type Err = S::Err;

    fn init_slot(&self, key: &str, expiry: Duration) -> Result<(), Self::Err> {
        (**self).init_slot(key, expiry)
    }

    fn increment(&self, key: &str) -> Result<i64, Self::Err> {
        (**self).increment(key)
    }
}

impl<S> CounterStore for Arc<S>
where
    S: CounterStore + ?Sized,
{
    type Err = S::Err;

    fn init_slot(&self, key: &str, expiry: Duration) -> Result<(), Self::Err> {
        (**self).init_slot(key, expiry)
    }

    fn increment(&self, key: &str) -> Result<i64, Self::Err> {
        (**self).increment(key)
    }
}
