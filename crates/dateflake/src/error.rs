use core::fmt;

/// A result type defaulting to the generator [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants a generator can emit while issuing IDs.
///
/// The generic parameter `E` is the error type of the backing
/// [`CounterStore`]. Sequence exhaustion is not an error; it is reported
/// through [`Poll::Pending`].
///
/// [`CounterStore`]: crate::CounterStore
/// [`Poll::Pending`]: crate::Poll::Pending
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error<E = core::convert::Infallible>
where
    E: fmt::Debug + fmt::Display,
{
    /// The wall clock reads earlier than the slot the generator last issued
    /// for.
    ///
    /// Continuing would re-enter a slot whose counter may already have
    /// expired in the store and restart its sequence, producing duplicate
    /// IDs. Treat this as fatal: stop issuing IDs from this generator.
    #[error("clock moved backwards: now {now}ms is behind current slot {slot}ms")]
    ClockMovedBackwards {
        /// The millisecond the clock reported.
        now: u64,
        /// The millisecond of the slot last issued for.
        slot: u64,
    },

    /// The counter store failed. No ID is fabricated in its absence.
    #[error("counter store error: {0}")]
    Store(E),

    /// The counter store returned a negative sequence value.
    #[error("counter store returned invalid sequence {value} for key {key}")]
    InvalidSequence {
        /// The counter key that was incremented.
        key: String,
        /// The value the store returned.
        value: i64,
    },

    /// The clock maps to a calendar date the 8-digit prefix cannot carry.
    #[error("timestamp {millis}ms falls outside the supported date range")]
    DateOutOfRange {
        /// The offending timestamp in Unix milliseconds.
        millis: u64,
    },
}

impl<E> Error<E>
where
    E: fmt::Debug + fmt::Display,
{
    /// Returns `true` for errors after which the generator must not be used
    /// again.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ClockMovedBackwards { .. })
    }
}
