use core::fmt;

use crate::{generator::Poll, id::DateSnowflakeId};

/// A minimal interface for issuing date-prefixed Snowflake IDs.
pub trait DateSnowflakeGenerator {
    /// The error type returned by every fallible operation.
    type Err: fmt::Debug + fmt::Display;

    /// Attempts to issue the next ID without waiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock moved backwards or the counter store
    /// failed.
    fn try_poll_id(&self) -> Result<Poll, Self::Err>;

    /// Issues the next ID, calling `f` with the suggested wait (in
    /// milliseconds) every time the current millisecond is exhausted.
    ///
    /// `f` decides how to wait: spin, yield, or sleep. The loop has no upper
    /// bound; it returns once the clock moves past the exhausted millisecond
    /// and the store hands out an in-range sequence.
    ///
    /// # Errors
    ///
    /// See [`DateSnowflakeGenerator::try_poll_id`].
    fn try_next_id(&self, mut f: impl FnMut(u64)) -> Result<DateSnowflakeId, Self::Err> {
        loop {
            match self.try_poll_id()? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_for } => f(yield_for),
            }
        }
    }

    /// Issues the next ID in its textual form, busy-waiting through
    /// exhausted milliseconds.
    ///
    /// # Errors
    ///
    /// See [`DateSnowflakeGenerator::try_poll_id`].
    fn id(&self) -> Result<String, Self::Err> {
        self.try_next_id(|_| core::hint::spin_loop())
            .map(|id| id.to_string())
    }
}
