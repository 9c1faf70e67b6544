use crate::id::DateSnowflakeId;

/// The outcome of a single, non-blocking attempt to issue an ID.
///
/// - [`Poll::Ready`] carries a freshly issued ID.
/// - [`Poll::Pending`] means the current millisecond's sequence space is
///   exhausted. Retry once the clock has moved `yield_for` milliseconds on.
///
/// # Example
///
/// ```
/// use dateflake::{
///     BasicDateSnowflakeGenerator, DateSnowflakeGenerator, MemoryCounterStore, Options, Poll,
///     SystemClock,
/// };
///
/// let generator =
///     BasicDateSnowflakeGenerator::new(Options::default(), MemoryCounterStore::default(), SystemClock)
///         .unwrap();
///
/// match generator.try_poll_id().unwrap() {
///     Poll::Ready { id } => println!("ID: {id}"),
///     Poll::Pending { yield_for } => println!("Back off for {yield_for}ms"),
/// }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was issued and is ready to use.
    Ready {
        /// The issued ID.
        id: DateSnowflakeId,
    },
    /// No ID could be issued because the sequence for the current millisecond
    /// is exhausted.
    Pending {
        /// Milliseconds to wait before polling again.
        yield_for: u64,
    },
}
