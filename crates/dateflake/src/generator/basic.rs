use core::cell::RefCell;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    config::{ConfigError, Options},
    error::Error,
    generator::{DateSnowflakeGenerator, GeneratorCore, Poll, SlotState},
    id::{DateSnowflakeId, Layout},
    store::CounterStore,
    time::{Calendar, LocalCalendar, TimeSource},
};

/// A non-concurrent date-prefixed Snowflake generator suitable for
/// single-threaded environments.
///
/// This generator is lightweight, but **not thread-safe**: its slot state
/// lives in a [`RefCell`]. Give each thread (or task) its own generator with
/// its own `(region, machine)` tag, or use [`LockDateSnowflakeGenerator`].
///
/// ## Features
/// - ❌ Not thread-safe
/// - ✅ Cross-process uniqueness through the shared [`CounterStore`]
///
/// ## Recommended When
/// - You're in a single-threaded environment (no shared access)
/// - You want the fastest generator
///
/// ## See Also
/// - [`LockDateSnowflakeGenerator`]
///
/// [`LockDateSnowflakeGenerator`]: crate::generator::LockDateSnowflakeGenerator
pub struct BasicDateSnowflakeGenerator<S, T, C = LocalCalendar>
where
    S: CounterStore,
    T: TimeSource<u64>,
    C: Calendar,
{
    core: GeneratorCore<S, T, C>,
    state: RefCell<SlotState>,
}

impl<S, T> BasicDateSnowflakeGenerator<S, T, LocalCalendar>
where
    S: CounterStore,
    T: TimeSource<u64>,
{
    /// Creates a new [`BasicDateSnowflakeGenerator`] dating IDs in the host's
    /// local time zone.
    ///
    /// # Parameters
    ///
    /// - `options`: Field widths, tags, and key prefix. Validated here.
    /// - `store`: The shared [`CounterStore`] sequences are drawn from.
    /// - `time`: A [`TimeSource`] (e.g. [`SystemClock`]) read on every call.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `options` fails [`Options::validate`].
    ///
    /// # Example
    /// ```
    /// use dateflake::{
    ///     BasicDateSnowflakeGenerator, DateSnowflakeGenerator, MemoryCounterStore, Options,
    ///     SystemClock,
    /// };
    ///
    /// let options = Options::default().with_machine_id(3);
    /// let generator =
    ///     BasicDateSnowflakeGenerator::new(options, MemoryCounterStore::default(), SystemClock)
    ///         .unwrap();
    ///
    /// let id = generator.id().unwrap();
    /// assert!(id.len() > 8);
    /// ```
    ///
    /// [`SystemClock`]: crate::time::SystemClock
    pub fn new(options: Options, store: S, time: T) -> Result<Self, ConfigError> {
        Self::with_calendar(options, store, time, LocalCalendar::local())
    }
}

impl<S, T, C> BasicDateSnowflakeGenerator<S, T, C>
where
    S: CounterStore,
    T: TimeSource<u64>,
    C: Calendar,
{
    /// Creates a new generator with an explicit [`Calendar`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `options` fails [`Options::validate`].
    pub fn with_calendar(
        options: Options,
        store: S,
        time: T,
        calendar: C,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            core: GeneratorCore::new(options, store, time, calendar)?,
            state: RefCell::new(SlotState::new()),
        })
    }

    /// The options this generator was built with.
    pub const fn options(&self) -> &Options {
        self.core.options()
    }

    /// The validated bit layout of this generator's IDs.
    pub const fn layout(&self) -> &Layout {
        self.core.layout()
    }

    /// Attempts to issue the next ID without waiting.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: a new ID was issued
    /// - `Ok(Poll::Pending { yield_for })`: this millisecond is exhausted
    /// - `Err(e)`: the clock moved backwards or the store failed
    ///
    /// # Errors
    ///
    /// See [`Error`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll, Error<S::Err>> {
        self.core.poll(&mut self.state.borrow_mut())
    }

    /// Issues the next ID, calling `f` while the current millisecond is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub fn try_next_id(&self, f: impl FnMut(u64)) -> Result<DateSnowflakeId, Error<S::Err>> {
        DateSnowflakeGenerator::try_next_id(self, f)
    }

    /// Issues the next ID as a string, busy-waiting through exhausted
    /// milliseconds.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub fn id(&self) -> Result<String, Error<S::Err>> {
        DateSnowflakeGenerator::id(self)
    }
}

impl<S, T, C> DateSnowflakeGenerator for BasicDateSnowflakeGenerator<S, T, C>
where
    S: CounterStore,
    T: TimeSource<u64>,
    C: Calendar,
{
    type Err = Error<S::Err>;

    fn try_poll_id(&self) -> Result<Poll, Self::Err> {
        self.try_poll_id()
    }
}
