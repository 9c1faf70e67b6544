use parking_lot::Mutex;

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

/// A lock-based date-prefixed Snowflake generator suitable for
/// multi-threaded environments.
///
/// This generator wraps its slot state in a [`Mutex`], so one instance (and
/// therefore one `(region, machine)` tag) can be shared across threads
/// behind an [`Arc`]. The lock is held across the store round trip, so
/// calls are serialized.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Cross-process uniqueness through the shared [`CounterStore`]
///
/// ## Recommended When
/// - Several threads must issue IDs under a single machine tag
/// - Fair access across threads is important
///
/// ## See Also
/// - [`BasicDateSnowflakeGenerator`]
///
/// [`Arc`]: std::sync::Arc
/// [`BasicDateSnowflakeGenerator`]: crate::generator::BasicDateSnowflakeGenerator
pub struct LockDateSnowflakeGenerator<S, T, C = LocalCalendar>
where
    S: CounterStore,
    T: TimeSource<u64>,
    C: Calendar,
{
    core: GeneratorCore<S, T, C>,
    state: Mutex<SlotState>,
}

impl<S, T> LockDateSnowflakeGenerator<S, T, LocalCalendar>
where
    S: CounterStore,
    T: TimeSource<u64>,
{
    /// Creates a new [`LockDateSnowflakeGenerator`] dating IDs in the host's
    /// local time zone.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `options` fails [`Options::validate`].
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use dateflake::{
    ///     DateSnowflakeGenerator, LockDateSnowflakeGenerator, MemoryCounterStore, Options,
    ///     SystemClock,
    /// };
    ///
    /// let store = Arc::new(MemoryCounterStore::default());
    /// let generator = Arc::new(
    ///     LockDateSnowflakeGenerator::new(Options::default().with_machine_id(1), store, SystemClock)
    ///         .unwrap(),
    /// );
    ///
    /// let handle = {
    ///     let generator = Arc::clone(&generator);
    ///     std::thread::spawn(move || generator.id().unwrap())
    /// };
    /// let here = generator.id().unwrap();
    /// let there = handle.join().unwrap();
    /// assert_ne!(here, there);
    /// ```
    pub fn new(options: Options, store: S, time: T) -> Result<Self, ConfigError> {
        Self::with_calendar(options, store, time, LocalCalendar::local())
    }
}

impl<S, T, C> LockDateSnowflakeGenerator<S, T, C>
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
            state: Mutex::new(SlotState::new()),
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
        let mut state = self.state.lock();
        self.core.poll(&mut state)
    }

    /// Issues the next ID, calling `f` while the current millisecond is
    /// exhausted. The lock is released between polls.
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

impl<S, T, C> DateSnowflakeGenerator for LockDateSnowflakeGenerator<S, T, C>
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
