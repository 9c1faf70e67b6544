use core::fmt::Write;

use crate::{
    config::{ConfigError, Options},
    error::Error,
    generator::Poll,
    id::{Components, DateSnowflakeId, Layout},
    store::{CounterStore, SLOT_EXPIRY},
    time::{Calendar, TimeSource},
};

/// Mutable per-generator state: the slot last issued for and its counter key.
#[derive(Clone, Debug)]
pub(crate) struct SlotState {
    /// Unix millisecond the slot was entered at.
    slot_millis: u64,
    /// Milliseconds since the start of `date`; the packed time field.
    day_offset: u64,
    /// `YYYYMMDD` prefix for the slot.
    date: u32,
    /// Counter-store key, `<prefix><region>:<machine>:<day_offset>`.
    key: String,
    /// The store handed out a value past capacity for this slot.
    exhausted: bool,
    /// The slot has not been initialized in the store yet.
    needs_init: bool,
}

impl SlotState {
    pub(crate) const fn new() -> Self {
        Self {
            slot_millis: 0,
            day_offset: 0,
            date: 0,
            key: String::new(),
            exhausted: false,
            needs_init: true,
        }
    }
}

/// The immutable half of a generator: validated layout, tags, and the
/// collaborators it draws time, dates, and sequences from.
pub(crate) struct GeneratorCore<S, T, C> {
    options: Options,
    layout: Layout,
    store: S,
    time: T,
    calendar: C,
}

impl<S, T, C> GeneratorCore<S, T, C>
where
    S: CounterStore,
    T: TimeSource<u64>,
    C: Calendar,
{
    pub(crate) fn new(options: Options, store: S, time: T, calendar: C) -> Result<Self, ConfigError> {
        let layout = options.validate()?;
        Ok(Self {
            options,
            layout,
            store,
            time,
            calendar,
        })
    }

    pub(crate) const fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Attempts to issue one ID against `state`.
    ///
    /// - Clock behind the current slot: [`Error::ClockMovedBackwards`].
    /// - Clock on a new millisecond (or the slot was never initialized): the
    ///   slot is re-derived and initialized in the store.
    /// - Same millisecond with the slot already exhausted: `Pending` without
    ///   touching the store.
    /// - Otherwise the store is incremented; a value past the sequence
    ///   capacity marks the slot exhausted and yields `Pending`.
    pub(crate) fn poll(&self, state: &mut SlotState) -> Result<Poll, Error<S::Err>> {
        let now = self.time.current_millis();

        if now < state.slot_millis {
            return Err(Self::cold_clock_behind(now, state.slot_millis));
        }
        if now != state.slot_millis || state.needs_init {
            self.enter_slot(state, now)?;
        } else if state.exhausted {
            return Ok(Poll::Pending { yield_for: 1 });
        }

        let value = self.store.increment(&state.key).map_err(Error::Store)?;
        let Ok(sequence) = u64::try_from(value) else {
            return Err(Error::InvalidSequence {
                key: state.key.clone(),
                value,
            });
        };

        if sequence > self.layout.max_sequence() {
            Self::cold_exhausted(state);
            return Ok(Poll::Pending { yield_for: 1 });
        }

        let tail = self.layout.pack(Components {
            day_offset: state.day_offset,
            region_id: self.options.region_id,
            machine_id: self.options.machine_id,
            sequence,
        });
        Ok(Poll::Ready {
            id: DateSnowflakeId::from_parts(state.date, tail),
        })
    }

    /// Re-derives the slot for `now` and creates its counter in the store.
    fn enter_slot(&self, state: &mut SlotState, now: u64) -> Result<(), Error<S::Err>> {
        let slot = self
            .calendar
            .day_slot(now)
            .filter(|slot| slot.day_offset <= self.layout.max_day_offset())
            .ok_or(Error::DateOutOfRange { millis: now })?;

        state.slot_millis = now;
        state.day_offset = slot.day_offset;
        state.date = slot.date;
        state.exhausted = false;
        state.needs_init = true;
        state.key.clear();
        // Writing into a String cannot fail.
        let _ = write!(
            state.key,
            "{}{}:{}:{}",
            self.options.key_prefix, self.options.region_id, self.options.machine_id, slot.day_offset
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(key = %state.key, date = slot.date, day_offset = slot.day_offset, "entering slot");

        self.store
            .init_slot(&state.key, SLOT_EXPIRY)
            .map_err(Error::Store)?;
        state.needs_init = false;
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, slot: u64) -> Error<S::Err> {
        #[cfg(feature = "tracing")]
        tracing::error!(now, slot, "clock moved backwards; refusing to issue ids");
        Error::ClockMovedBackwards { now, slot }
    }

    #[cold]
    #[inline(never)]
    fn cold_exhausted(state: &mut SlotState) {
        #[cfg(feature = "tracing")]
        tracing::warn!(key = %state.key, "sequence exhausted; waiting for next millisecond");
        state.exhausted = true;
    }
}
