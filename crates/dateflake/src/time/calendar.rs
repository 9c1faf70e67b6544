use chrono::{Local, TimeZone, Timelike, Utc};

use crate::id::date_number;

/// The calendar position of a timestamp: which day it falls on and how far
/// into that day it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DaySlot {
    /// The calendar date as a `YYYYMMDD` integer.
    pub date: u32,
    /// Milliseconds elapsed since the start of `date`.
    pub day_offset: u64,
}

/// Maps Unix milliseconds to a [`DaySlot`].
///
/// Implementations must be consistent: the same `millis` always maps to the
/// same slot, and two different timestamps on the same date never share a
/// `day_offset`. Generators key their counter on `(date, day_offset)`, so a
/// calendar that repeats offsets within a day (e.g. naive local wall time
/// across a DST fold) would reuse sequences.
pub trait Calendar {
    /// Returns the slot for `millis`, or `None` if the date cannot be
    /// represented in eight digits.
    fn day_slot(&self, millis: u64) -> Option<DaySlot>;
}

impl<C> Calendar for &C
where
    C: Calendar + ?Sized,
{
    fn day_slot(&self, millis: u64) -> Option<DaySlot> {
        (**self).day_slot(millis)
    }
}

/// A [`Calendar`] anchored to a chrono [`TimeZone`].
///
/// The date is the zone's calendar date. The day offset is the real time
/// elapsed since that date's midnight in the zone, so on a 25-hour DST day
/// it runs past 86,400,000 instead of repeating, and stays well inside the
/// 27-bit field.
///
/// Outside UTC this is not `millis % 86_400_000`. A calendar that pairs the
/// local date with the UTC time of day would reset its offset at UTC
/// midnight rather than local midnight, so on one local date the offsets
/// jump back to zero partway through the day. Use [`UtcCalendar`] when the
/// offset must equal the UTC modulo; its date is then the UTC date too.
#[derive(Clone, Copy, Debug)]
pub struct ZoneCalendar<Tz> {
    zone: Tz,
}

/// Dates in the host's local time zone.
pub type LocalCalendar = ZoneCalendar<Local>;

/// Dates in UTC; the day offset is `millis % 86_400_000`.
pub type UtcCalendar = ZoneCalendar<Utc>;

impl<Tz> ZoneCalendar<Tz> {
    /// Creates a calendar for `zone`.
    pub const fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl ZoneCalendar<Local> {
    /// A calendar in the host's local time zone.
    pub const fn local() -> Self {
        Self::new(Local)
    }
}

impl Default for ZoneCalendar<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl ZoneCalendar<Utc> {
    /// A calendar in UTC.
    pub const fn utc() -> Self {
        Self::new(Utc)
    }
}

impl<Tz> Calendar for ZoneCalendar<Tz>
where
    Tz: TimeZone,
{
    fn day_slot(&self, millis: u64) -> Option<DaySlot> {
        let millis = i64::try_from(millis).ok()?;
        let now = self.zone.timestamp_millis_opt(millis).single()?;
        let date = now.date_naive();

        let midnight = date
            .and_hms_opt(0, 0, 0)?
            .and_local_timezone(self.zone.clone())
            .earliest();
        let day_offset = match midnight {
            Some(midnight) => u64::try_from(millis - midnight.timestamp_millis()).ok()?,
            // Midnight skipped by a DST jump; fall back to wall time of day.
            None => {
                u64::from(now.num_seconds_from_midnight()) * 1_000
                    + u64::from(now.timestamp_subsec_millis())
            }
        };

        Some(DaySlot {
            date: date_number(date)?,
            day_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::MILLIS_PER_DAY;
    use chrono::FixedOffset;

    // 2023-08-18T12:46:09Z
    const AUG_18_MIDDAY: u64 = 1_692_362_769_000;
    // 2023-08-18T20:00:00Z
    const AUG_18_EVENING: u64 = 1_692_388_800_000;

    #[test]
    fn utc_offset_is_modulo_day() {
        let slot = UtcCalendar::utc().day_slot(AUG_18_MIDDAY).unwrap();
        assert_eq!(slot.date, 20230818);
        assert_eq!(slot.day_offset, AUG_18_MIDDAY % MILLIS_PER_DAY);
        assert_eq!(slot.day_offset, 45_969_000);
    }

    #[test]
    fn fixed_offset_rolls_date_and_offset_together() {
        let zone = FixedOffset::east_opt(8 * 3_600).unwrap();
        let slot = ZoneCalendar::new(zone).day_slot(AUG_18_EVENING).unwrap();
        assert_eq!(slot.date, 20230819);
        assert_eq!(slot.day_offset, 4 * 3_600 * 1_000);
    }

    #[test]
    fn zone_offset_is_not_the_utc_modulo() {
        let zone = FixedOffset::east_opt(8 * 3_600).unwrap();
        let local = ZoneCalendar::new(zone).day_slot(AUG_18_EVENING).unwrap();
        let utc = UtcCalendar::utc().day_slot(AUG_18_EVENING).unwrap();

        assert_eq!(utc.day_offset, AUG_18_EVENING % MILLIS_PER_DAY);
        assert_eq!(utc.date, 20230818);
        assert_ne!(local.day_offset, utc.day_offset);
        assert_eq!(local.day_offset + 16 * 3_600 * 1_000, utc.day_offset);
    }

    #[test]
    fn epoch_is_start_of_day() {
        let slot = UtcCalendar::utc().day_slot(0).unwrap();
        assert_eq!(
            slot,
            DaySlot {
                date: 19700101,
                day_offset: 0
            }
        );
    }

    #[test]
    fn five_digit_years_are_rejected() {
        // 10000-01-01T00:00:00Z
        let millis = 253_402_300_800_000;
        assert_eq!(UtcCalendar::utc().day_slot(millis), None);
        assert!(UtcCalendar::utc().day_slot(millis - 1).is_some());
    }

    #[test]
    fn local_calendar_offset_fits_field() {
        let slot = LocalCalendar::local().day_slot(AUG_18_MIDDAY).unwrap();
        assert!(slot.day_offset < 1 << 27);
    }
}
