use core::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::id::{Components, Layout};

/// Number of leading digits that carry the calendar date.
pub const DATE_DIGITS: usize = 8;

/// A date-prefixed Snowflake identifier.
///
/// The textual form is the 8-digit calendar date (`YYYYMMDD`) immediately
/// followed by the decimal digits of the bit-packed tail integer, e.g.
/// `2023081838643360073728`.
///
/// IDs order by date first and then numerically by tail, which for a single
/// generator follows issue order within a day.
///
/// # Example
///
/// ```
/// use dateflake::DateSnowflakeId;
///
/// let id: DateSnowflakeId = "2023081838643360073728".parse().unwrap();
/// assert_eq!(id.date(), 20230818);
/// assert_eq!(id.tail(), 38643360073728);
/// assert_eq!(id.to_string(), "2023081838643360073728");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateSnowflakeId {
    date: u32,
    tail: u64,
}

impl DateSnowflakeId {
    /// Builds an ID from a `YYYYMMDD` date and a packed tail.
    pub const fn from_parts(date: u32, tail: u64) -> Self {
        Self { date, tail }
    }

    /// The calendar date as a `YYYYMMDD` integer.
    pub const fn date(&self) -> u32 {
        self.date
    }

    /// The packed tail integer.
    pub const fn tail(&self) -> u64 {
        self.tail
    }

    /// The calendar date, or `None` if the prefix is not a real date.
    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::try_from(self.date / 10_000).ok()?,
            (self.date / 100) % 100,
            self.date % 100,
        )
    }

    /// Splits the tail into its fields using `layout`.
    ///
    /// The result is only meaningful when `layout` matches the one the ID
    /// was generated with.
    pub const fn decode(&self, layout: &Layout) -> Components {
        layout.unpack(self.tail)
    }
}

/// Encodes a calendar date as a `YYYYMMDD` integer.
///
/// Returns `None` for years that do not fit in four digits.
pub(crate) fn date_number(date: NaiveDate) -> Option<u32> {
    let year = u32::try_from(date.year()).ok()?;
    if !(1..=9999).contains(&year) {
        return None;
    }
    Some(year * 10_000 + date.month() * 100 + date.day())
}

impl fmt::Display for DateSnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}{}", self.date, self.tail)
    }
}

/// Errors produced when parsing a [`DateSnowflakeId`] from text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseIdError {
    /// The input has no tail digits after the date.
    #[error("id must have more than {DATE_DIGITS} digits, got {len}")]
    TooShort {
        /// Length of the rejected input.
        len: usize,
    },

    /// The input contains a non-digit character.
    #[error("invalid character {ch:?} at position {index}")]
    InvalidDigit {
        /// Byte offset of the character.
        index: usize,
        /// The offending character.
        ch: char,
    },

    /// The date prefix is not a valid calendar date.
    #[error("invalid date prefix {date:08}")]
    InvalidDate {
        /// The rejected prefix.
        date: u32,
    },

    /// The tail digits do not fit in 64 bits.
    #[error("tail does not fit in 64 bits")]
    TailOverflow,

    /// The tail has a leading zero, so it is not the canonical text form.
    #[error("tail has a leading zero at position {DATE_DIGITS}")]
    LeadingZero,
}

impl FromStr for DateSnowflakeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((index, ch)) = s.char_indices().find(|(_, ch)| !ch.is_ascii_digit()) {
            return Err(ParseIdError::InvalidDigit { index, ch });
        }
        if s.len() <= DATE_DIGITS {
            return Err(ParseIdError::TooShort { len: s.len() });
        }

        let (date, tail) = s.split_at(DATE_DIGITS);
        if tail.len() > 1 && tail.starts_with('0') {
            return Err(ParseIdError::LeadingZero);
        }
        // Eight ASCII digits always fit in a u32.
        let date = date.parse::<u32>().map_err(|_| ParseIdError::InvalidDate { date: 0 })?;
        let tail = tail.parse::<u64>().map_err(|_| ParseIdError::TailOverflow)?;

        let id = Self::from_parts(date, tail);
        if id.naive_date().is_none() {
            return Err(ParseIdError::InvalidDate { date });
        }
        Ok(id)
    }
}
