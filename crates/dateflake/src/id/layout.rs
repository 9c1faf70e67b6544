/// The decoded fields of a tail integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Components {
    /// Milliseconds since the start of the ID's calendar day.
    pub day_offset: u64,
    /// The region tag.
    pub region_id: u64,
    /// The machine tag.
    pub machine_id: u64,
    /// The per-millisecond sequence number.
    pub sequence: u64,
}

/// Bit layout of the tail integer that follows the date prefix.
///
/// ```text
/// +--------+-----------------+------------+-------------+--------------+
/// | unused | day offset (27) | region (R) | machine (M) | sequence (S) |
/// +--------+-----------------+------------+-------------+--------------+
/// |<-- MSB ----------------------- 64 bits ---------------------- LSB -->|
/// ```
///
/// `R + M + S` may not exceed [`Layout::MAX_TAIL_FIELD_BITS`]. With the
/// default 9 machine and 11 sequence bits the tail spans 48 bits, one of
/// which is padding.
///
/// A `Layout` is only obtained through [`Options::validate`], so every value
/// in circulation satisfies the width budget.
///
/// [`Options::validate`]: crate::Options::validate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    sequence_bits: u8,
    machine_bits: u8,
    region_bits: u8,
}

impl Layout {
    /// Width of the within-day millisecond field.
    pub const DAY_OFFSET_BITS: u8 = 27;

    /// Combined width budget of the region, machine, and sequence fields.
    pub const MAX_TAIL_FIELD_BITS: u8 = 27;

    pub(crate) const fn new(sequence_bits: u8, machine_bits: u8, region_bits: u8) -> Self {
        Self {
            sequence_bits,
            machine_bits,
            region_bits,
        }
    }

    /// Width of the sequence field.
    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Width of the machine field.
    pub const fn machine_bits(&self) -> u8 {
        self.machine_bits
    }

    /// Width of the region field.
    pub const fn region_bits(&self) -> u8 {
        self.region_bits
    }

    /// Highest sequence value a single slot can hold (`2^S - 1`).
    pub const fn max_sequence(&self) -> u64 {
        mask(self.sequence_bits)
    }

    /// Highest machine ID the layout can hold (`2^M - 1`).
    pub const fn max_machine_id(&self) -> u64 {
        mask(self.machine_bits)
    }

    /// Highest region ID the layout can hold (`2^R - 1`).
    pub const fn max_region_id(&self) -> u64 {
        mask(self.region_bits)
    }

    /// Highest day offset the layout can hold (`2^27 - 1`).
    pub const fn max_day_offset(&self) -> u64 {
        mask(Self::DAY_OFFSET_BITS)
    }

    const fn machine_shift(&self) -> u8 {
        self.sequence_bits
    }

    const fn region_shift(&self) -> u8 {
        self.machine_bits + self.sequence_bits
    }

    const fn day_offset_shift(&self) -> u8 {
        self.region_bits + self.machine_bits + self.sequence_bits
    }

    /// Packs the fields into a tail integer.
    ///
    /// Callers are expected to pass in-range values; out-of-range fields are
    /// caught by debug assertions and masked in release builds.
    pub const fn pack(&self, components: Components) -> u64 {
        debug_assert!(components.day_offset <= self.max_day_offset(), "day_offset overflow");
        debug_assert!(components.region_id <= self.max_region_id(), "region_id overflow");
        debug_assert!(components.machine_id <= self.max_machine_id(), "machine_id overflow");
        debug_assert!(components.sequence <= self.max_sequence(), "sequence overflow");

        ((components.day_offset & self.max_day_offset()) << self.day_offset_shift())
            | ((components.region_id & self.max_region_id()) << self.region_shift())
            | ((components.machine_id & self.max_machine_id()) << self.machine_shift())
            | (components.sequence & self.max_sequence())
    }

    /// Splits a tail integer back into its fields.
    pub const fn unpack(&self, tail: u64) -> Components {
        Components {
            day_offset: (tail >> self.day_offset_shift()) & self.max_day_offset(),
            region_id: (tail >> self.region_shift()) & self.max_region_id(),
            machine_id: (tail >> self.machine_shift()) & self.max_machine_id(),
            sequence: tail & self.max_sequence(),
        }
    }

    /// Returns `true` if `tail` has no bits set above the day offset field.
    pub const fn is_valid_tail(&self, tail: u64) -> bool {
        (tail >> (self.day_offset_shift() + Self::DAY_OFFSET_BITS)) == 0
    }
}

const fn mask(bits: u8) -> u64 {
    (1u64 << bits) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_packs_documented_example() {
        let layout = Layout::new(11, 9, 0);
        let tail = layout.pack(Components {
            day_offset: 123,
            region_id: 0,
            machine_id: 5,
            sequence: 7,
        });
        assert_eq!(tail, (123 << 20) | (5 << 11) | 7);

        let parts = layout.unpack(tail);
        assert_eq!(parts.day_offset, 123);
        assert_eq!(parts.machine_id, 5);
        assert_eq!(parts.sequence, 7);
        assert_eq!(parts.region_id, 0);
    }

    #[test]
    fn region_field_sits_above_machine() {
        let layout = Layout::new(10, 8, 6);
        let components = Components {
            day_offset: 86_399_999,
            region_id: 63,
            machine_id: 200,
            sequence: 1023,
        };
        let tail = layout.pack(components);
        assert_eq!(tail >> 24, 86_399_999);
        assert_eq!((tail >> 18) & 0x3f, 63);
        assert_eq!(layout.unpack(tail), components);
        assert!(layout.is_valid_tail(tail));
    }

    #[test]
    fn maxima_follow_widths() {
        let layout = Layout::new(11, 9, 0);
        assert_eq!(layout.max_sequence(), 2047);
        assert_eq!(layout.max_machine_id(), 511);
        assert_eq!(layout.max_region_id(), 0);
        assert_eq!(layout.max_day_offset(), 134_217_727);
    }

    #[test]
    fn tail_above_day_offset_is_invalid() {
        let layout = Layout::new(11, 9, 0);
        assert!(layout.is_valid_tail(layout.max_day_offset() << 20));
        assert!(!layout.is_valid_tail(1 << 47));
    }
}
