#[cfg(feature = "config")]
mod load;

use crate::id::Layout;

#[cfg(feature = "config")]
pub use load::*;

/// Default namespace prepended to every counter key.
pub const DEFAULT_KEY_PREFIX: &str = "dateflake:snowflake:";

/// Default width of the sequence field (2048 IDs per millisecond).
pub const DEFAULT_SEQUENCE_BITS: u8 = 11;

/// Default width of the machine field (512 machines).
pub const DEFAULT_MACHINE_BITS: u8 = 9;

/// Per-generator configuration.
///
/// Construct with [`Options::default`] and the `with_*` setters, or load one
/// with the `config` feature. Nothing is checked until [`Options::validate`],
/// which every generator constructor calls.
///
/// The `(region_id, machine_id)` pair must be unique across every process
/// sharing a counter store. The generator cannot detect two instances
/// claiming the same pair.
///
/// # Example
///
/// ```
/// use dateflake::Options;
///
/// let options = Options::default().with_machine_id(5).with_region(2, 3);
/// let layout = options.validate().unwrap();
/// assert_eq!(layout.max_sequence(), 2047);
/// assert_eq!(layout.max_region_id(), 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(default, deny_unknown_fields, rename_all = "camelCase")
)]
pub struct Options {
    /// Width of the per-millisecond sequence field. Also read as `idBits`.
    #[cfg_attr(feature = "serde", serde(alias = "idBits"))]
    pub sequence_bits: u8,
    /// This instance's machine tag.
    pub machine_id: u64,
    /// Width of the machine field. Also read as `machineIdBits`.
    #[cfg_attr(feature = "serde", serde(alias = "machineIdBits"))]
    pub machine_bits: u8,
    /// This instance's region tag. Optional; zero with zero width by default.
    pub region_id: u64,
    /// Width of the region field. Keep it at six bits or fewer. Also read as
    /// `regionIdBits`.
    #[cfg_attr(feature = "serde", serde(alias = "regionIdBits"))]
    pub region_bits: u8,
    /// Namespace prefix for counter-store keys. Also read as `cachePrefix`.
    #[cfg_attr(feature = "serde", serde(alias = "cachePrefix"))]
    pub key_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sequence_bits: DEFAULT_SEQUENCE_BITS,
            machine_id: 0,
            machine_bits: DEFAULT_MACHINE_BITS,
            region_id: 0,
            region_bits: 0,
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
        }
    }
}

impl Options {
    /// Sets the sequence field width.
    #[must_use]
    pub fn with_sequence_bits(mut self, bits: u8) -> Self {
        self.sequence_bits = bits;
        self
    }

    /// Sets the machine tag.
    #[must_use]
    pub fn with_machine_id(mut self, machine_id: u64) -> Self {
        self.machine_id = machine_id;
        self
    }

    /// Sets the machine field width.
    #[must_use]
    pub fn with_machine_bits(mut self, bits: u8) -> Self {
        self.machine_bits = bits;
        self
    }

    /// Sets the region tag and the region field width.
    #[must_use]
    pub fn with_region(mut self, region_id: u64, bits: u8) -> Self {
        self.region_id = region_id;
        self.region_bits = bits;
        self
    }

    /// Sets the counter key prefix.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Checks the field widths and tags, returning the resulting [`Layout`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::SequenceBitsZero`] if `sequence_bits` is zero
    /// - [`ConfigError::BitBudgetExceeded`] if the three widths add up to more
    ///   than [`Layout::MAX_TAIL_FIELD_BITS`]
    /// - [`ConfigError::MachineIdOutOfRange`] or
    ///   [`ConfigError::RegionIdOutOfRange`] if a tag does not fit its width;
    ///   silently truncating it would alias another instance's IDs
    pub fn validate(&self) -> Result<Layout, ConfigError> {
        if self.sequence_bits == 0 {
            return Err(ConfigError::SequenceBitsZero);
        }

        let total = u32::from(self.sequence_bits)
            + u32::from(self.machine_bits)
            + u32::from(self.region_bits);
        if total > u32::from(Layout::MAX_TAIL_FIELD_BITS) {
            return Err(ConfigError::BitBudgetExceeded {
                total,
                max: Layout::MAX_TAIL_FIELD_BITS,
            });
        }

        let layout = Layout::new(self.sequence_bits, self.machine_bits, self.region_bits);
        if self.machine_id > layout.max_machine_id() {
            return Err(ConfigError::MachineIdOutOfRange {
                machine_id: self.machine_id,
                max: layout.max_machine_id(),
            });
        }
        if self.region_id > layout.max_region_id() {
            return Err(ConfigError::RegionIdOutOfRange {
                region_id: self.region_id,
                max: layout.max_region_id(),
            });
        }

        Ok(layout)
    }
}

/// Errors raised while building or loading [`Options`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A zero-width sequence field leaves no room for any ID.
    #[error("sequence_bits must be at least 1")]
    SequenceBitsZero,

    /// The region, machine, and sequence widths overflow the tail.
    #[error("sequence, machine and region bits total {total}, exceeding the {max}-bit budget")]
    BitBudgetExceeded {
        /// Sum of the three widths.
        total: u32,
        /// The allowed maximum.
        max: u8,
    },

    /// The machine tag does not fit in `machine_bits`.
    #[error("machine_id {machine_id} exceeds the field maximum {max}")]
    MachineIdOutOfRange {
        /// The configured machine tag.
        machine_id: u64,
        /// Highest tag the width allows.
        max: u64,
    },

    /// The region tag does not fit in `region_bits`.
    #[error("region_id {region_id} exceeds the field maximum {max}")]
    RegionIdOutOfRange {
        /// The configured region tag.
        region_id: u64,
        /// Highest tag the width allows.
        max: u64,
    },

    /// The configuration file does not exist.
    #[cfg_attr(docsrs, doc(cfg(feature = "config")))]
    #[cfg(feature = "config")]
    #[error("configuration file {} not found", .0.display())]
    NotFound(std::path::PathBuf),

    /// The configuration file exists but could not be read.
    #[cfg_attr(docsrs, doc(cfg(feature = "config")))]
    #[cfg(feature = "config")]
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Io {
        /// The file being read.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration source is malformed.
    #[cfg_attr(docsrs, doc(cfg(feature = "config")))]
    #[cfg(feature = "config")]
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A configuration value could not be parsed for its key.
    #[cfg_attr(docsrs, doc(cfg(feature = "config")))]
    #[cfg(feature = "config")]
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// The variable name.
        key: String,
        /// The rejected value.
        value: String,
    },
}
