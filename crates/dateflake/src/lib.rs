//! Date-prefixed Snowflake IDs.
//!
//! An ID is the local calendar date as `YYYYMMDD` followed by the decimal
//! form of a 64-bit tail packing the millisecond within the day, an optional
//! region, a machine id, and a per-millisecond sequence. Sequences come from
//! a shared [`CounterStore`], so generators in different processes never
//! hand out the same ID.
//!
//! ```
//! use dateflake::{BasicDateSnowflakeGenerator, MemoryCounterStore, Options, SystemClock};
//!
//! let generator = BasicDateSnowflakeGenerator::new(
//!     Options::default().with_machine_id(7),
//!     MemoryCounterStore::default(),
//!     SystemClock,
//! )
//! .unwrap();
//!
//! let id = generator.id().unwrap();
//! assert!(id.chars().all(|c| c.is_ascii_digit()));
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
mod generator;
mod id;
mod store;
mod time;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::store::*;
pub use crate::time::*;
