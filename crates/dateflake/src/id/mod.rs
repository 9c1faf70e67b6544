mod date_snowflake;
mod layout;
#[cfg(feature = "serde")]
mod serde;

pub use date_snowflake::*;
pub use layout::*;
