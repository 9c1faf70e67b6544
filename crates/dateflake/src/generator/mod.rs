mod basic;
mod interface;
mod lock;
mod slot;
mod status;

pub use basic::*;
pub use interface::*;
pub use lock::*;
pub(crate) use slot::*;
pub use status::*;
