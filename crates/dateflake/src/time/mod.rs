mod calendar;
mod interface;

pub use calendar::*;
pub use interface::*;
