pub mod error;
pub mod interval;
pub mod time;

pub use error::ValidationError;
pub use interval::IntervalPredicate;
pub use time::{highest_datetime, lowest_datetime};
