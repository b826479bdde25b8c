//! Infrastructure Adapters
//!
//! Implementations of infrastructure traits (Time, Ids).

mod ids;
mod time;

pub use ids::{SequentialIdGenerator, UuidGenerator};
pub use time::{FixedClock, SystemClock};
