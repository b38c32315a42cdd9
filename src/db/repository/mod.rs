//! Repository layer: keyword rules and daily usage counters.
//!
//! Free functions over a borrowed `Connection`. Rows are stored as plain
//! TEXT/INTEGER columns and parsed back into model types here.

mod smart_rule;
mod usage_counter;

pub use smart_rule::*;
pub use usage_counter::*;
