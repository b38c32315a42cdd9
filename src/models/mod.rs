pub mod enums;
pub mod intent;
pub mod smart_rule;
pub mod usage;

pub use enums::*;
pub use intent::*;
pub use smart_rule::*;
pub use usage::*;
