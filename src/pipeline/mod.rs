pub mod assisted;
pub mod classify;
pub mod fallback;
pub mod money;
pub mod normalize;
pub mod quick_add;
pub mod tags;
pub mod temporal;

pub use quick_add::{QuickAddError, QuickAddOutcome, QuickAddPipeline};
