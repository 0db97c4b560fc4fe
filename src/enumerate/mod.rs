pub mod blocking;
pub mod bounded;

pub use blocking::{Enumerator, EnumeratorState, StopReason};
pub use bounded::{BoundedCount, count_models_bounded};
