//! Frame rendering: the per-tick draw sequence and the viewport it targets.

pub mod frame;
pub mod viewport;

pub use frame::*;
pub use viewport::*;
