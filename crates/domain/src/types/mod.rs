//! Domain data types

pub mod ai;
pub mod calendar;
pub mod conflicts;
pub mod email;
pub mod focus;
pub mod patterns;
pub mod schedule;

pub use ai::*;
pub use calendar::*;
pub use conflicts::*;
pub use email::*;
pub use focus::*;
pub use patterns::*;
pub use schedule::*;
