//! Typed literals that appear on the right-hand side of when-clauses.

pub mod duration;
pub mod percent;
pub mod quantity;
pub mod version;

pub use duration::{format_duration, parse_duration};
pub use percent::{parse_fraction, parse_percentage};
pub use quantity::Quantity;
pub use version::{Version, VersionRange};
