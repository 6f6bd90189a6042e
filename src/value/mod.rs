//! Value module - Scalar values carried by update maps and records.
//!
//! Values are hashable and totally ordered so they can serve as primary keys.

mod value;

pub use value::*;
