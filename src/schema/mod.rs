//! Schema module - Table, column and association definitions for records.
//!
//! A schema is plain configuration, usually loaded from YAML, and is immutable
//! once tables have been looked up.

mod elements;
mod validation;

pub use elements::*;
pub use validation::*;
