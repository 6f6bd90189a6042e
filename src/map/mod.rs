//! Map module - Nested update maps and has-many reconciliation.
//!
//! A [`Map`] describes a partial update of one record. Nested maps update
//! has-one and belongs-to associations; lists of maps are reconciled against
//! the loaded members of a has-many association.

mod map;
mod reconciler;

#[cfg(test)]
mod map_test;


pub use map::*;
pub use reconciler::*;
