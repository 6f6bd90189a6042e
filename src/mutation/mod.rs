//! Mutation module - The output of applying maps to records.
//!
//! A [`Mutation`] collects field assignments for one record plus the nested
//! mutations and deletions of its associations.

mod mutation;

pub use mutation::*;
