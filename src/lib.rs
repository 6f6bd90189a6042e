//! # rel-map
//!
//! Turns nested update maps into mutations for relational records.
//!
//! A [`Map`] describes a partial update of one record. Applying it to a loaded
//! [`Document`] assigns scalar fields, recurses into has-one and belongs-to
//! associations, and reconciles lists of maps against the loaded members of
//! has-many associations: members are matched by primary key and updated in
//! place, unreferenced members are deleted, and maps without a primary key
//! become inserts.
//!
//! ## Modules
//!
//! - [`value`] - Scalar values usable as primary keys
//! - [`schema`] - Table, column and association definitions
//! - [`document`] - The document and collection capabilities, and schema-driven records
//! - [`mutation`] - Mutations and the mutator trait
//! - [`map`] - Update maps, the mutation builder and has-many reconciliation
//! - [`sql`] - Native SQL passthrough

pub mod document;
pub mod error;
pub mod map;
pub mod mutation;
pub mod schema;
pub mod sql;
pub mod value;

pub use document::{Association, Collection, Document, Record, RecordCollection, RecordError};
pub use error::{MutationError, Result};
pub use map::{reconcile, Map, MapValue, Owner};
pub use mutation::{apply, AssocMutation, Cascade, Mutate, Mutation, Mutator};
pub use schema::{AssociationKind, Schema, SchemaError};
pub use sql::SqlQuery;
pub use value::Value;
