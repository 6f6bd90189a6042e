//! Document module - Mutable views of loaded records.
//!
//! The mutation builder only talks to records through the [`Document`] and
//! [`Collection`] traits. [`Record`] is a schema-driven implementation of both.

mod record;

pub use record::*;

use crate::error::Result;
use crate::schema::AssociationKind;
use crate::value::Value;

/// Document is a mutable handle to one loaded record.
pub trait Document {
    /// Name of the table the record belongs to.
    fn table(&self) -> &str;

    /// Name of the primary key field.
    fn primary_field(&self) -> &str;

    /// Current primary key value, `Value::Null` when not yet assigned.
    fn primary_value(&self) -> Value;

    /// Assigns a scalar to a named field. Returns false if the field does not
    /// exist or cannot hold the value.
    fn set_value(&mut self, field: &str, value: &Value) -> bool;

    /// Resolves the association declared on `field`.
    fn association(&mut self, field: &str) -> Result<Association<'_>>;
}

/// Collection is the ordered, loaded member list of a has-many association.
pub trait Collection {
    /// Name of the members' table.
    fn table(&self) -> &str;

    /// Name of the members' primary key field.
    fn primary_field(&self) -> &str;

    /// Primary key values of all members, aligned with member order.
    fn primary_values(&self) -> Vec<Value>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the member at `index`. Panics if out of bounds.
    fn get(&mut self, index: usize) -> &mut dyn Document;

    /// Appends a new empty member and returns it.
    fn add(&mut self) -> &mut dyn Document;

    fn swap(&mut self, i: usize, j: usize);

    /// Keeps only the members in `[i, j)`.
    fn truncate(&mut self, i: usize, j: usize);
}

/// Association is a borrowed handle to the related side of a relation.
pub enum Association<'a> {
    HasOne(&'a mut dyn Document),
    BelongsTo(&'a mut dyn Document),
    HasMany(&'a mut dyn Collection),
}

impl Association<'_> {
    pub fn kind(&self) -> AssociationKind {
        match self {
            Association::HasOne(_) => AssociationKind::HasOne,
            Association::BelongsTo(_) => AssociationKind::BelongsTo,
            Association::HasMany(_) => AssociationKind::HasMany,
        }
    }
}
