//! Errors raised while turning update maps into mutations.

use crate::schema::AssociationKind;
use crate::value::Value;
use thiserror::Error;

/// MutationError reports a caller contract violation found while building a
/// mutation. None of them is recoverable: the whole apply call is abandoned.
///
/// Every variant names the record being mutated by its table and primary
/// value (`id`, `Value::Null` for records not yet inserted).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    #[error("{table}({current}): replacing primary value ({current} become {replacement}) of {field} is not allowed")]
    PrimaryKeyReplacement {
        table: String,
        field: String,
        current: Value,
        replacement: Value,
    },

    #[error("{table}({id}): cannot assign {value} ({}) as {field}", .value.type_name())]
    InvalidFieldAssignment {
        table: String,
        id: Value,
        field: String,
        value: Value,
    },

    #[error("{table}({id}): cannot associate {kind} relation {field} with {given}")]
    InvalidAssociationCardinality {
        table: String,
        id: Value,
        field: String,
        kind: AssociationKind,
        given: String,
    },

    #[error("{table}({id}): cannot update {field} member {member_table}({member_id}) that is not loaded or doesn't belong to this owner")]
    UnmatchedAssociationIdentity {
        table: String,
        id: Value,
        field: String,
        member_table: String,
        member_id: Value,
    },

    #[error("{table}({id}): {field} is not an association")]
    UnknownAssociation { table: String, id: Value, field: String },
}

impl MutationError {
    /// Creates a primary key replacement error. The current value is the
    /// record's identity.
    pub fn primary_key_replacement(
        table: impl Into<String>,
        field: impl Into<String>,
        current: Value,
        replacement: Value,
    ) -> Self {
        MutationError::PrimaryKeyReplacement {
            table: table.into(),
            field: field.into(),
            current,
            replacement,
        }
    }

    /// Creates an invalid field assignment error.
    pub fn invalid_field_assignment(
        table: impl Into<String>,
        id: Value,
        field: impl Into<String>,
        value: Value,
    ) -> Self {
        MutationError::InvalidFieldAssignment {
            table: table.into(),
            id,
            field: field.into(),
            value,
        }
    }

    /// Creates an association cardinality error. `given` describes the shape
    /// of the offending map value.
    pub fn invalid_association_cardinality(
        table: impl Into<String>,
        id: Value,
        field: impl Into<String>,
        kind: AssociationKind,
        given: impl Into<String>,
    ) -> Self {
        MutationError::InvalidAssociationCardinality {
            table: table.into(),
            id,
            field: field.into(),
            kind,
            given: given.into(),
        }
    }

    /// Creates an unmatched association identity error for `member_id` of
    /// the `field` association owned by `table`/`id`.
    pub fn unmatched_association_identity(
        table: impl Into<String>,
        id: Value,
        field: impl Into<String>,
        member_table: impl Into<String>,
        member_id: Value,
    ) -> Self {
        MutationError::UnmatchedAssociationIdentity {
            table: table.into(),
            id,
            field: field.into(),
            member_table: member_table.into(),
            member_id,
        }
    }

    /// Creates an unknown association error.
    pub fn unknown_association(table: impl Into<String>, id: Value, field: impl Into<String>) -> Self {
        MutationError::UnknownAssociation {
            table: table.into(),
            id,
            field: field.into(),
        }
    }
}

/// Result type for mutation building.
pub type Result<T> = std::result::Result<T, MutationError>;
