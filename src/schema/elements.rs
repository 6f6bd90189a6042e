//! Core schema elements.

use crate::value::Value;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Schema is a list of named tables.
///
/// Tables are indexed in a map before the first search so this type
/// should be considered immutable.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<Table>,

    #[serde(skip)]
    table_map: OnceCell<HashMap<String, usize>>,
}

impl Clone for Schema {
    fn clone(&self) -> Self {
        Schema::with_tables(self.tables.clone())
    }
}

impl Schema {
    /// Creates a schema from the given tables.
    pub fn with_tables(tables: Vec<Table>) -> Self {
        Schema {
            tables,
            table_map: OnceCell::new(),
        }
    }

    /// Returns the table with the given name, if it exists.
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        let map = self.table_map.get_or_init(|| {
            self.tables
                .iter()
                .enumerate()
                .map(|(i, t)| (t.name.clone(), i))
                .collect()
        });
        map.get(name).map(|&i| &self.tables[i])
    }

    /// Returns the names of all tables in declaration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Table describes one record type: its primary field, columns and
/// associations to other tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub name: String,

    #[serde(default = "default_primary_key", rename = "primaryKey")]
    pub primary_key: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<AssociationDef>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl Table {
    /// Creates an empty table with the given primary field.
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            primary_key: primary_key.into(),
            columns: Vec::new(),
            associations: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_association(mut self, association: AssociationDef) -> Self {
        self.associations.push(association);
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn association(&self, name: &str) -> Option<&AssociationDef> {
        self.associations.iter().find(|a| a.name == name)
    }
}

/// Column is a scalar field stored on the table itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    #[serde(default)]
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Column {
            name: name.into(),
            column_type,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Converts a value into the form stored by this column, or returns None
    /// if the column cannot hold it. Integers widen into float columns.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        if value.is_null() {
            return self.nullable.then_some(Value::Null);
        }

        match (self.column_type, value) {
            (ColumnType::Any, v) => Some(v.clone()),
            (ColumnType::Bool, Value::Bool(_))
            | (ColumnType::Int, Value::Int(_))
            | (ColumnType::String, Value::String(_)) => Some(value.clone()),
            (ColumnType::Float, v) => v.as_float().map(Value::Float),
            _ => None,
        }
    }
}

/// ColumnType is the scalar type a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    String,
    /// Accepts any non-null scalar.
    Any,
}

/// AssociationDef declares a relation from a field of one table to another
/// table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDef {
    pub name: String,
    pub kind: AssociationKind,
    pub table: String,
}

impl AssociationDef {
    pub fn new(name: impl Into<String>, kind: AssociationKind, table: impl Into<String>) -> Self {
        AssociationDef {
            name: name.into(),
            kind,
            table: table.into(),
        }
    }
}

/// AssociationKind is the cardinality of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    HasOne,
    BelongsTo,
    HasMany,
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationKind::HasOne => write!(f, "has one"),
            AssociationKind::BelongsTo => write!(f, "belongs to"),
            AssociationKind::HasMany => write!(f, "has many"),
        }
    }
}
