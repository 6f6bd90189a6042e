//! Schema loading and consistency checks.

use super::{Schema, Table};
use std::collections::HashSet;
use thiserror::Error;

/// SchemaError reports a schema that cannot back records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("failed to parse schema: {message}")]
    Parse { message: String },

    #[error("duplicate table: {table}")]
    DuplicateTable { table: String },

    #[error("{table}: primary key {field} is not a declared column")]
    MissingPrimaryKey { table: String, field: String },

    #[error("{table}: association {field} targets unknown table {target}")]
    UnknownTable {
        table: String,
        field: String,
        target: String,
    },

    #[error("{table}: {field} is declared more than once")]
    DuplicateField { table: String, field: String },
}

impl Schema {
    /// Parses a schema from YAML (or JSON) and validates it.
    pub fn from_yaml(yaml: &str) -> Result<Schema, SchemaError> {
        let schema: Schema = serde_yaml::from_str(yaml).map_err(|e| SchemaError::Parse {
            message: e.to_string(),
        })?;
        schema.validate()?;
        Ok(schema)
    }

    /// Validates table names, primary keys and association targets.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut names = HashSet::new();
        for table in &self.tables {
            if !names.insert(table.name.as_str()) {
                return Err(SchemaError::DuplicateTable {
                    table: table.name.clone(),
                });
            }
        }

        for table in &self.tables {
            validate_table(table, &names)?;
        }
        Ok(())
    }
}

fn validate_table(table: &Table, tables: &HashSet<&str>) -> Result<(), SchemaError> {
    if table.column(&table.primary_key).is_none() {
        return Err(SchemaError::MissingPrimaryKey {
            table: table.name.clone(),
            field: table.primary_key.clone(),
        });
    }

    let mut fields = HashSet::new();
    let declared = table
        .columns
        .iter()
        .map(|c| &c.name)
        .chain(table.associations.iter().map(|a| &a.name));
    for name in declared {
        if !fields.insert(name.as_str()) {
            return Err(SchemaError::DuplicateField {
                table: table.name.clone(),
                field: name.clone(),
            });
        }
    }

    for assoc in &table.associations {
        if !tables.contains(assoc.table.as_str()) {
            return Err(SchemaError::UnknownTable {
                table: table.name.clone(),
                field: assoc.name.clone(),
                target: assoc.table.clone(),
            });
        }
    }
    Ok(())
}
