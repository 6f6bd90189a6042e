//! Schema-driven records.

use super::{Association, Collection, Document};
use crate::error::{MutationError, Result};
use crate::map::{Map, MapValue};
use crate::schema::{AssociationDef, AssociationKind, Schema, Table};
use crate::value::Value;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// RecordError reports data that does not fit the schema while loading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("unknown table: {table}")]
    UnknownTable { table: String },

    #[error("{table}: unknown field {field}")]
    UnknownField { table: String, field: String },

    #[error("{table}: cannot load {value} as {field}")]
    InvalidValue {
        table: String,
        field: String,
        value: Value,
    },

    #[error("{table}: {field} is a {kind} association")]
    Cardinality {
        table: String,
        field: String,
        kind: AssociationKind,
    },
}

/// Record is one row of a schema table together with its loaded associations.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    table: String,
    primary_field: String,
    values: BTreeMap<String, Value>,
    associations: BTreeMap<String, Loaded>,
}

#[derive(Debug, Clone)]
enum Loaded {
    One(Box<Record>),
    Many(RecordCollection),
}

impl Loaded {
    fn empty(schema: Arc<Schema>, def: &AssociationDef) -> Loaded {
        match def.kind {
            AssociationKind::HasOne | AssociationKind::BelongsTo => {
                Loaded::One(Box::new(Record::empty(schema, &def.table)))
            }
            AssociationKind::HasMany => Loaded::Many(RecordCollection::empty(schema, &def.table)),
        }
    }
}

impl Record {
    /// Creates an empty record of the given table.
    pub fn new(schema: Arc<Schema>, table: &str) -> std::result::Result<Record, RecordError> {
        if schema.find_table(table).is_none() {
            return Err(RecordError::UnknownTable {
                table: table.to_string(),
            });
        }
        Ok(Record::empty(schema, table))
    }

    fn empty(schema: Arc<Schema>, table: &str) -> Record {
        let primary_field = schema
            .find_table(table)
            .map(|t| t.primary_key.clone())
            .unwrap_or_default();
        Record {
            schema,
            table: table.to_string(),
            primary_field,
            values: BTreeMap::new(),
            associations: BTreeMap::new(),
        }
    }

    /// Loads a record, and any nested associations, from a map.
    ///
    /// Unlike applying a map, loading may set the primary key.
    pub fn load(schema: Arc<Schema>, table: &str, map: &Map) -> std::result::Result<Record, RecordError> {
        let mut record = Record::new(Arc::clone(&schema), table)?;

        for (field, value) in map.iter() {
            match value {
                MapValue::Scalar(v) => {
                    if record.definition().and_then(|t| t.column(field)).is_none() {
                        return Err(RecordError::UnknownField {
                            table: table.to_string(),
                            field: field.clone(),
                        });
                    }
                    if !record.set_value(field, v) {
                        return Err(RecordError::InvalidValue {
                            table: table.to_string(),
                            field: field.clone(),
                            value: v.clone(),
                        });
                    }
                }
                MapValue::Single(m) => {
                    let def = record.association_def(field, false)?;
                    let child = Record::load(Arc::clone(&schema), &def.table, m)?;
                    record.associations.insert(field.clone(), Loaded::One(Box::new(child)));
                }
                MapValue::Many(ms) => {
                    let def = record.association_def(field, true)?;
                    let mut members = RecordCollection::empty(Arc::clone(&schema), &def.table);
                    for m in ms {
                        members.records.push(Record::load(Arc::clone(&schema), &def.table, m)?);
                    }
                    record.associations.insert(field.clone(), Loaded::Many(members));
                }
            }
        }

        Ok(record)
    }

    fn association_def(&self, field: &str, many: bool) -> std::result::Result<AssociationDef, RecordError> {
        let def = self
            .definition()
            .and_then(|t| t.association(field))
            .ok_or_else(|| RecordError::UnknownField {
                table: self.table.clone(),
                field: field.to_string(),
            })?;
        if (def.kind == AssociationKind::HasMany) != many {
            return Err(RecordError::Cardinality {
                table: self.table.clone(),
                field: field.to_string(),
                kind: def.kind,
            });
        }
        Ok(def.clone())
    }

    fn definition(&self) -> Option<&Table> {
        self.schema.find_table(&self.table)
    }

    /// Returns the current value of a column.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Returns the loaded record of a has-one or belongs-to association.
    pub fn one(&self, field: &str) -> Option<&Record> {
        match self.associations.get(field) {
            Some(Loaded::One(r)) => Some(r),
            _ => None,
        }
    }

    /// Returns the loaded members of a has-many association.
    pub fn many(&self, field: &str) -> Option<&RecordCollection> {
        match self.associations.get(field) {
            Some(Loaded::Many(c)) => Some(c),
            _ => None,
        }
    }

    /// Renders the record and its loaded associations back into a map.
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        for (field, value) in &self.values {
            map.insert(field.clone(), MapValue::Scalar(value.clone()));
        }
        for (field, loaded) in &self.associations {
            let value = match loaded {
                Loaded::One(r) => MapValue::Single(r.to_map()),
                Loaded::Many(c) => MapValue::Many(c.records.iter().map(Record::to_map).collect()),
            };
            map.insert(field.clone(), value);
        }
        map
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl Document for Record {
    fn table(&self) -> &str {
        &self.table
    }

    fn primary_field(&self) -> &str {
        &self.primary_field
    }

    fn primary_value(&self) -> Value {
        self.values.get(&self.primary_field).cloned().unwrap_or_default()
    }

    fn set_value(&mut self, field: &str, value: &Value) -> bool {
        let stored = self
            .definition()
            .and_then(|t| t.column(field))
            .and_then(|c| c.coerce(value));
        match stored {
            Some(v) => {
                self.values.insert(field.to_string(), v);
                true
            }
            None => false,
        }
    }

    fn association(&mut self, field: &str) -> Result<Association<'_>> {
        let id = self.primary_value();
        let def = self
            .definition()
            .and_then(|t| t.association(field))
            .filter(|def| self.schema.find_table(&def.table).is_some())
            .cloned()
            .ok_or_else(|| MutationError::unknown_association(&self.table, id.clone(), field))?;

        let schema = Arc::clone(&self.schema);
        let loaded = self
            .associations
            .entry(field.to_string())
            .or_insert_with(|| Loaded::empty(schema, &def));

        match (def.kind, loaded) {
            (AssociationKind::HasOne, Loaded::One(r)) => Ok(Association::HasOne(r.as_mut())),
            (AssociationKind::BelongsTo, Loaded::One(r)) => Ok(Association::BelongsTo(r.as_mut())),
            (AssociationKind::HasMany, Loaded::Many(c)) => Ok(Association::HasMany(c)),
            _ => Err(MutationError::unknown_association(&self.table, id, field)),
        }
    }
}

/// RecordCollection holds the loaded members of a has-many association.
#[derive(Debug, Clone)]
pub struct RecordCollection {
    schema: Arc<Schema>,
    table: String,
    primary_field: String,
    records: Vec<Record>,
}

impl RecordCollection {
    fn empty(schema: Arc<Schema>, table: &str) -> RecordCollection {
        let primary_field = schema
            .find_table(table)
            .map(|t| t.primary_key.clone())
            .unwrap_or_default();
        RecordCollection {
            schema,
            table: table.to_string(),
            primary_field,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl Collection for RecordCollection {
    fn table(&self) -> &str {
        &self.table
    }

    fn primary_field(&self) -> &str {
        &self.primary_field
    }

    fn primary_values(&self) -> Vec<Value> {
        self.records.iter().map(Record::primary_value).collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn get(&mut self, index: usize) -> &mut dyn Document {
        &mut self.records[index]
    }

    fn add(&mut self) -> &mut dyn Document {
        self.records.push(Record::empty(Arc::clone(&self.schema), &self.table));
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.records.swap(i, j);
    }

    fn truncate(&mut self, i: usize, j: usize) {
        self.records.truncate(j);
        self.records.drain(..i);
    }
}
