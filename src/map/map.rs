//! Update maps and the mutation builder.

use super::reconciler::{reconcile, Owner};
use crate::document::{Association, Document};
use crate::error::{MutationError, Result};
use crate::mutation::{self, Cascade, Mutation, Mutator};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug_span, trace};

/// Map is a partial update of a record keyed by field name.
///
/// Scalars are assigned to columns, a nested map updates a has-one or
/// belongs-to association, and a list of maps updates a has-many association.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Map {
    pub fields: BTreeMap<String, MapValue>,
}

/// MapValue is the value of one map entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapValue {
    Scalar(Value),
    Single(Map),
    Many(Vec<Map>),
}

impl MapValue {
    /// Describes the shape of the value for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            MapValue::Scalar(_) => "a scalar",
            MapValue::Single(_) => "a map",
            MapValue::Many(_) => "a list of maps",
        }
    }
}

impl Map {
    pub fn new() -> Self {
        Map {
            fields: BTreeMap::new(),
        }
    }

    /// Adds an entry and returns the map, for building maps inline.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MapValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MapValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MapValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MapValue)> {
        self.fields.iter()
    }

    /// Applies the map to a document and returns the resulting mutation.
    /// With `cascade` false, nested association values are ignored.
    pub fn build(&self, doc: &mut dyn Document, cascade: bool) -> Result<Mutation> {
        mutation::apply(doc, &[&Cascade(cascade), self])
    }
}

impl Mutator for Map {
    fn apply(&self, doc: &mut dyn Document, mutation: &mut Mutation) -> Result<()> {
        let span = debug_span!("apply_map", table = doc.table(), fields = self.len());
        let _enter = span.enter();

        for (field, value) in &self.fields {
            match value {
                MapValue::Single(map) => {
                    if !mutation.cascade {
                        trace!(field = field.as_str(), "skipping association, cascade disabled");
                        continue;
                    }

                    let owner = Owner::new(doc.table(), doc.primary_value(), field.as_str());
                    let target = match doc.association(field)? {
                        Association::HasOne(target) | Association::BelongsTo(target) => target,
                        assoc => {
                            return Err(MutationError::invalid_association_cardinality(
                                owner.table,
                                owner.id,
                                owner.field,
                                assoc.kind(),
                                value.shape(),
                            ));
                        }
                    };

                    let assoc_mutation = map.build(target, true)?;
                    mutation.set_assoc(field, vec![assoc_mutation]);
                }
                MapValue::Many(maps) => {
                    if !mutation.cascade {
                        trace!(field = field.as_str(), "skipping association, cascade disabled");
                        continue;
                    }

                    let owner = Owner::new(doc.table(), doc.primary_value(), field.as_str());
                    let collection = match doc.association(field)? {
                        Association::HasMany(collection) => collection,
                        assoc => {
                            return Err(MutationError::invalid_association_cardinality(
                                owner.table,
                                owner.id,
                                owner.field,
                                assoc.kind(),
                                value.shape(),
                            ));
                        }
                    };

                    let (mutations, deleted_ids) = reconcile(&owner, maps, collection)?;
                    mutation.set_assoc(field, mutations);
                    mutation.set_deleted_ids(field, deleted_ids);
                }
                MapValue::Scalar(v) => mutation::set_field(doc, field, v, mutation)?,
            }
        }

        Ok(())
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Map{{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapValue::Scalar(v) => write!(f, "{}", v),
            MapValue::Single(m) => write!(f, "{}", m),
            MapValue::Many(maps) => {
                write!(f, "[")?;
                for (i, m) in maps.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", m)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<Value> for MapValue {
    fn from(v: Value) -> Self {
        MapValue::Scalar(v)
    }
}

impl From<Map> for MapValue {
    fn from(m: Map) -> Self {
        MapValue::Single(m)
    }
}

impl From<Vec<Map>> for MapValue {
    fn from(maps: Vec<Map>) -> Self {
        MapValue::Many(maps)
    }
}

impl From<bool> for MapValue {
    fn from(b: bool) -> Self {
        MapValue::Scalar(Value::Bool(b))
    }
}

impl From<i64> for MapValue {
    fn from(i: i64) -> Self {
        MapValue::Scalar(Value::Int(i))
    }
}

impl From<i32> for MapValue {
    fn from(i: i32) -> Self {
        MapValue::Scalar(Value::from(i))
    }
}

impl From<f64> for MapValue {
    fn from(f: f64) -> Self {
        MapValue::Scalar(Value::Float(f))
    }
}

impl From<&str> for MapValue {
    fn from(s: &str) -> Self {
        MapValue::Scalar(Value::from(s))
    }
}

impl From<String> for MapValue {
    fn from(s: String) -> Self {
        MapValue::Scalar(Value::String(s))
    }
}

/// Parses a map from JSON.
pub fn from_json(json: &str) -> std::result::Result<Map, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a map from YAML.
pub fn from_yaml(yaml: &str) -> std::result::Result<Map, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}
