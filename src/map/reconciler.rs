//! Reconciliation of a list of maps against a loaded has-many collection.

use super::{Map, MapValue};
use crate::document::Collection;
use crate::error::{MutationError, Result};
use crate::mutation::Mutation;
use crate::value::Value;
use std::collections::HashMap;
use tracing::debug;

/// Owner identifies the record and association field a collection belongs
/// to, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    pub table: String,
    pub id: Value,
    pub field: String,
}

impl Owner {
    pub fn new(table: impl Into<String>, id: Value, field: impl Into<String>) -> Self {
        Owner {
            table: table.into(),
            id,
            field: field.into(),
        }
    }
}

/// Reconciles `maps` against the loaded members of a has-many association.
///
/// A map carrying the primary field updates the loaded member with that
/// primary value; a map without it inserts a new member. Members not
/// referenced by any map are deleted. Returns one mutation per map and the
/// primary values of the deleted members.
///
/// The collection is reordered in place so that `mutations[i]` belongs to
/// member `i`: updated members first in map order, then inserted members.
/// Deleted members are truncated from the collection.
pub fn reconcile(
    owner: &Owner,
    maps: &[Map],
    collection: &mut dyn Collection,
) -> Result<(Vec<Mutation>, Vec<Value>)> {
    let primary_field = collection.primary_field().to_string();
    let mut primary_values = collection.primary_values();
    let mut index: HashMap<Value, usize> = primary_values
        .iter()
        .enumerate()
        .map(|(i, v)| (v.clone(), i))
        .collect();

    let mut mutations = Vec::with_capacity(maps.len());
    let mut inserts = Vec::new();
    let mut curr = 0;

    for map in maps {
        let Some(id) = map.get(&primary_field) else {
            inserts.push(map);
            continue;
        };

        let found = match id {
            MapValue::Scalar(id) => index.remove(id),
            _ => None,
        };
        let Some(found) = found else {
            let id = match id {
                MapValue::Scalar(id) => id.clone(),
                other => Value::String(other.to_string()),
            };
            return Err(MutationError::unmatched_association_identity(
                owner.table.as_str(),
                owner.id.clone(),
                owner.field.as_str(),
                collection.table(),
                id,
            ));
        };

        if found != curr {
            collection.swap(found, curr);
            primary_values.swap(found, curr);
            // The member displaced from `curr` is still unmatched.
            index.insert(primary_values[found].clone(), found);
        }

        mutations.push(map.build(collection.get(curr), true)?);
        curr += 1;
    }

    let deleted_ids = if curr < collection.len() {
        let stale = primary_values[curr..].to_vec();
        collection.truncate(0, curr);
        stale
    } else {
        Vec::new()
    };

    for map in &inserts {
        mutations.push(map.build(collection.add(), true)?);
    }

    debug!(
        table = owner.table.as_str(),
        field = owner.field.as_str(),
        updated = curr,
        inserted = inserts.len(),
        deleted = deleted_ids.len(),
        "reconciled association"
    );

    Ok((mutations, deleted_ids))
}
