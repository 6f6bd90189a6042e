//! Mutation types and the mutator trait.

use crate::document::Document;
use crate::error::{MutationError, Result};
use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Mutate is a single field assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutate {
    pub field: String,
    pub value: Value,
}

impl Mutate {
    /// Creates an assignment of `value` to `field`.
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Mutate {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// AssocMutation is the mutation of one association field: a mutation per
/// related record, and the primary values of related records to delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssocMutation {
    pub mutations: Vec<Mutation>,
    #[serde(rename = "deletedIds", skip_serializing_if = "Vec::is_empty")]
    pub deleted_ids: Vec<Value>,
}

/// Mutation is everything to be written for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mutation {
    pub mutates: Vec<Mutate>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub assoc: BTreeMap<String, AssocMutation>,

    /// When false, nested association values are skipped.
    #[serde(skip)]
    pub cascade: bool,
}

impl Default for Mutation {
    fn default() -> Self {
        Mutation::new()
    }
}

impl Mutation {
    /// Creates an empty mutation with cascade enabled.
    pub fn new() -> Self {
        Mutation {
            mutates: Vec::new(),
            assoc: BTreeMap::new(),
            cascade: true,
        }
    }

    /// Adds an assignment. A second assignment of the same field replaces the
    /// first one in place.
    pub fn add(&mut self, mutate: Mutate) {
        match self.mutates.iter_mut().find(|m| m.field == mutate.field) {
            Some(existing) => *existing = mutate,
            None => self.mutates.push(mutate),
        }
    }

    /// Returns the assignment of `field`, if any.
    pub fn mutate(&self, field: &str) -> Option<&Mutate> {
        self.mutates.iter().find(|m| m.field == field)
    }

    pub fn set_assoc(&mut self, field: impl Into<String>, mutations: Vec<Mutation>) {
        self.assoc.entry(field.into()).or_default().mutations = mutations;
    }

    pub fn set_deleted_ids(&mut self, field: impl Into<String>, ids: Vec<Value>) {
        self.assoc.entry(field.into()).or_default().deleted_ids = ids;
    }

    pub fn assoc(&self, field: &str) -> Option<&AssocMutation> {
        self.assoc.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.mutates.is_empty() && self.is_assoc_empty()
    }

    pub fn is_assoc_empty(&self) -> bool {
        self.assoc.is_empty()
    }
}

/// Mutator contributes to a mutation of a document.
pub trait Mutator {
    fn apply(&self, doc: &mut dyn Document, mutation: &mut Mutation) -> Result<()>;
}

/// Builds a mutation by applying each mutator in order to a fresh
/// [`Mutation`] with cascade enabled.
pub fn apply(doc: &mut dyn Document, mutators: &[&dyn Mutator]) -> Result<Mutation> {
    let mut mutation = Mutation::new();
    for mutator in mutators {
        mutator.apply(doc, &mut mutation)?;
    }
    Ok(mutation)
}

/// Cascade toggles processing of nested association values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cascade(pub bool);

impl Mutator for Cascade {
    fn apply(&self, _doc: &mut dyn Document, mutation: &mut Mutation) -> Result<()> {
        mutation.cascade = self.0;
        Ok(())
    }
}

impl Mutator for Mutate {
    fn apply(&self, doc: &mut dyn Document, mutation: &mut Mutation) -> Result<()> {
        set_field(doc, &self.field, &self.value, mutation)
    }
}

/// Assigns a scalar into the document and records the assignment.
///
/// The primary key can only be "assigned" its current value, which is a no-op.
pub(crate) fn set_field(doc: &mut dyn Document, field: &str, value: &Value, mutation: &mut Mutation) -> Result<()> {
    if field == doc.primary_field() {
        let current = doc.primary_value();
        if *value != current {
            return Err(MutationError::primary_key_replacement(
                doc.table(),
                field,
                current,
                value.clone(),
            ));
        }
        return Ok(());
    }

    if !doc.set_value(field, value) {
        return Err(MutationError::invalid_field_assignment(
            doc.table(),
            doc.primary_value(),
            field,
            value.clone(),
        ));
    }

    trace!(table = doc.table(), field, %value, "set field");
    mutation.add(Mutate::set(field, value.clone()));
    Ok(())
}
