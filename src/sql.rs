//! Native SQL passthrough.

use crate::value::{fmt_values, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SqlQuery is a native statement with its bound values, passed to the
/// database unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlQuery {
    pub statement: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl SqlQuery {
    pub fn new(statement: impl Into<String>, values: Vec<Value>) -> Self {
        SqlQuery {
            statement: statement.into(),
            values,
        }
    }
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQL({:?}", self.statement)?;
        if !self.values.is_empty() {
            write!(f, ", {}", fmt_values(&self.values))?;
        }
        write!(f, ")")
    }
}
