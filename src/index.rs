//! Index model.

use serde::Serialize;

use crate::parser::split_name;
use crate::set::{Named, NamedSet};

/// Access method used when none is given.
pub const DEFAULT_METHOD: &str = "btree";

/// Indexes of a table: declaration order kept, compared as a set.
pub type Indexes = NamedSet<Index>;

/// An index on a table. Identity covers every field, field order included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Index {
    pub table: String,
    pub name: String,
    pub method: String,
    /// Column names or parenthesized expressions.
    pub fields: Vec<String>,
    pub unique: bool,
    pub predicate: Option<String>,
}

impl Named for Index {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Index {
    pub fn new(
        table: impl Into<String>,
        name: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            method: DEFAULT_METHOD.to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
            unique: false,
            predicate: None,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Index name qualified with the table's schema, if it has one.
    pub fn qualified_name(&self) -> String {
        match split_name(&self.table).0 {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    pub fn create_clause(&self) -> String {
        let unique = if self.unique { " UNIQUE " } else { " " };
        let mut sql = format!(
            "CREATE{}INDEX {} ON {} USING {}\n    ({})",
            unique,
            self.name,
            self.table,
            self.method,
            self.fields.join(", ")
        );
        if let Some(predicate) = &self.predicate {
            sql.push_str("\n    WHERE ");
            sql.push_str(predicate);
        }
        sql.push_str(";\n");
        sql
    }

    pub fn drop_clause(&self) -> String {
        format!("DROP INDEX CONCURRENTLY IF EXISTS {};\n", self.qualified_name())
    }
}
