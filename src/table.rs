//! Table schema snapshots and the alter script between two of them.

use serde::Serialize;
use std::path::Path;

use crate::check::Check;
use crate::column::{Column, Columns, quote_literal};
use crate::description::{TableDescription, resolve_check};
use crate::error::{PgBuildError, PgBuildResult, read_file};
use crate::index::Indexes;
use crate::parser::split_name;

/// Knobs for [`Table::alter_to_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlterOptions {
    /// Also add, drop and recreate check constraints.
    pub checks: bool,
}

/// One table's schema at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    /// Schema-qualified name, e.g. `myschema.mytable`.
    pub name: String,
    pub description: Option<String>,
    pub columns: Columns,
    /// Key columns in key order.
    pub primary_key: Vec<Column>,
    pub indexes: Indexes,
    pub check: Vec<Check>,
}

impl Table {
    /// Build a snapshot from a parsed description.
    pub fn from_description(desc: TableDescription) -> PgBuildResult<Self> {
        let name = desc.table;

        let columns = desc
            .columns
            .into_iter()
            .map(|entry| entry.resolve())
            .collect::<PgBuildResult<Columns>>()?;

        let indexes = desc
            .indexes
            .into_iter()
            .map(|entry| entry.resolve(&name))
            .collect::<PgBuildResult<Indexes>>()?;

        let primary_key = resolve_primary_key(&name, &columns, &desc.primary_key)?;

        let check = desc
            .check
            .into_iter()
            .map(|entry| resolve_check(&name, entry))
            .collect::<PgBuildResult<Vec<_>>>()?;

        tracing::debug!(
            "Loaded table {} ({} columns, {} indexes, {} checks)",
            name,
            columns.len(),
            indexes.len(),
            check.len()
        );

        Ok(Self {
            name,
            description: desc.description,
            columns,
            primary_key,
            indexes,
            check,
        })
    }

    /// Parse a YAML description.
    pub fn from_yaml_str(yaml: &str) -> PgBuildResult<Self> {
        let desc: TableDescription =
            serde_yaml::from_str(yaml).map_err(|e| PgBuildError::malformed(e.to_string()))?;
        Self::from_description(desc)
    }

    /// Read and parse a YAML description file.
    pub fn load_yaml_file(path: impl AsRef<Path>) -> PgBuildResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading table description {}", path.display());
        Self::from_yaml_str(&read_file(path)?)
    }

    /// Table name without its schema.
    pub fn unqualified_name(&self) -> &str {
        split_name(&self.name).1
    }

    fn primary_key_clause(&self, key: &[Column]) -> String {
        let names: Vec<&str> = key.iter().map(|c| c.name.as_str()).collect();
        format!(
            "ALTER TABLE {} ADD PRIMARY KEY ({});\n",
            self.name,
            names.join(", ")
        )
    }

    fn comment_clause(&self, description: Option<&str>) -> String {
        let text = description.map_or_else(|| "NULL".to_string(), quote_literal);
        format!("COMMENT ON TABLE {} IS {};\n", self.name, text)
    }

    /// Full DDL: table shell, key, comments, indexes, checks, in that order.
    pub fn create_clause(&self) -> String {
        self.create_statements().concat()
    }

    /// [`Table::create_clause`] one statement at a time.
    pub fn create_statements(&self) -> Vec<String> {
        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);\n",
            self.name,
            self.columns.create_clause()
        )];

        if !self.primary_key.is_empty() {
            statements.push(self.primary_key_clause(&self.primary_key));
        }

        if self.description.is_some() {
            statements.push(self.comment_clause(self.description.as_deref()));
        }
        statements.extend(
            self.columns
                .iter()
                .filter(|c| c.description.is_some())
                .map(|c| c.comment_clause(&self.name)),
        );

        for index in &self.indexes {
            statements.push(index.drop_clause());
            statements.push(index.create_clause());
        }

        statements.extend(self.check.iter().map(Check::create_clause));
        statements
    }

    pub fn drop_clause(&self) -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE;\n", self.name)
    }

    /// Statements migrating this snapshot to `other`. Check constraints are
    /// left alone; see [`Table::alter_to_with`].
    pub fn alter_to(&self, other: &Table) -> String {
        self.alter_to_with(other, &AlterOptions::default())
    }

    /// Statements migrating this snapshot to `other`.
    ///
    /// Passes run in a fixed order: changed/dropped columns, added columns,
    /// indexes, primary key, table comment, then checks when enabled. The
    /// result is not wrapped in a transaction.
    pub fn alter_to_with(&self, other: &Table, options: &AlterOptions) -> String {
        let mut sql = String::new();
        sql.push_str(&self.alter_columns(other));
        sql.push_str(&self.alter_indexes(other));
        sql.push_str(&self.alter_primary_key(other));
        if self.description != other.description {
            sql.push_str(&self.comment_clause(other.description.as_deref()));
        }
        if options.checks {
            sql.push_str(&self.alter_checks(other));
        }
        sql
    }

    fn alter_columns(&self, other: &Table) -> String {
        let mut sql = String::new();

        for column in &self.columns {
            if other.columns.contains(column) {
                continue;
            }
            match other.columns.get(&column.name) {
                Some(target) => sql.push_str(&column.alter_to(&self.name, target)),
                None => sql.push_str(&column.drop_clause(&self.name)),
            }
        }

        for column in &other.columns {
            if !self.columns.contains_name(&column.name) {
                sql.push_str(&column.add_clause(&self.name));
            }
        }

        sql
    }

    fn alter_indexes(&self, other: &Table) -> String {
        let mut sql = String::new();

        for index in &self.indexes {
            if other.indexes.contains(index) {
                continue;
            }
            sql.push_str(&index.drop_clause());
            if let Some(target) = other.indexes.get(&index.name) {
                sql.push_str(&target.create_clause());
            }
        }

        for index in &other.indexes {
            if !self.indexes.contains_name(&index.name) {
                sql.push_str(&index.create_clause());
            }
        }

        sql
    }

    /// Key order matters here, unlike column order.
    fn alter_primary_key(&self, other: &Table) -> String {
        if self.primary_key == other.primary_key {
            return String::new();
        }

        let mut sql = String::new();
        if !self.primary_key.is_empty() {
            // Constraint name follows the catalog's default `<table>_pkey`.
            sql.push_str(&format!(
                "ALTER TABLE {} DROP {}_pkey;\n",
                self.name,
                self.unqualified_name()
            ));
        }
        if !other.primary_key.is_empty() {
            sql.push_str(&self.primary_key_clause(&other.primary_key));
        }
        sql
    }

    fn alter_checks(&self, other: &Table) -> String {
        let mut sql = String::new();

        for check in &self.check {
            if other.check.contains(check) {
                continue;
            }
            sql.push_str(&check.drop_clause());
            if let Some(target) = other.check.iter().find(|c| c.name == check.name) {
                sql.push_str(&target.create_clause());
            }
        }

        for check in &other.check {
            if !self.check.iter().any(|c| c.name == check.name) {
                sql.push_str(&check.create_clause());
            }
        }

        sql
    }
}

/// Look up key columns by name, failing on any name the table lacks.
pub(crate) fn resolve_primary_key(
    table: &str,
    columns: &Columns,
    names: &[String],
) -> PgBuildResult<Vec<Column>> {
    names
        .iter()
        .map(|name| {
            columns
                .get(name)
                .cloned()
                .ok_or_else(|| PgBuildError::UnresolvedPrimaryKey {
                    table: table.to_string(),
                    column: name.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;

    fn table(yaml: &str) -> Table {
        Table::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn test_missing_table_key_is_malformed() {
        let err = Table::from_yaml_str("columns: [{id: int}]").unwrap_err();
        assert!(matches!(err, PgBuildError::Malformed(_)));
    }

    #[test]
    fn test_unknown_primary_key_column() {
        let err = Table::from_yaml_str("table: s.t\ncolumns: [{id: int}]\nprimary_key: [idx]")
            .unwrap_err();
        assert!(matches!(
            err,
            PgBuildError::UnresolvedPrimaryKey { ref column, .. } if column == "idx"
        ));
    }

    #[test]
    fn test_alter_to_self_is_empty() {
        let t = table(
            "table: s.t\ndescription: d\ncolumns: [{id: int}, {name: text}]\n\
             primary_key: [id]\nindexes: [{idx_name: name}]\ncheck: [{positive: id > 0}]",
        );
        assert_eq!(t.alter_to(&t), "");
        assert_eq!(t.alter_to_with(&t, &AlterOptions { checks: true }), "");
    }

    #[test]
    fn test_add_and_drop_are_mirrored() {
        let a = table("table: s.t\ncolumns: [{id: int}]");
        let b = table("table: s.t\ncolumns: [{id: int}, {c: text}]");
        assert_eq!(a.alter_to(&b), "ALTER TABLE s.t ADD COLUMN c text;\n");
        assert_eq!(b.alter_to(&a), "ALTER TABLE s.t DROP COLUMN IF EXISTS c;\n");
    }

    #[test]
    fn test_changed_index_is_recreated_with_target_definition() {
        let mut a = table("table: s.t\ncolumns: [{a: int}, {b: int}]");
        let mut b = a.clone();
        a.indexes.push(Index::new("s.t", "idx", ["a"]));
        b.indexes.push(Index::new("s.t", "idx", ["a", "b"]).unique());

        assert_eq!(
            a.alter_to(&b),
            "DROP INDEX CONCURRENTLY IF EXISTS s.idx;\n\
             CREATE UNIQUE INDEX idx ON s.t USING btree\n    (a, b);\n"
        );
    }

    #[test]
    fn test_primary_key_order_matters() {
        let a = table("table: s.t\ncolumns: [{a: int}, {b: int}]\nprimary_key: [a, b]");
        let b = table("table: s.t\ncolumns: [{a: int}, {b: int}]\nprimary_key: [b, a]");
        assert_eq!(a.columns, b.columns);
        assert_ne!(a.primary_key, b.primary_key);
        assert_eq!(
            a.alter_to(&b),
            "ALTER TABLE s.t DROP t_pkey;\nALTER TABLE s.t ADD PRIMARY KEY (b, a);\n"
        );
    }

    #[test]
    fn test_primary_key_added_or_removed() {
        let keyless = table("table: s.t\ncolumns: [{a: int}]");
        let keyed = table("table: s.t\ncolumns: [{a: int}]\nprimary_key: [a]");
        assert_eq!(
            keyless.alter_to(&keyed),
            "ALTER TABLE s.t ADD PRIMARY KEY (a);\n"
        );
        assert_eq!(keyed.alter_to(&keyless), "ALTER TABLE s.t DROP t_pkey;\n");
    }

    #[test]
    fn test_description_change() {
        let a = table("table: s.t\ndescription: old");
        let b = table("table: s.t\ndescription: it's new");
        let c = table("table: s.t");
        assert_eq!(a.alter_to(&b), "COMMENT ON TABLE s.t IS 'it''s new';\n");
        assert_eq!(a.alter_to(&c), "COMMENT ON TABLE s.t IS NULL;\n");
    }

    #[test]
    fn test_checks_ignored_by_default() {
        let a = table("table: s.t\ncolumns: [{n: int}]\ncheck: [{positive: n > 0}]");
        let b = table("table: s.t\ncolumns: [{n: int}]\ncheck: [{positive: n >= 0}, {small: n < 10}]");
        assert_eq!(a.alter_to(&b), "");
        assert_eq!(
            a.alter_to_with(&b, &AlterOptions { checks: true }),
            "ALTER TABLE s.t DROP CONSTRAINT positive;\n\
             ALTER TABLE s.t ADD CONSTRAINT positive CHECK (n >= 0);\n\
             ALTER TABLE s.t ADD CONSTRAINT small CHECK (n < 10);\n"
        );
        assert_eq!(
            b.alter_to_with(&a, &AlterOptions { checks: true }),
            "ALTER TABLE s.t DROP CONSTRAINT positive;\n\
             ALTER TABLE s.t ADD CONSTRAINT positive CHECK (n > 0);\n\
             ALTER TABLE s.t DROP CONSTRAINT small;\n"
        );
    }

    #[test]
    fn test_drop_clause() {
        let t = table("table: s.t");
        assert_eq!(t.drop_clause(), "DROP TABLE IF EXISTS s.t CASCADE;\n");
    }

    #[test]
    fn test_create_statements() {
        let t = table(
            "table: s.t\ncolumns: [{id: int}, {name: {type: text, description: who}}]\n\
             primary_key: [id]\nindexes: [{idx_name: name}]",
        );
        let statements = t.create_statements();
        assert_eq!(statements.len(), 5);
        assert_eq!(statements[1], "ALTER TABLE s.t ADD PRIMARY KEY (id);\n");
        assert_eq!(statements[2], "COMMENT ON COLUMN s.t.name IS 'who';\n");
        assert_eq!(statements[3], "DROP INDEX CONCURRENTLY IF EXISTS s.idx_name;\n");
        assert_eq!(statements.concat(), t.create_clause());
    }
}
