//! Table column model.

use serde::Serialize;
use std::hash::{Hash, Hasher};

use crate::parser::base_type;
use crate::set::{Named, NamedSet};

/// Type names whose default values are string literals.
const TEXT_TYPES: &[&str] = &[
    "character varying",
    "varchar",
    "character",
    "char",
    "text",
    "hstore",
    "bit varying",
];

/// Columns of a table: declaration order kept, compared as a set.
pub type Columns = NamedSet<Column>;

/// One table column.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    /// Raw catalog type name, modifiers included (`varchar(10)`).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Default value as written; text types get quoted on output.
    pub default: Option<String>,
    pub not_null: bool,
    pub description: Option<String>,
    /// Default was written as a falsy scalar (`0`, `0.0`, `false`). Such a
    /// default still renders, but does not count as set for `add_clause`.
    /// Not part of equality.
    #[serde(skip)]
    pub(crate) falsy_default: bool,
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.default == other.default
            && self.not_null == other.not_null
            && self.description == other.description
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.data_type.hash(state);
        self.default.hash(state);
        self.not_null.hash(state);
        self.description.hash(state);
    }
}

impl Named for Column {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            default: None,
            not_null: false,
            description: None,
            falsy_default: false,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self.falsy_default = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Whether the type, stripped of its modifier, is text-like.
    pub fn is_text_type(&self) -> bool {
        let base = base_type(&self.data_type).to_lowercase();
        TEXT_TYPES.contains(&base.as_str())
    }

    /// Default rendered as SQL: quoted for text types, verbatim otherwise.
    pub fn default_sql(&self) -> Option<String> {
        self.default.as_deref().map(|value| {
            if self.is_text_type() {
                quote_literal(value)
            } else {
                value.to_string()
            }
        })
    }

    // "is set" checks used by add_clause; alter_to compares for inequality instead.

    fn default_is_set(&self) -> bool {
        !self.falsy_default && self.default.as_deref().is_some_and(|d| !d.is_empty())
    }

    fn description_is_set(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Column definition line inside `CREATE TABLE`.
    pub fn create_clause(&self) -> String {
        let mut sql = format!("    {} {}", self.name, self.data_type);
        if let Some(default) = self.default_sql() {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        sql
    }

    /// `COMMENT ON COLUMN` for this column's description (or `NULL`).
    pub fn comment_clause(&self, table_name: &str) -> String {
        let text = match &self.description {
            Some(description) => quote_literal(description),
            None => "NULL".to_string(),
        };
        format!("COMMENT ON COLUMN {}.{} IS {};\n", table_name, self.name, text)
    }

    /// Statements turning this column into `other`, one per differing field.
    pub fn alter_to(&self, table_name: &str, other: &Column) -> String {
        let alter_column = format!("ALTER TABLE {} ALTER COLUMN {} ", table_name, self.name);
        let mut sql = String::new();

        if self.data_type != other.data_type {
            sql.push_str(&format!("{}TYPE {};\n", alter_column, other.data_type));
        }
        if self.default != other.default {
            match other.default_sql() {
                Some(default) => sql.push_str(&format!("{}SET DEFAULT {};\n", alter_column, default)),
                None => sql.push_str(&format!("{}DROP DEFAULT;\n", alter_column)),
            }
        }
        if self.not_null != other.not_null {
            if other.not_null {
                sql.push_str(&format!("{}SET NOT NULL;\n", alter_column));
            } else {
                sql.push_str(&format!("{}DROP NOT NULL;\n", alter_column));
            }
        }
        if self.description != other.description {
            sql.push_str(&other.comment_clause(table_name));
        }

        sql
    }

    pub fn drop_clause(&self, table_name: &str) -> String {
        format!("ALTER TABLE {} DROP COLUMN IF EXISTS {};\n", table_name, self.name)
    }

    /// `ADD COLUMN` followed by the attributes that are set.
    pub fn add_clause(&self, table_name: &str) -> String {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {};\n",
            table_name, self.name, self.data_type
        );
        let alter_column = format!("ALTER TABLE {} ALTER COLUMN {} ", table_name, self.name);

        if self.default_is_set() {
            if let Some(default) = self.default_sql() {
                sql.push_str(&format!("{}SET DEFAULT {};\n", alter_column, default));
            }
        }
        if self.not_null {
            sql.push_str(&format!("{}SET NOT NULL;\n", alter_column));
        }
        if self.description_is_set() {
            sql.push_str(&self.comment_clause(table_name));
        }

        sql
    }
}

impl NamedSet<Column> {
    /// Column definitions joined for the body of `CREATE TABLE`.
    pub fn create_clause(&self) -> String {
        self.iter()
            .map(Column::create_clause)
            .collect::<Vec<_>>()
            .join(",\n")
    }
}

/// Quote a value as a SQL string literal.
///
/// Single quotes are doubled; a value containing a backslash uses the `E''`
/// form with doubled backslashes.
pub fn quote_literal(value: &str) -> String {
    let escaped = value.replace('\'', "''");
    if escaped.contains('\\') {
        format!("E'{}'", escaped.replace('\\', "\\\\"))
    } else {
        format!("'{}'", escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("foo"), "'foo'");
        assert_eq!(quote_literal(""), "''");
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal("a\\b"), "E'a\\\\b'");
    }

    #[test]
    fn test_default_quoting() {
        let text = Column::new("c", "text").with_default("foo");
        assert_eq!(text.create_clause(), "    c text DEFAULT 'foo'");

        let int = Column::new("c", "int").with_default("0").not_null();
        assert_eq!(int.create_clause(), "    c int DEFAULT 0 NOT NULL");

        let varchar = Column::new("c", "VARCHAR(10)").with_default("x");
        assert_eq!(varchar.create_clause(), "    c VARCHAR(10) DEFAULT 'x'");

        let expr = Column::new("c", "timestamptz").with_default("now()");
        assert_eq!(expr.create_clause(), "    c timestamptz DEFAULT now()");
    }

    #[test]
    fn test_alter_fields_are_independent() {
        let old = Column::new("c", "int");
        let new = Column::new("c", "int").not_null();
        assert_eq!(
            old.alter_to("t", &new),
            "ALTER TABLE t ALTER COLUMN c SET NOT NULL;\n"
        );

        let new = Column::new("c", "text").with_default("x").with_description("note");
        assert_eq!(
            old.alter_to("t", &new),
            "ALTER TABLE t ALTER COLUMN c TYPE text;\n\
             ALTER TABLE t ALTER COLUMN c SET DEFAULT 'x';\n\
             COMMENT ON COLUMN t.c IS 'note';\n"
        );

        assert_eq!(
            new.alter_to("t", &old),
            "ALTER TABLE t ALTER COLUMN c TYPE int;\n\
             ALTER TABLE t ALTER COLUMN c DROP DEFAULT;\n\
             COMMENT ON COLUMN t.c IS NULL;\n"
        );
    }

    #[test]
    fn test_add_clause_skips_unset_values() {
        let col = Column::new("c", "text").with_default("");
        assert_eq!(col.add_clause("t"), "ALTER TABLE t ADD COLUMN c text;\n");

        // An empty default still differs from no default.
        let bare = Column::new("c", "text");
        assert_eq!(
            bare.alter_to("t", &col),
            "ALTER TABLE t ALTER COLUMN c SET DEFAULT '';\n"
        );

        let col = Column::new("n", "int").with_default("1").not_null();
        assert_eq!(
            col.add_clause("t"),
            "ALTER TABLE t ADD COLUMN n int;\n\
             ALTER TABLE t ALTER COLUMN n SET DEFAULT 1;\n\
             ALTER TABLE t ALTER COLUMN n SET NOT NULL;\n"
        );
    }

    #[test]
    fn test_add_clause_skips_falsy_defaults() {
        let zero = Column {
            falsy_default: true,
            ..Column::new("n", "int").with_default("0")
        };
        assert_eq!(zero.add_clause("t"), "ALTER TABLE t ADD COLUMN n int;\n");
        assert_eq!(zero.create_clause(), "    n int DEFAULT 0");

        // Equality ignores how the default was written.
        assert_eq!(zero, Column::new("n", "int").with_default("0"));

        // The string "0" is a set default.
        let text = Column::new("c", "text").with_default("0");
        assert_eq!(
            text.add_clause("t"),
            "ALTER TABLE t ADD COLUMN c text;\n\
             ALTER TABLE t ALTER COLUMN c SET DEFAULT '0';\n"
        );
    }

    #[test]
    fn test_drop_clause() {
        let col = Column::new("legacy", "text");
        assert_eq!(
            col.drop_clause("my.table"),
            "ALTER TABLE my.table DROP COLUMN IF EXISTS legacy;\n"
        );
    }
}
