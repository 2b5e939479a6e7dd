//! Check constraints.

use serde::Serialize;

/// A named boolean expression attached to a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Check {
    pub table: String,
    pub name: String,
    pub expression: String,
}

impl Check {
    pub fn new(
        table: impl Into<String>,
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            expression: expression.into(),
        }
    }

    pub fn create_clause(&self) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({});\n",
            self.table, self.name, self.expression
        )
    }

    pub fn drop_clause(&self) -> String {
        format!("ALTER TABLE {} DROP CONSTRAINT {};\n", self.table, self.name)
    }
}
