//! Custom composite types.
//!
//! ```yaml
//! type: myschema.pair
//! attributes:
//!     - left: int
//!     - right: text
//! ```
//!
//! Types are never diffed; callers drop and recreate them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::description::single_entry;
use crate::error::{PgBuildError, PgBuildResult, read_file};

#[derive(Debug, Deserialize)]
struct TypeDescription {
    #[serde(rename = "type")]
    name: String,
    #[serde(default)]
    attributes: Vec<BTreeMap<String, String>>,
}

/// One attribute of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// A composite database type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomType {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl CustomType {
    pub fn from_yaml_str(yaml: &str) -> PgBuildResult<Self> {
        let desc: TypeDescription =
            serde_yaml::from_str(yaml).map_err(|e| PgBuildError::malformed(e.to_string()))?;

        let attributes = desc
            .attributes
            .into_iter()
            .map(|entry| {
                single_entry(entry, "attribute")
                    .map(|(name, data_type)| Attribute { name, data_type })
            })
            .collect::<PgBuildResult<Vec<_>>>()?;

        Ok(Self {
            name: desc.name,
            attributes,
        })
    }

    pub fn load_yaml_file(path: impl AsRef<Path>) -> PgBuildResult<Self> {
        Self::from_yaml_str(&read_file(path.as_ref())?)
    }

    pub fn create_clause(&self) -> String {
        let attrs: Vec<String> = self
            .attributes
            .iter()
            .map(|a| format!("{} {}", a.name, a.data_type))
            .collect();
        format!("CREATE TYPE {} AS ({});\n", self.name, attrs.join(", "))
    }

    pub fn drop_clause(&self) -> String {
        format!("DROP TYPE IF EXISTS {} CASCADE;\n", self.name)
    }
}
