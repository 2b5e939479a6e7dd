//! Deployment roles.
//!
//! A role file maps role names to ordered item lists:
//!
//! ```yaml
//! master:
//!   - schema: app
//!   - type: types/pair.yaml
//!   - table: tables/users.yaml
//!   - function: functions/touch.sql
//!   - sql: GRANT USAGE ON SCHEMA app TO reader
//!   - job: "name=vacuum minute=0 job='vacuumdb app'"
//! ```
//!
//! Paths are relative to the role file's directory.

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

use crate::error::{PgBuildError, PgBuildResult, read_file};
use crate::function::Function;
use crate::table::Table;
use crate::types::CustomType;

/// One entry of a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleItem {
    Schema(String),
    Table(PathBuf),
    Function(PathBuf),
    Sql(String),
    Type(PathBuf),
    /// Cron spec for the ansible layout; contributes no SQL.
    Job(String),
}

impl RoleItem {
    fn from_value(entry: &Value) -> PgBuildResult<Self> {
        let map = entry
            .as_mapping()
            .filter(|m| m.len() == 1)
            .ok_or_else(|| PgBuildError::malformed("role item must be a single-key mapping"))?;
        let (key, value) = map
            .iter()
            .next()
            .ok_or_else(|| PgBuildError::malformed("empty role item"))?;

        let kind = key
            .as_str()
            .ok_or_else(|| PgBuildError::malformed(format!("role item key {:?} is not a string", key)))?;
        let value = scalar(value)
            .ok_or_else(|| PgBuildError::malformed(format!("role item '{}' needs a scalar value", kind)))?;

        match kind {
            "schema" => Ok(Self::Schema(value)),
            "table" => Ok(Self::Table(PathBuf::from(value))),
            "function" => Ok(Self::Function(PathBuf::from(value))),
            "sql" => Ok(Self::Sql(value)),
            "type" => Ok(Self::Type(PathBuf::from(value))),
            "job" => Ok(Self::Job(value)),
            other => Err(PgBuildError::UnknownRoleItem(other.to_string())),
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A named, ordered set of objects deployed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub items: Vec<RoleItem>,
    /// Directory relative item paths are joined onto.
    pub base_dir: PathBuf,
}

impl Role {
    /// Whether the role targets every shard of a cluster.
    pub fn is_shard(&self) -> bool {
        self.name.ends_with("_shard")
    }

    pub fn jobs(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                RoleItem::Job(job) => Some(job.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Absolute location of an item path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_path(&self.base_dir, path)
    }

    /// Concatenated install script for every item, in order.
    pub fn build(&self) -> PgBuildResult<String> {
        let mut sql = String::new();

        for item in &self.items {
            match item {
                RoleItem::Schema(name) => {
                    sql.push_str(&format!("CREATE SCHEMA IF NOT EXISTS {};\n", name));
                }
                RoleItem::Table(path) => {
                    sql.push_str(&Table::load_yaml_file(self.resolve(path))?.create_clause());
                }
                RoleItem::Function(path) => {
                    sql.push_str(&Function::load_file(self.resolve(path))?.script);
                }
                RoleItem::Sql(text) => {
                    sql.push_str(text.trim_end().trim_end_matches(';'));
                    sql.push_str(";\n");
                }
                RoleItem::Type(path) => {
                    let custom_type = CustomType::load_yaml_file(self.resolve(path))?;
                    sql.push_str(&custom_type.drop_clause());
                    sql.push_str(&custom_type.create_clause());
                }
                RoleItem::Job(_) => {}
            }
        }

        tracing::debug!("Built role {} ({} items)", self.name, self.items.len());
        Ok(sql)
    }
}

/// Join `path` onto `base`, expanding a leading `~/`.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    base.join(path)
}

/// Parse role definitions; item paths resolve against `base_dir`.
pub fn parse_roles(yaml: &str, base_dir: &Path) -> PgBuildResult<Vec<Role>> {
    let doc: Mapping = serde_yaml::from_str(yaml)?;

    doc.iter()
        .map(|(name, items)| {
            let name = name
                .as_str()
                .ok_or_else(|| PgBuildError::malformed(format!("role name {:?} is not a string", name)))?;
            let items = items
                .as_sequence()
                .ok_or_else(|| PgBuildError::malformed(format!("role '{}' must be a list of items", name)))?
                .iter()
                .map(RoleItem::from_value)
                .collect::<PgBuildResult<Vec<_>>>()?;

            Ok(Role {
                name: name.to_string(),
                items,
                base_dir: base_dir.to_path_buf(),
            })
        })
        .collect()
}

/// Load a role file; item paths resolve against its directory.
pub fn load_roles(path: impl AsRef<Path>) -> PgBuildResult<Vec<Role>> {
    let path = std::path::absolute(path.as_ref())?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let roles = parse_roles(&read_file(&path)?, &base_dir)?;
    tracing::info!("Loaded {} role(s) from {}", roles.len(), path.display());
    Ok(roles)
}
