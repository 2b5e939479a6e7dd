//! Structured table descriptions.
//!
//! A description may spell a column or an index in several shapes:
//!
//! ```yaml
//! table: myschema.mytable
//! description: table of tables
//! columns:
//!     - col1:
//!         type: int
//!         default: 0
//!         not_null: true
//!     - col2: text
//!     - name: col3
//!       type: text
//!       default: ""
//! primary_key: [col1]
//! indexes:
//!     - idx1: [col1, col2]
//!     - idx2: (lower(col2))
//!     - idx3:
//!         fields: [col1, col2]
//!         unique: true
//!         predicate: col1 > 0
//!     - name: idx4
//!       fields: [col1, col2]
//!       method: gin
//! check:
//!     - col1_check: col1 > 0
//! ```
//!
//! Each shape is one variant of an untagged enum here; `resolve` turns it into
//! the canonical model type so nothing past loading sees the variants.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::check::Check;
use crate::column::Column;
use crate::error::{PgBuildError, PgBuildResult};
use crate::index::{DEFAULT_METHOD, Index};

/// Top-level table description.
#[derive(Debug, Clone, Deserialize)]
pub struct TableDescription {
    pub table: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnEntry>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub indexes: Vec<IndexEntry>,
    #[serde(default)]
    pub check: Vec<BTreeMap<String, String>>,
}

/// A column in any of its accepted shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColumnEntry {
    /// `{name: col, type: text, ...}`
    Full(ColumnSpec),
    /// `{col: text}` or `{col: {type: text, ...}}`
    Keyed(BTreeMap<String, ColumnBody>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColumnBody {
    Type(String),
    Attributes(ColumnAttributes),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnAttributes {
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// An index in any of its accepted shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IndexEntry {
    /// `{name: idx, fields: [...], ...}`. Always two keys or more, so a
    /// single-key mapping is never taken for this shape.
    Full(IndexSpec),
    /// `{idx: col}`, `{idx: [cols]}` or `{idx: {fields: [...], ...}}`
    Keyed(BTreeMap<String, IndexBody>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IndexBody {
    Fields(FieldList),
    Attributes(IndexAttributes),
}

/// A single field or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldList {
    One(String),
    Many(Vec<String>),
}

impl FieldList {
    fn into_vec(self) -> Vec<String> {
        match self {
            FieldList::One(field) => vec![field],
            FieldList::Many(fields) => fields,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexSpec {
    pub name: String,
    pub fields: FieldList,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub access_method: Option<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub predicate: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexAttributes {
    #[serde(default)]
    pub fields: Option<FieldList>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub access_method: Option<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub predicate: Option<String>,
}

/// Take the only entry of a single-key mapping.
pub(crate) fn single_entry<V>(map: BTreeMap<String, V>, what: &str) -> PgBuildResult<(String, V)> {
    let len = map.len();
    match map.into_iter().next() {
        Some(entry) if len == 1 => Ok(entry),
        _ => Err(PgBuildError::malformed(format!(
            "{} entry must be a single-key mapping, found {} keys",
            what, len
        ))),
    }
}

/// Textual form of a scalar default; null means no default.
///
/// The flag tells whether the scalar was falsy (`0`, `0.0`, `false`).
fn scalar_text(
    value: Option<serde_yaml::Value>,
    column: &str,
) -> PgBuildResult<(Option<String>, bool)> {
    use serde_yaml::Value;

    match value {
        None | Some(Value::Null) => Ok((None, false)),
        Some(Value::Bool(b)) => Ok((Some(b.to_string()), !b)),
        Some(Value::Number(n)) => {
            let falsy = n.as_f64().is_some_and(|f| f == 0.0);
            Ok((Some(n.to_string()), falsy))
        }
        Some(Value::String(s)) => Ok((Some(s), false)),
        Some(other) => Err(PgBuildError::malformed(format!(
            "default of column '{}' must be a scalar, got {:?}",
            column, other
        ))),
    }
}

impl ColumnEntry {
    pub fn resolve(self) -> PgBuildResult<Column> {
        let (name, data_type, default, not_null, description) = match self {
            ColumnEntry::Full(spec) => (
                spec.name,
                spec.data_type,
                spec.default,
                spec.not_null,
                spec.description,
            ),
            ColumnEntry::Keyed(map) => match single_entry(map, "column")? {
                (name, ColumnBody::Type(data_type)) => (name, data_type, None, false, None),
                (name, ColumnBody::Attributes(attrs)) => (
                    name,
                    attrs.data_type,
                    attrs.default,
                    attrs.not_null,
                    attrs.description,
                ),
            },
        };

        let (default, falsy_default) = scalar_text(default, &name)?;
        Ok(Column {
            name,
            data_type,
            default,
            not_null,
            description,
            falsy_default,
        })
    }
}

impl IndexEntry {
    pub fn resolve(self, table: &str) -> PgBuildResult<Index> {
        let (name, fields, method, access_method, unique, predicate) = match self {
            IndexEntry::Full(spec) => (
                spec.name,
                Some(spec.fields),
                spec.method,
                spec.access_method,
                spec.unique,
                spec.predicate,
            ),
            IndexEntry::Keyed(map) => match single_entry(map, "index")? {
                (name, IndexBody::Fields(fields)) => (name, Some(fields), None, None, false, None),
                (name, IndexBody::Attributes(attrs)) => (
                    name,
                    attrs.fields,
                    attrs.method,
                    attrs.access_method,
                    attrs.unique,
                    attrs.predicate,
                ),
            },
        };

        Ok(Index {
            table: table.to_string(),
            name,
            method: method
                .or(access_method)
                .unwrap_or_else(|| DEFAULT_METHOD.to_string()),
            fields: fields.map(FieldList::into_vec).unwrap_or_default(),
            unique,
            predicate,
        })
    }
}

/// Resolve one `{name: expression}` check entry.
pub fn resolve_check(table: &str, entry: BTreeMap<String, String>) -> PgBuildResult<Check> {
    let (name, expression) = single_entry(entry, "check")?;
    Ok(Check::new(table, name, expression))
}
