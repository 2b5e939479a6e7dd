//! Catalog introspection.
//!
//! [`TableCatalog`] is everything the live database has to say about one
//! table. [`introspect`] fills it from the system catalogs and
//! [`Table::from_catalog`] turns it into the same model a description yields.

use sqlx::{FromRow, PgPool};

use crate::check::Check;
use crate::column::{Column, Columns};
use crate::error::{PgBuildError, PgBuildResult};
use crate::index::{Index, Indexes};
use crate::parser::{split_name, string_literal};
use crate::table::{Table, resolve_primary_key};

const QUERY_TABLE_INFO: &str = "
SELECT description
FROM pg_description
WHERE objoid = $1::regclass
    AND classoid = 'pg_class'::regclass
    AND objsubid = 0";

const QUERY_COLUMNS_INFO: &str = "
SELECT
    a.attname::text AS name,
    format_type(a.atttypid, a.atttypmod) AS data_type,
    a.attnotnull AS not_null,
    a.atthasdef AS has_default,
    pg_get_expr(c.adbin, c.adrelid) AS default_value,
    b.description AS description
FROM pg_attribute a
    LEFT JOIN pg_description b
        ON b.objoid = a.attrelid AND b.objsubid = a.attnum
    LEFT JOIN pg_attrdef c
        ON c.adrelid = a.attrelid AND c.adnum = a.attnum
WHERE a.attrelid = $1::regclass
    AND a.attnum > 0
    AND NOT a.attisdropped
ORDER BY a.attnum";

const QUERY_PK_INFO: &str = "
SELECT
    a.conname::text AS constraint_name,
    a.conindid::regclass::text AS index_relation,
    array_agg(b.attname::text ORDER BY b.attnum) AS columns
FROM pg_constraint a
    JOIN pg_attribute b ON b.attrelid = a.conindid
WHERE a.conrelid = $1::regclass
    AND a.contype = 'p'
    AND b.attnum > 0
GROUP BY a.conname, a.conindid";

const QUERY_CHECK_INFO: &str = "
SELECT
    conname::text AS name,
    pg_get_expr(conbin, conrelid, true) AS expression
FROM pg_constraint
WHERE conrelid = $1::regclass
    AND contype = 'c'
ORDER BY conname";

const QUERY_INDEXES_INFO: &str = "
SELECT
    c.relname::text AS name,
    a.indisunique AS \"unique\",
    d.amname::text AS method,
    ARRAY(
        SELECT pg_get_indexdef(a.indexrelid, k, true)
        FROM generate_series(1, a.indnkeyatts) AS k
        ORDER BY k
    ) AS fields,
    pg_get_expr(a.indpred, a.indrelid, true) AS predicate
FROM pg_index a
    JOIN pg_class c ON c.oid = a.indexrelid
    JOIN pg_am d ON d.oid = c.relam
WHERE a.indrelid = $1::regclass
    AND NOT a.indisprimary
ORDER BY c.relname";

/// What the catalog reports about one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCatalog {
    pub description: Option<String>,
    pub columns: Vec<CatalogColumn>,
    pub primary_key: Option<CatalogPrimaryKey>,
    pub checks: Vec<CatalogCheck>,
    pub indexes: Vec<CatalogIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CatalogColumn {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub has_default: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CatalogPrimaryKey {
    pub constraint_name: String,
    pub index_relation: String,
    /// Key columns in key order.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CatalogCheck {
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CatalogIndex {
    pub name: String,
    pub unique: bool,
    pub method: String,
    pub fields: Vec<String>,
    pub predicate: Option<String>,
}

fn db_error(e: sqlx::Error) -> PgBuildError {
    PgBuildError::Database(e.to_string())
}

/// Read one table's definition from the system catalogs.
pub async fn introspect(pool: &PgPool, table: &str) -> PgBuildResult<TableCatalog> {
    tracing::debug!("Introspecting {}", table);

    let description: Option<(Option<String>,)> = sqlx::query_as(QUERY_TABLE_INFO)
        .bind(table)
        .fetch_optional(pool)
        .await
        .map_err(db_error)?;

    let columns: Vec<CatalogColumn> = sqlx::query_as(QUERY_COLUMNS_INFO)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(db_error)?;

    let primary_key: Option<CatalogPrimaryKey> = sqlx::query_as(QUERY_PK_INFO)
        .bind(table)
        .fetch_optional(pool)
        .await
        .map_err(db_error)?;

    let checks: Vec<CatalogCheck> = sqlx::query_as(QUERY_CHECK_INFO)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(db_error)?;

    let indexes: Vec<CatalogIndex> = sqlx::query_as(QUERY_INDEXES_INFO)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(db_error)?;

    tracing::info!(
        "Introspected {}: {} columns, {} indexes, {} checks",
        table,
        columns.len(),
        indexes.len(),
        checks.len()
    );

    Ok(TableCatalog {
        description: description.and_then(|(d,)| d),
        columns,
        primary_key,
        checks,
        indexes,
    })
}

impl CatalogColumn {
    fn into_column(self) -> Column {
        let mut column = Column {
            name: self.name,
            data_type: self.data_type,
            default: None,
            not_null: self.not_null,
            description: self.description,
            falsy_default: false,
        };
        if self.has_default {
            // Text defaults come back as `'value'::type`; keep just the value
            // so they compare equal to a description's.
            column.default = match self.default_value {
                Some(expr) if column.is_text_type() => Some(string_literal(&expr).unwrap_or(expr)),
                other => other,
            };
        }
        column
    }
}

impl Table {
    /// Build a snapshot from catalog rows.
    pub fn from_catalog(name: impl Into<String>, catalog: TableCatalog) -> PgBuildResult<Self> {
        let name = name.into();

        let columns: Columns = catalog
            .columns
            .into_iter()
            .map(CatalogColumn::into_column)
            .collect();

        let key_names = catalog
            .primary_key
            .map(|pk| pk.columns)
            .unwrap_or_default();
        let primary_key = resolve_primary_key(&name, &columns, &key_names)?;

        let indexes: Indexes = catalog
            .indexes
            .into_iter()
            .map(|idx| Index {
                table: name.clone(),
                name: split_name(&idx.name).1.to_string(),
                method: idx.method,
                fields: idx.fields,
                unique: idx.unique,
                predicate: idx.predicate,
            })
            .collect();

        let check = catalog
            .checks
            .into_iter()
            .map(|c| Check::new(name.as_str(), c.name, c.expression))
            .collect();

        Ok(Self {
            name,
            description: catalog.description,
            columns,
            primary_key,
            indexes,
            check,
        })
    }
}
