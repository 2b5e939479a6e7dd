//! # pgbuild: declarative PostgreSQL schemas
//!
//! Tables are described in YAML (or read back from a live database) and
//! turned into DDL: a full create script, or the minimal alter script that
//! takes one definition to another.
//!
//! ## Quick Example
//!
//! ```rust
//! use pgbuild::prelude::*;
//!
//! let current = Table::from_yaml_str("
//! table: app.users
//! columns:
//!     - id: integer
//! ").unwrap();
//!
//! let target = Table::from_yaml_str("
//! table: app.users
//! columns:
//!     - id: integer
//!     - email: text
//! ").unwrap();
//!
//! assert_eq!(
//!     current.alter_to(&target),
//!     "ALTER TABLE app.users ADD COLUMN email text;\n"
//! );
//! ```
//!
//! ## Modules
//!
//! | Module      | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `table`     | Table snapshots, create and alter scripts        |
//! | `catalog`   | Snapshots of live tables                         |
//! | `role`      | Ordered object sets deployed together            |
//! | `builder`   | `psql` and `ansible` build trees                 |
//! | `engine`    | Running scripts against a database               |

pub mod builder;
pub mod catalog;
pub mod check;
pub mod column;
pub mod config;
pub mod description;
pub mod engine;
pub mod error;
pub mod function;
pub mod index;
pub mod parser;
pub mod role;
pub mod set;
pub mod table;
pub mod types;

pub mod prelude {
    pub use crate::builder::{Layout, build_roles};
    pub use crate::check::Check;
    pub use crate::column::{Column, Columns};
    pub use crate::config::Config;
    pub use crate::engine::{PgBuildDb, load_from_location};
    pub use crate::error::*;
    pub use crate::function::Function;
    pub use crate::index::{Index, Indexes};
    pub use crate::role::{Role, RoleItem, load_roles};
    pub use crate::set::{Named, NamedSet};
    pub use crate::table::{AlterOptions, Table};
    pub use crate::types::CustomType;
}

pub use error::{PgBuildError, PgBuildResult};
pub use table::Table;
