//! Stored SQL scripts (functions, procedures, anything written by hand).

use std::path::Path;

use crate::error::{PgBuildResult, read_file};

/// A SQL script emitted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub script: String,
}

impl Function {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }

    pub fn load_file(path: impl AsRef<Path>) -> PgBuildResult<Self> {
        read_file(path.as_ref()).map(Self::new)
    }
}
