//! Error types for Dalil.
//!
//! The search path itself is total and never fails; errors only arise at
//! the catalog boundary, where malformed input is the caller's contract
//! violation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DalilError {
    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

impl serde::Serialize for DalilError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
