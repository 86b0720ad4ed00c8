//! Error types for schema compilation

use thiserror::Error;

/// Result type for compilation operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors raised while compiling a schema into a type graph.
///
/// The first error aborts the whole pass. The package it was compiling into
/// is left in an unspecified state and should be discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Type already exists: {name} in package {package}")]
    TypeAlreadyExists { package: String, name: String },

    #[error("Malformed schema for {name}: expected {expected}, found {found}")]
    Malformed {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Duplicate member {name} in type {owner}")]
    DuplicateMember { owner: String, name: String },

    #[error("Unresolved $ref: {reference}")]
    UnresolvedRef { reference: String },

    #[error("Cannot derive an identifier from name {name:?}")]
    InvalidName { name: String },
}

impl GenerationError {
    pub(crate) fn malformed(name: &str, expected: &'static str, node: &serde_json::Value) -> Self {
        Self::Malformed {
            name: name.to_string(),
            expected,
            found: crate::schema::kind_name(node),
        }
    }
}
