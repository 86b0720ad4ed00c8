//! Checksum utilities for tying generated code to its source schemas

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Header prefix the emitter writes in front of the source checksum
const HEADER_PREFIX: &str = "//! Source checksum: sha256:";

/// SHA256 checksum of schema content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(data)))
    }

    /// Compute checksum from a string
    pub fn from_str(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Compute checksum from a JSON value's compact text.
    ///
    /// Key order is the document's, so reordering properties (which reorders
    /// generated fields) changes the checksum.
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self::from_str(&value.to_string())
    }

    /// Checksum over several named sources, in the order given
    pub fn combine<'a>(sources: impl IntoIterator<Item = (&'a str, &'a serde_json::Value)>) -> Self {
        let mut hasher = Sha256::new();
        for (name, value) in sources {
            hasher.update(name.as_bytes());
            hasher.update([0]);
            hasher.update(value.to_string().as_bytes());
            hasher.update([0]);
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Read the source checksum recorded in a generated file's header
    pub fn from_generated(code: &str) -> Option<Self> {
        code.lines()
            .take_while(|line| line.starts_with("//!"))
            .find_map(|line| line.strip_prefix(HEADER_PREFIX))
            .map(|hex| Self(hex.trim().to_string()))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
