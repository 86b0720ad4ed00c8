//! Render Configuration
//!
//! Everything that changes emitted text without changing the type model:
//! - TypeMappings: Rust type per scalar kind and collection shape
//! - KeywordEscape: how field names that collide with keywords are spelled
//! - Derives and accessors
//!
//! The type model is config-free apart from `GenerationConfig`; only
//! emission reads this profile.

use serde::{Deserialize, Serialize};

use crate::model::ScalarKind;
use crate::naming;

// =============================================================================
// Render Profile
// =============================================================================

/// Rust rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderProfile {
    /// Type mappings for scalars, formats and collections
    pub types: TypeMappings,

    /// Escape for field names that are Rust keywords
    pub keyword_escape: KeywordEscape,

    /// Derives added to every emitted type after the behavior derives
    pub extra_derives: Vec<String>,

    /// Emit `new`, getters and setters for classes
    pub accessors: bool,
}

impl Default for RenderProfile {
    fn default() -> Self {
        Self::rust()
    }
}

/// Type mappings for scalar kinds and collections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeMappings {
    pub string: String,
    pub integer: String,
    pub number: String,
    pub boolean: String,
    pub null: String,
    pub any: String,

    /// Format-specific mappings
    pub datetime: String,
    pub date: String,
    pub time: String,
    pub uri: String,
    pub email: String,
    pub uuid: String,

    /// Collection constructors, applied as `<ctor><T>`
    pub list: String,
    pub set: String,
    /// Map constructor, applied as `<ctor><String, T>`
    pub map: String,
}

impl Default for TypeMappings {
    fn default() -> Self {
        Self {
            string: "String".to_string(),
            integer: "i64".to_string(),
            number: "f64".to_string(),
            boolean: "bool".to_string(),
            null: "()".to_string(),
            any: "serde_json::Value".to_string(),
            datetime: "chrono::DateTime<chrono::Utc>".to_string(),
            date: "chrono::NaiveDate".to_string(),
            time: "chrono::NaiveTime".to_string(),
            uri: "String".to_string(),
            email: "String".to_string(),
            uuid: "uuid::Uuid".to_string(),
            // Hashing every field is done over JSON text, so item types need
            // not be Ord or Hash: sets are plain vectors.
            list: "Vec".to_string(),
            set: "Vec".to_string(),
            map: "std::collections::BTreeMap".to_string(),
        }
    }
}

/// Keyword escape strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeywordEscape {
    /// `type` -> `r#type`
    #[default]
    Raw,
    /// `type` -> `type_`
    Suffix,
}

impl RenderProfile {
    /// The default Rust profile
    pub fn rust() -> Self {
        Self {
            types: TypeMappings::default(),
            keyword_escape: KeywordEscape::Raw,
            extra_derives: Vec::new(),
            accessors: true,
        }
    }
}

// =============================================================================
// Render Helpers
// =============================================================================

impl RenderProfile {
    /// Escape a keyword if needed.
    ///
    /// `self`, `Self`, `super` and `crate` cannot be raw identifiers and always
    /// take the suffix.
    pub fn escape_keyword(&self, name: &str) -> String {
        if !naming::is_keyword(name) {
            return name.to_string();
        }
        match (self.keyword_escape, name) {
            (_, "self" | "Self" | "super" | "crate") | (KeywordEscape::Suffix, _) => format!("{}_", name),
            (KeywordEscape::Raw, _) => format!("r#{}", name),
        }
    }

    /// Rust type for a scalar kind
    pub fn scalar_type(&self, kind: ScalarKind) -> &str {
        let types = &self.types;
        match kind {
            ScalarKind::String => &types.string,
            ScalarKind::Integer => &types.integer,
            ScalarKind::Number => &types.number,
            ScalarKind::Boolean => &types.boolean,
            ScalarKind::Null => &types.null,
            ScalarKind::Any => &types.any,
            ScalarKind::DateTime => &types.datetime,
            ScalarKind::Date => &types.date,
            ScalarKind::Time => &types.time,
            ScalarKind::Uri => &types.uri,
            ScalarKind::Email => &types.email,
            ScalarKind::Uuid => &types.uuid,
        }
    }

    pub fn wrap_optional(&self, type_str: &str) -> String {
        format!("Option<{}>", type_str)
    }

    pub fn wrap_list(&self, type_str: &str) -> String {
        format!("{}<{}>", self.types.list, type_str)
    }

    pub fn wrap_set(&self, type_str: &str) -> String {
        format!("{}<{}>", self.types.set, type_str)
    }

    pub fn wrap_map(&self, value_type: &str) -> String {
        format!("{}<String, {}>", self.types.map, value_type)
    }

    /// Wrap a type in Box (for recursion)
    pub fn wrap_box(&self, type_str: &str) -> String {
        format!("Box<{}>", type_str)
    }
}
