//! Name Derivation
//!
//! Turns symbolic names taken from a schema (property names, definition
//! names, synthesized item names) into identifiers:
//! - Type names: PascalCase, acronyms preserved
//! - Field names: snake_case
//! - Enum constants: PascalCase
//!
//! Derivation is a pure function of the input and the configured acronyms,
//! so compiling the same schema twice yields the same names. Collisions are
//! not handled here; `Package::declare` rejects them.

use std::collections::HashSet;

use crate::error::{GenerationError, Result};

/// Names that would shadow types the emitted code relies on
const RESERVED_TYPE_NAMES: &[&str] = &[
    "String", "Vec", "Option", "Result", "Box", "Rc", "Arc",
    "HashMap", "HashSet", "BTreeMap", "BTreeSet", "Value",
    "Self", "Some", "None", "Ok", "Err",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else",
    "enum", "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop",
    "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self",
    "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Whether `s` is a Rust keyword (strict or reserved)
pub fn is_keyword(s: &str) -> bool {
    RUST_KEYWORDS.contains(&s)
}

/// Identifier derivation with configured acronyms
#[derive(Debug, Clone)]
pub struct Naming {
    acronyms: HashSet<String>,
}

impl Default for Naming {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl Naming {
    pub fn new<I, S>(acronyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            acronyms: acronyms.into_iter().map(|a| a.into().to_uppercase()).collect(),
        }
    }

    /// Derive a type name: `fooBar` -> `FooBar`, `tenant_id` -> `TenantID`
    /// (with `ID` configured as an acronym).
    pub fn type_name(&self, symbolic: &str) -> Result<String> {
        let mut result = String::with_capacity(symbolic.len());
        for word in words(symbolic) {
            result.push_str(&self.case_word(word));
        }

        if result.is_empty() {
            return Err(GenerationError::InvalidName { name: symbolic.to_string() });
        }
        if result.starts_with(|c: char| c.is_ascii_digit()) {
            result.insert(0, '_');
        }
        if RESERVED_TYPE_NAMES.contains(&result.as_str()) {
            result.push_str("Type");
        }
        Ok(result)
    }

    /// Derive a field name: `firstName` -> `first_name`.
    ///
    /// Keywords are returned unescaped; escaping is a rendering concern.
    pub fn field_name(&self, symbolic: &str) -> Result<String> {
        let mut result = String::with_capacity(symbolic.len() + 4);
        for word in words(symbolic) {
            if !result.is_empty() {
                result.push('_');
            }
            result.push_str(&snake_word(word));
        }

        if result.is_empty() {
            return Err(GenerationError::InvalidName { name: symbolic.to_string() });
        }
        if result.starts_with(|c: char| c.is_ascii_digit()) {
            result.insert(0, '_');
        }
        Ok(result)
    }

    /// Derive an enum constant name from its JSON value.
    ///
    /// Values without any alphanumeric characters become `Empty`.
    pub fn constant_name(&self, value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        for word in words(value) {
            result.push_str(&self.case_word(word));
        }
        if result.is_empty() {
            return "Empty".to_string();
        }
        if result.starts_with(|c: char| c.is_ascii_digit()) {
            result.insert(0, '_');
        }
        if result == "Self" {
            result.push('_');
        }
        result
    }

    /// Apply casing to a word, preserving acronyms
    fn case_word(&self, word: &str) -> String {
        let upper = word.to_uppercase();
        if self.acronyms.contains(&upper) {
            return upper;
        }

        let screaming = word.len() > 1 && word.chars().all(|c| !c.is_ascii_lowercase());
        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => {
                let mut result = first.to_uppercase().to_string();
                if screaming {
                    result.extend(chars.map(|c| c.to_ascii_lowercase()));
                } else {
                    result.extend(chars);
                }
                result
            }
        }
    }
}

/// Split on every character that cannot appear in an identifier
fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_ascii_alphanumeric()).filter(|w| !w.is_empty())
}

/// camelCase word to snake_case
fn snake_word(word: &str) -> String {
    let mut result = String::with_capacity(word.len() + 4);
    let mut prev_lower = false;

    for c in word.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }

    result
}

/// Naive English singular, used to name array item types.
pub fn singular(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with("ies") && name.len() > 3 {
        format!("{}y", &name[..name.len() - 3])
    } else if ["sses", "shes", "ches", "xes"].iter().any(|s| lower.ends_with(s)) {
        name[..name.len() - 2].to_string()
    } else if lower.ends_with('s') && !lower.ends_with("ss") && name.len() > 1 {
        name[..name.len() - 1].to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> Naming {
        Naming::new(["ID", "URL", "API"])
    }

    #[test]
    fn test_type_name() {
        let naming = naming();
        assert_eq!(naming.type_name("fooBar").unwrap(), "FooBar");
        assert_eq!(naming.type_name("existingClass").unwrap(), "ExistingClass");
        assert_eq!(naming.type_name("foo_bar").unwrap(), "FooBar");
        assert_eq!(naming.type_name("user-profile").unwrap(), "UserProfile");
        assert_eq!(naming.type_name("USER_NAME").unwrap(), "UserName");
        assert_eq!(naming.type_name("3d model").unwrap(), "_3dModel");
    }

    #[test]
    fn test_acronym_preservation() {
        let naming = naming();
        assert_eq!(naming.type_name("tenant_id").unwrap(), "TenantID");
        assert_eq!(naming.type_name("api_url").unwrap(), "APIURL");
        assert_eq!(Naming::default().type_name("tenant_id").unwrap(), "TenantId");
    }

    #[test]
    fn test_reserved_type_names() {
        let naming = naming();
        assert_eq!(naming.type_name("option").unwrap(), "OptionType");
        assert_eq!(naming.type_name("value").unwrap(), "ValueType");
    }

    #[test]
    fn test_invalid_names() {
        let naming = naming();
        assert!(matches!(naming.type_name("$$"), Err(GenerationError::InvalidName { .. })));
        assert!(matches!(naming.field_name(""), Err(GenerationError::InvalidName { .. })));
    }

    #[test]
    fn test_field_name() {
        let naming = naming();
        assert_eq!(naming.field_name("firstName").unwrap(), "first_name");
        assert_eq!(naming.field_name("additionalProperties").unwrap(), "additional_properties");
        assert_eq!(naming.field_name("ZIP code").unwrap(), "zip_code");
        assert_eq!(naming.field_name("line2").unwrap(), "line2");
        assert_eq!(naming.field_name("2ndLine").unwrap(), "_2nd_line");
        assert_eq!(naming.field_name("type").unwrap(), "type");
    }

    #[test]
    fn test_constant_name() {
        let naming = naming();
        assert_eq!(naming.constant_name("in-progress"), "InProgress");
        assert_eq!(naming.constant_name("ACTIVE"), "Active");
        assert_eq!(naming.constant_name("1"), "_1");
        assert_eq!(naming.constant_name(""), "Empty");
    }

    #[test]
    fn test_singular() {
        assert_eq!(singular("addresses"), "address");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("tags"), "tag");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("class"), "class");
        assert_eq!(singular("data"), "data");
    }

    #[test]
    fn test_keywords() {
        assert!(is_keyword("type"));
        assert!(is_keyword("self"));
        assert!(!is_keyword("name"));
    }
}
