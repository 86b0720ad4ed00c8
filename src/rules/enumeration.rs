//! Enum Rule

use std::collections::HashSet;

use serde_json::Value;

use super::{apply_keyword, Generation, SchemaRule};
use crate::error::{GenerationError, Result};
use crate::model::{Container, EnumConstant, Member, TypeId, TypeKind, DEFAULT_BEHAVIORS};

/// Declares an enum type for a schema whose `enum` lists string values.
///
/// Each value becomes a constant; the JSON value is kept so generated code
/// can map between the two.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumRule;

impl SchemaRule<Container, TypeId> for EnumRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: Container, cx: &mut Generation<'s>) -> Result<TypeId> {
        let values = node
            .get("enum")
            .and_then(Value::as_array)
            .ok_or_else(|| GenerationError::malformed(name, "enum array", node))?;

        let type_name = cx.naming().type_name(name)?;
        let mut seen = HashSet::new();
        let mut constants = Vec::with_capacity(values.len());
        for value in values {
            let text = value
                .as_str()
                .ok_or_else(|| GenerationError::malformed(name, "string enum value", value))?;
            let constant = cx.naming().constant_name(text);
            if !seen.insert(constant.clone()) {
                return Err(GenerationError::DuplicateMember {
                    owner: format!("{}::{}", cx.package().name(), type_name),
                    name: constant,
                });
            }
            constants.push(EnumConstant {
                name: constant,
                value: text.to_string(),
            });
        }

        let id = cx
            .package_mut()
            .declare(type_name, TypeKind::Enum { constants }, target.enclosing())?;
        cx.package_mut()[id].add_behaviors(DEFAULT_BEHAVIORS);
        cx.remember(node, id);

        tracing::debug!("Declared enum {} with {} constants", cx.package()[id], values.len());

        let rules = cx.rules();
        apply_keyword(rules.description_rule(), "description", name, node, Member::Type(id), cx)?;
        apply_keyword(rules.title_rule(), "title", name, node, Member::Type(id), cx)?;

        Ok(id)
    }
}
