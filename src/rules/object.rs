//! Object Rule
//!
//! Declares a class for an `object` schema, attaches the default behaviors
//! and hands each keyword the object carries to its own rule.

use serde_json::Value;

use super::{apply_keyword, Generation, SchemaRule};
use crate::error::{GenerationError, Result};
use crate::model::{Container, Member, TypeId, TypeKind, DEFAULT_BEHAVIORS};

/// Compiles an `object` schema into a new class in the package.
///
/// The keyword rules run in a fixed order: `description`, `optional`,
/// `properties`, `additionalProperties`, then `title` and a draft-04
/// `required` list, which both need the fields to exist.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectRule;

impl SchemaRule<Container, TypeId> for ObjectRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: Container, cx: &mut Generation<'s>) -> Result<TypeId> {
        if !node.is_object() {
            return Err(GenerationError::malformed(name, "object", node));
        }

        let type_name = cx.naming().type_name(name)?;
        let id = cx
            .package_mut()
            .declare(type_name, TypeKind::Class, target.enclosing())?;
        cx.package_mut()[id].add_behaviors(DEFAULT_BEHAVIORS);
        cx.remember(node, id);

        tracing::debug!("Declared class {} for schema {}", cx.package()[id], name);

        let rules = cx.rules();
        apply_keyword(rules.description_rule(), "description", name, node, Member::Type(id), cx)?;
        apply_keyword(rules.optional_rule(), "optional", name, node, Member::Type(id), cx)?;
        apply_keyword(rules.properties_rule(), "properties", name, node, id, cx)?;
        apply_keyword(rules.additional_properties_rule(), "additionalProperties", name, node, id, cx)?;
        apply_keyword(rules.title_rule(), "title", name, node, Member::Type(id), cx)?;
        apply_keyword(rules.required_rule(), "required", name, node, Member::Type(id), cx)?;

        Ok(id)
    }
}
