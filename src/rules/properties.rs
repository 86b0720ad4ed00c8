//! Properties and Property Rules

use serde_json::Value;

use super::{apply_keyword, Generation, SchemaRule};
use crate::error::{GenerationError, Result};
use crate::model::{Container, Field, FieldId, Member, TypeId};
use crate::schema;

/// Adds one field per entry of a `properties` map, in declared order.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertiesRule;

impl SchemaRule<TypeId, ()> for PropertiesRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: TypeId, cx: &mut Generation<'s>) -> Result<()> {
        let properties = node
            .as_object()
            .ok_or_else(|| GenerationError::malformed(name, "object", node))?;

        let rule = cx.rules().property_rule();
        for (property_name, property_schema) in properties {
            rule.apply(property_name, property_schema, target, cx)?;
        }
        Ok(())
    }
}

/// Adds a single field for a property schema.
///
/// The field's type comes from the Schema rule, so a nested object becomes a
/// nested class, an enum becomes an enum type and a `$ref` resolves to the
/// referenced type. The property's own `description`, `title`, `optional`
/// and draft-03 `required` keywords then annotate the field.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyRule;

impl SchemaRule<TypeId, FieldId> for PropertyRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: TypeId, cx: &mut Generation<'s>) -> Result<FieldId> {
        let field_name = cx.naming().field_name(name)?;
        if cx.package()[target].fields.iter().any(|f| f.name == field_name) {
            return Err(GenerationError::DuplicateMember {
                owner: cx.package()[target].qualified_name(),
                name: field_name,
            });
        }

        let rules = cx.rules();
        let ty = rules.schema_rule().apply(name, node, Container::Type(target), cx)?;

        let mut field = Field::new(name, field_name, ty);
        field.optional = cx.config().properties_optional_by_default || schema::is_nullable(node);
        let id = cx.package_mut()[target].add_field(field);

        if node.is_object() {
            let member = Member::Field(id);
            apply_keyword(rules.description_rule(), "description", name, node, member, cx)?;
            apply_keyword(rules.title_rule(), "title", name, node, member, cx)?;
            apply_keyword(rules.optional_rule(), "optional", name, node, member, cx)?;
            apply_keyword(rules.required_rule(), "required", name, node, member, cx)?;
        }

        tracing::debug!("Added property {} to {}", name, cx.package()[target]);
        Ok(id)
    }
}
