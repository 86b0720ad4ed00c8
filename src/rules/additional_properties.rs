//! Additional Properties Rule

use serde_json::Value;

use super::{Generation, SchemaRule};
use crate::error::{GenerationError, Result};
use crate::model::{Container, Field, FieldRole, TypeId, TypeRef};

/// JSON name of the synthetic catch-all field
pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";

/// Adds a string-keyed map field holding undeclared properties.
///
/// `false` disables the bag. `true` or an empty schema yields untyped
/// values; any other schema is compiled (as `<name>Property`) and used as
/// the value type.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdditionalPropertiesRule;

impl SchemaRule<TypeId, ()> for AdditionalPropertiesRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: TypeId, cx: &mut Generation<'s>) -> Result<()> {
        let value_type = match node {
            Value::Bool(false) => return Ok(()),
            Value::Bool(true) => TypeRef::any(),
            Value::Object(map) if map.is_empty() => TypeRef::any(),
            Value::Object(_) => {
                let value_name = format!("{}Property", name);
                cx.rules()
                    .schema_rule()
                    .apply(&value_name, node, Container::Type(target), cx)?
            }
            _ => return Err(GenerationError::malformed(name, "boolean or object", node)),
        };

        if cx.package()[target].has_role(FieldRole::AdditionalProperties) {
            tracing::debug!("{} already has an additional properties field", cx.package()[target]);
            return Ok(());
        }

        let field_name = cx.naming().field_name(ADDITIONAL_PROPERTIES)?;
        if cx.package()[target].fields.iter().any(|f| f.name == field_name) {
            return Err(GenerationError::DuplicateMember {
                owner: cx.package()[target].qualified_name(),
                name: field_name,
            });
        }

        let mut field = Field::new(ADDITIONAL_PROPERTIES, field_name, TypeRef::Map(Box::new(value_type)));
        field.role = FieldRole::AdditionalProperties;
        cx.package_mut()[target].add_field(field);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::GenerationConfig;
    use crate::model::{Package, ScalarKind, TypeKind};
    use crate::naming::Naming;
    use crate::rules::RuleFactory;

    fn run(node: &Value, times: usize) -> Result<(Package, TypeId)> {
        let rules = RuleFactory::new();
        let config = GenerationConfig::default();
        let naming = Naming::default();
        let mut package = Package::new("test");
        let id = package.declare("Bag", TypeKind::Class, None)?;
        {
            let mut cx = Generation::new(&rules, &config, &naming, node, &mut package);
            for _ in 0..times {
                rules.additional_properties_rule().apply("bag", node, id, &mut cx)?;
            }
        }
        Ok((package, id))
    }

    #[test]
    fn test_false_adds_nothing() {
        let (package, id) = run(&json!(false), 1).unwrap();
        assert!(package[id].fields.is_empty());
    }

    #[test]
    fn test_empty_schema_adds_untyped_map() {
        let (package, id) = run(&json!({}), 1).unwrap();

        let field = &package[id].fields[0];
        assert_eq!(field.json_name, "additionalProperties");
        assert_eq!(field.name, "additional_properties");
        assert_eq!(field.role, FieldRole::AdditionalProperties);
        assert_eq!(field.ty, TypeRef::Map(Box::new(TypeRef::Scalar(ScalarKind::Any))));
    }

    #[test]
    fn test_typed_values() {
        let (package, id) = run(&json!({"type": "integer"}), 1).unwrap();
        assert_eq!(
            package[id].fields[0].ty,
            TypeRef::Map(Box::new(TypeRef::Scalar(ScalarKind::Integer)))
        );

        let (package, id) = run(&json!({"type": "object", "properties": {"x": {}}}), 1).unwrap();
        let value_type = package.lookup("BagProperty").unwrap();
        assert_eq!(package[id].fields[0].ty, TypeRef::Map(Box::new(TypeRef::Declared(value_type))));
    }

    #[test]
    fn test_applied_twice_adds_one_field() {
        let (package, id) = run(&json!(true), 2).unwrap();
        assert_eq!(package[id].fields.len(), 1);
    }

    #[test]
    fn test_clash_with_declared_property() {
        let rules = RuleFactory::new();
        let config = GenerationConfig::default();
        let naming = Naming::default();
        let node = json!(true);
        let mut package = Package::new("test");
        let id = package.declare("Bag", TypeKind::Class, None).unwrap();
        package[id].add_field(Field::new("additional_properties", "additional_properties", TypeRef::any()));

        let mut cx = Generation::new(&rules, &config, &naming, &node, &mut package);
        let err = rules.additional_properties_rule().apply("bag", &node, id, &mut cx).unwrap_err();

        assert!(matches!(err, GenerationError::DuplicateMember { .. }));
    }

    #[test]
    fn test_rejects_scalars() {
        assert!(matches!(run(&json!("yes"), 1), Err(GenerationError::Malformed { .. })));
    }
}
