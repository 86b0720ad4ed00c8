//! Annotation Rules
//!
//! Keywords that only decorate an existing member: `description`, `title`,
//! `optional` and `required`. None of them declares types.

use serde_json::Value;

use super::{Generation, SchemaRule};
use crate::error::Result;
use crate::model::Member;
use crate::schema;

/// Doc line marking an optional type
pub const OPTIONAL_MARKER: &str = "(Optional)";

/// Appends the description text to the member's documentation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptionRule;

impl SchemaRule<Member, ()> for DescriptionRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: Member, cx: &mut Generation<'s>) -> Result<()> {
        match node.as_str() {
            Some(text) if !text.trim().is_empty() => add_doc(cx, target, text.trim(), false),
            _ => tracing::debug!("Ignoring non-text description on {}", name),
        }
        Ok(())
    }
}

/// Puts the title first in the member's documentation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TitleRule;

impl SchemaRule<Member, ()> for TitleRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: Member, cx: &mut Generation<'s>) -> Result<()> {
        match node.as_str() {
            Some(text) if !text.trim().is_empty() => add_doc(cx, target, text.trim(), true),
            _ => tracing::debug!("Ignoring non-text title on {}", name),
        }
        Ok(())
    }
}

/// `optional` marker.
///
/// On a field it sets optionality from the node's truthiness. On a type it
/// adds an `(Optional)` doc line when truthy.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionalRule;

impl SchemaRule<Member, ()> for OptionalRule {
    fn apply<'s>(&self, _name: &str, node: &'s Value, target: Member, cx: &mut Generation<'s>) -> Result<()> {
        let optional = schema::is_truthy(node);
        match target {
            Member::Field(id) => {
                if let Some(field) = cx.package_mut().field_mut(id) {
                    field.optional = optional;
                }
            }
            Member::Type(_) if optional => add_doc(cx, target, OPTIONAL_MARKER, false),
            Member::Type(_) => {}
        }
        Ok(())
    }
}

/// `required` marker.
///
/// Draft-03 form: a boolean on a property toggles the field. Draft-04 form:
/// an array of property names on an object marks those fields required.
/// Names that match no field are skipped. A property whose schema is itself
/// an object carries its own draft-04 list, which says nothing about the
/// field holding it.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequiredRule;

impl SchemaRule<Member, ()> for RequiredRule {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: Member, cx: &mut Generation<'s>) -> Result<()> {
        match (target, node) {
            (Member::Field(id), Value::Bool(_) | Value::String(_) | Value::Number(_)) => {
                if let Some(field) = cx.package_mut().field_mut(id) {
                    field.optional = !schema::is_truthy(node);
                }
            }
            (Member::Field(_), _) => tracing::debug!("Ignoring non-scalar required marker on property {}", name),
            (Member::Type(owner), Value::Array(names)) => {
                for required in names.iter().filter_map(Value::as_str) {
                    match cx.package()[owner].field_by_json_name(required) {
                        Some(id) => {
                            if let Some(field) = cx.package_mut().field_mut(id) {
                                field.optional = false;
                            }
                        }
                        None => tracing::warn!("Required property {} is not declared on {}", required, name),
                    }
                }
            }
            (Member::Type(_), _) => tracing::debug!("Ignoring type-level required marker on {}", name),
        }
        Ok(())
    }
}

fn add_doc(cx: &mut Generation<'_>, target: Member, text: &str, first: bool) {
    if let Some(docs) = cx.package_mut().docs_mut(target) {
        if first {
            docs.insert(0, text.to_string());
        } else {
            docs.push(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::GenerationConfig;
    use crate::model::{Field, Package, ScalarKind, TypeKind, TypeRef};
    use crate::naming::Naming;
    use crate::rules::RuleFactory;

    struct Fixture {
        package: Package,
        rules: RuleFactory,
        config: GenerationConfig,
        naming: Naming,
    }

    impl Fixture {
        fn new() -> Self {
            let mut package = Package::new("test");
            let id = package.declare("Person", TypeKind::Class, None).unwrap();
            for name in ["name", "age"] {
                let mut field = Field::new(name, name, TypeRef::Scalar(ScalarKind::String));
                field.optional = true;
                package[id].add_field(field);
            }
            Self {
                package,
                rules: RuleFactory::new(),
                config: GenerationConfig::default(),
                naming: Naming::default(),
            }
        }

        fn apply(
            &mut self,
            rule: impl Fn(&RuleFactory) -> &dyn SchemaRule<Member, ()>,
            node: &Value,
            target: Member,
        ) {
            let mut cx = Generation::new(&self.rules, &self.config, &self.naming, node, &mut self.package);
            rule(&self.rules).apply("person", node, target, &mut cx).unwrap();
        }

        fn person(&self) -> Member {
            Member::Type(self.package.lookup("Person").unwrap())
        }

        fn field(&self, json_name: &str) -> Member {
            let owner = self.package.lookup("Person").unwrap();
            Member::Field(self.package[owner].field_by_json_name(json_name).unwrap())
        }
    }

    #[test]
    fn test_title_precedes_description() {
        let mut fx = Fixture::new();
        let person = fx.person();
        fx.apply(|r| r.description_rule(), &json!("A human being"), person);
        fx.apply(|r| r.title_rule(), &json!("Person"), person);
        fx.apply(|r| r.description_rule(), &json!({}), person);

        let owner = fx.package.lookup("Person").unwrap();
        assert_eq!(fx.package[owner].docs, vec!["Person", "A human being"]);
    }

    #[test]
    fn test_optional_marks_type_and_field() {
        let mut fx = Fixture::new();
        let person = fx.person();
        let name = fx.field("name");
        fx.apply(|r| r.optional_rule(), &json!(true), person);
        fx.apply(|r| r.optional_rule(), &json!(false), name);

        let owner = fx.package.lookup("Person").unwrap();
        assert_eq!(fx.package[owner].docs, vec![OPTIONAL_MARKER]);
        assert!(!fx.package[owner].fields[0].optional);
    }

    #[test]
    fn test_optional_object_node_is_falsy() {
        let mut fx = Fixture::new();
        let person = fx.person();
        fx.apply(|r| r.optional_rule(), &json!({}), person);

        let owner = fx.package.lookup("Person").unwrap();
        assert!(fx.package[owner].docs.is_empty());
    }

    #[test]
    fn test_required_forms() {
        let mut fx = Fixture::new();
        let person = fx.person();
        let age = fx.field("age");
        fx.apply(|r| r.required_rule(), &json!(["name", "missing"]), person);
        fx.apply(|r| r.required_rule(), &json!(true), age);

        let owner = fx.package.lookup("Person").unwrap();
        assert!(!fx.package[owner].fields[0].optional);
        assert!(!fx.package[owner].fields[1].optional);
    }
}
