//! Compilation Rules
//!
//! Every schema construct is handled by its own rule. Rules share one
//! interface, `SchemaRule`, and find each other through the `RuleFactory`
//! rather than holding direct references, so any rule can be swapped out
//! (in tests or by callers extending the compiler) without touching the
//! rules that invoke it.
//!
//! Architecture:
//! - RuleFactory: one getter per rule kind, no state beyond the rules
//! - Generation: per-pass context carrying the package, the root document
//!   and the node -> type memo
//! - SchemaMapper: driver that runs the Schema rule on a root node
//!
//! A pass is synchronous: a rule returns only after all of its sub-rules
//! have returned. The first error aborts the pass.

mod additional_properties;
mod annotations;
mod enumeration;
mod object;
mod properties;
mod types;

pub use additional_properties::AdditionalPropertiesRule;
pub use annotations::{DescriptionRule, OptionalRule, RequiredRule, TitleRule};
pub use enumeration::EnumRule;
pub use object::ObjectRule;
pub use properties::{PropertiesRule, PropertyRule};
pub use types::{ArrayRule, FormatRule, SchemaRefRule, TypeRule};

use std::collections::HashMap;

use serde_json::Value;

use crate::config::GenerationConfig;
use crate::error::{GenerationError, Result};
use crate::model::{Container, FieldId, Member, Package, ScalarKind, TypeId, TypeRef};
use crate::naming::Naming;
use crate::schema::NodeId;

// =============================================================================
// Rule Interface
// =============================================================================

/// A transformation for one schema construct.
///
/// `name` is the symbolic name in effect (property name, definition name or a
/// synthesized one), `node` the schema node for the construct and `target`
/// whatever the construct contributes to: the container a new type is
/// declared in, the type a field is added to, or the member being annotated.
pub trait SchemaRule<T, R> {
    fn apply<'s>(&self, name: &str, node: &'s Value, target: T, cx: &mut Generation<'s>) -> Result<R>;
}

// =============================================================================
// Generation Context
// =============================================================================

/// State of one compilation pass
pub struct Generation<'s> {
    rules: &'s RuleFactory,
    config: &'s GenerationConfig,
    naming: &'s Naming,
    root: &'s Value,
    package: &'s mut Package,
    /// Nodes already compiled into a declared type
    compiled: HashMap<NodeId, TypeId>,
    /// `$ref` targets currently being resolved, with the package size when
    /// each was entered
    resolving: HashMap<NodeId, usize>,
}

impl<'s> Generation<'s> {
    pub fn new(
        rules: &'s RuleFactory,
        config: &'s GenerationConfig,
        naming: &'s Naming,
        root: &'s Value,
        package: &'s mut Package,
    ) -> Self {
        Self {
            rules,
            config,
            naming,
            root,
            package,
            compiled: HashMap::new(),
            resolving: HashMap::new(),
        }
    }

    /// The registry, borrowed for the whole pass rather than from `self`
    pub fn rules(&self) -> &'s RuleFactory {
        self.rules
    }

    pub fn config(&self) -> &'s GenerationConfig {
        self.config
    }

    pub fn naming(&self) -> &'s Naming {
        self.naming
    }

    /// Root document `$ref`s resolve against
    pub fn root(&self) -> &'s Value {
        self.root
    }

    pub fn package(&self) -> &Package {
        &*self.package
    }

    pub fn package_mut(&mut self) -> &mut Package {
        &mut *self.package
    }

    /// Record that `node` compiled into `id`
    pub fn remember(&mut self, node: &Value, id: TypeId) {
        self.compiled.insert(NodeId::of(node), id);
    }

    /// Type previously compiled from `node`, if any
    pub fn compiled(&self, node: &Value) -> Option<TypeId> {
        self.compiled.get(&NodeId::of(node)).copied()
    }

    /// Enter `node` as a `$ref` target, returning the entry it shadows.
    ///
    /// `None` when the node is already being resolved and no type has been
    /// declared since: a cycle that declares nothing never ends.
    pub(crate) fn begin_resolving(&mut self, node: &Value) -> Option<Option<usize>> {
        let size = self.package.len();
        match self.resolving.insert(NodeId::of(node), size) {
            Some(entered) if entered == size => None,
            previous => Some(previous),
        }
    }

    pub(crate) fn end_resolving(&mut self, node: &Value, previous: Option<usize>) {
        let id = NodeId::of(node);
        match previous {
            Some(size) => {
                self.resolving.insert(id, size);
            }
            None => {
                self.resolving.remove(&id);
            }
        }
    }
}

// =============================================================================
// Rule Registry
// =============================================================================

type Boxed<T, R> = Box<dyn SchemaRule<T, R>>;

/// Registry of rules, one per schema construct
pub struct RuleFactory {
    schema: Boxed<Container, TypeRef>,
    type_rule: Boxed<Container, TypeRef>,
    object: Boxed<Container, TypeId>,
    array: Boxed<Container, TypeRef>,
    enumeration: Boxed<Container, TypeId>,
    format: Boxed<ScalarKind, ScalarKind>,
    properties: Boxed<TypeId, ()>,
    property: Boxed<TypeId, FieldId>,
    additional_properties: Boxed<TypeId, ()>,
    optional: Boxed<Member, ()>,
    required: Boxed<Member, ()>,
    description: Boxed<Member, ()>,
    title: Boxed<Member, ()>,
}

impl Default for RuleFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleFactory {
    /// Registry populated with the standard rules
    pub fn new() -> Self {
        Self {
            schema: Box::new(SchemaRefRule),
            type_rule: Box::new(TypeRule),
            object: Box::new(ObjectRule),
            array: Box::new(ArrayRule),
            enumeration: Box::new(EnumRule),
            format: Box::new(FormatRule),
            properties: Box::new(PropertiesRule),
            property: Box::new(PropertyRule),
            additional_properties: Box::new(AdditionalPropertiesRule),
            optional: Box::new(OptionalRule),
            required: Box::new(RequiredRule),
            description: Box::new(DescriptionRule),
            title: Box::new(TitleRule),
        }
    }

    /// Entry point for any schema node: resolves `$ref` and memoized nodes
    pub fn schema_rule(&self) -> &dyn SchemaRule<Container, TypeRef> {
        self.schema.as_ref()
    }

    /// Dispatch on `enum` / `type`
    pub fn type_rule(&self) -> &dyn SchemaRule<Container, TypeRef> {
        self.type_rule.as_ref()
    }

    pub fn object_rule(&self) -> &dyn SchemaRule<Container, TypeId> {
        self.object.as_ref()
    }

    pub fn array_rule(&self) -> &dyn SchemaRule<Container, TypeRef> {
        self.array.as_ref()
    }

    pub fn enum_rule(&self) -> &dyn SchemaRule<Container, TypeId> {
        self.enumeration.as_ref()
    }

    pub fn format_rule(&self) -> &dyn SchemaRule<ScalarKind, ScalarKind> {
        self.format.as_ref()
    }

    pub fn properties_rule(&self) -> &dyn SchemaRule<TypeId, ()> {
        self.properties.as_ref()
    }

    pub fn property_rule(&self) -> &dyn SchemaRule<TypeId, FieldId> {
        self.property.as_ref()
    }

    pub fn additional_properties_rule(&self) -> &dyn SchemaRule<TypeId, ()> {
        self.additional_properties.as_ref()
    }

    pub fn optional_rule(&self) -> &dyn SchemaRule<Member, ()> {
        self.optional.as_ref()
    }

    pub fn required_rule(&self) -> &dyn SchemaRule<Member, ()> {
        self.required.as_ref()
    }

    pub fn description_rule(&self) -> &dyn SchemaRule<Member, ()> {
        self.description.as_ref()
    }

    pub fn title_rule(&self) -> &dyn SchemaRule<Member, ()> {
        self.title.as_ref()
    }

    pub fn with_schema_rule(mut self, rule: impl SchemaRule<Container, TypeRef> + 'static) -> Self {
        self.schema = Box::new(rule);
        self
    }

    pub fn with_type_rule(mut self, rule: impl SchemaRule<Container, TypeRef> + 'static) -> Self {
        self.type_rule = Box::new(rule);
        self
    }

    pub fn with_object_rule(mut self, rule: impl SchemaRule<Container, TypeId> + 'static) -> Self {
        self.object = Box::new(rule);
        self
    }

    pub fn with_array_rule(mut self, rule: impl SchemaRule<Container, TypeRef> + 'static) -> Self {
        self.array = Box::new(rule);
        self
    }

    pub fn with_enum_rule(mut self, rule: impl SchemaRule<Container, TypeId> + 'static) -> Self {
        self.enumeration = Box::new(rule);
        self
    }

    pub fn with_format_rule(mut self, rule: impl SchemaRule<ScalarKind, ScalarKind> + 'static) -> Self {
        self.format = Box::new(rule);
        self
    }

    pub fn with_properties_rule(mut self, rule: impl SchemaRule<TypeId, ()> + 'static) -> Self {
        self.properties = Box::new(rule);
        self
    }

    pub fn with_property_rule(mut self, rule: impl SchemaRule<TypeId, FieldId> + 'static) -> Self {
        self.property = Box::new(rule);
        self
    }

    pub fn with_additional_properties_rule(mut self, rule: impl SchemaRule<TypeId, ()> + 'static) -> Self {
        self.additional_properties = Box::new(rule);
        self
    }

    pub fn with_optional_rule(mut self, rule: impl SchemaRule<Member, ()> + 'static) -> Self {
        self.optional = Box::new(rule);
        self
    }

    pub fn with_required_rule(mut self, rule: impl SchemaRule<Member, ()> + 'static) -> Self {
        self.required = Box::new(rule);
        self
    }

    pub fn with_description_rule(mut self, rule: impl SchemaRule<Member, ()> + 'static) -> Self {
        self.description = Box::new(rule);
        self
    }

    pub fn with_title_rule(mut self, rule: impl SchemaRule<Member, ()> + 'static) -> Self {
        self.title = Box::new(rule);
        self
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Compiles root schema nodes into a package
pub struct SchemaMapper {
    rules: RuleFactory,
    config: GenerationConfig,
    naming: Naming,
}

impl SchemaMapper {
    pub fn new(config: GenerationConfig) -> Self {
        Self::with_rules(RuleFactory::new(), config)
    }

    pub fn with_rules(rules: RuleFactory, config: GenerationConfig) -> Self {
        let naming = Naming::new(config.acronyms.iter().cloned());
        Self { rules, config, naming }
    }

    pub fn rules(&self) -> &RuleFactory {
        &self.rules
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Compile `schema` under the symbolic `name` into `package`.
    ///
    /// Returns the root type. A root that compiles to something other than a
    /// declared type (a bare string schema, say) is rejected as malformed.
    /// On error the package should be discarded.
    pub fn generate(&self, package: &mut Package, name: &str, schema: &Value) -> Result<TypeId> {
        tracing::info!("Compiling schema {} into package {}", name, package.name());

        let mut cx = Generation::new(&self.rules, &self.config, &self.naming, schema, package);
        let root = self.rules.schema_rule().apply(name, schema, Container::Package, &mut cx)?;

        match root {
            TypeRef::Declared(id) => {
                tracing::debug!("Schema {} compiled, package now holds {} types", name, cx.package().len());
                Ok(id)
            }
            _ => Err(GenerationError::Malformed {
                name: name.to_string(),
                expected: "object or enum schema",
                found: crate::schema::kind_name(schema),
            }),
        }
    }
}

/// Apply `rule` to the child `keyword` of `node`, if present
pub(crate) fn apply_keyword<'s, T, R>(
    rule: &dyn SchemaRule<T, R>,
    keyword: &str,
    name: &str,
    node: &'s Value,
    target: T,
    cx: &mut Generation<'s>,
) -> Result<Option<R>> {
    match node.get(keyword) {
        Some(child) => rule.apply(name, child, target, cx).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stand-in rules that record their invocations

    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// One recorded `apply` call
    #[derive(Debug, Clone, PartialEq)]
    pub struct Call<T> {
        pub name: String,
        pub node: Value,
        pub target: T,
    }

    /// Records calls and returns a fixed result
    pub struct Recorder<T, R> {
        calls: Rc<RefCell<Vec<Call<T>>>>,
        result: R,
    }

    impl<T, R: Clone> Recorder<T, R> {
        pub fn new(result: R) -> (Self, Rc<RefCell<Vec<Call<T>>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            (Self { calls: Rc::clone(&calls), result }, calls)
        }
    }

    impl<T, R: Clone> SchemaRule<T, R> for Recorder<T, R> {
        fn apply<'s>(&self, name: &str, node: &'s Value, target: T, _cx: &mut Generation<'s>) -> Result<R> {
            self.calls.borrow_mut().push(Call {
                name: name.to_string(),
                node: node.clone(),
                target,
            });
            Ok(self.result.clone())
        }
    }
}
