//! Type Graph
//!
//! The output of compilation: a `Package` owning every `TypeDescriptor`
//! created during one pass. Descriptors reference each other through
//! `TypeId`s, so recursive and cyclic schemas form a graph without shared
//! ownership.
//!
//! The package is the single place where type names are registered. A name
//! moves from free to registered exactly once; there is no removal.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::Serialize;

use crate::error::{GenerationError, Result};

// =============================================================================
// Handles
// =============================================================================

/// Handle to a descriptor within its package
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a field: its owning type plus position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldId {
    pub owner: TypeId,
    pub index: usize,
}

/// Where a new type is being declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// Top level of the package
    Package,
    /// On behalf of an enclosing type (nested object, property enum)
    Type(TypeId),
}

impl Container {
    pub fn enclosing(self) -> Option<TypeId> {
        match self {
            Container::Package => None,
            Container::Type(id) => Some(id),
        }
    }
}

/// Something that can carry documentation and optionality markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    Type(TypeId),
    Field(FieldId),
}

// =============================================================================
// Types
// =============================================================================

/// Generated behavior attached to a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Serializable,
    Equality,
    Hash,
    StringForm,
}

/// Behaviors every object-derived type carries
pub const DEFAULT_BEHAVIORS: [Behavior; 4] = [
    Behavior::Serializable,
    Behavior::Equality,
    Behavior::Hash,
    Behavior::StringForm,
];

/// Scalar JSON types, including string formats with a dedicated mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    Any,
    DateTime,
    Date,
    Time,
    Uri,
    Email,
    Uuid,
}

/// Reference to the type of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Scalar(ScalarKind),
    List(Box<TypeRef>),
    Set(Box<TypeRef>),
    /// String-keyed map
    Map(Box<TypeRef>),
    Declared(TypeId),
}

impl TypeRef {
    pub fn any() -> Self {
        TypeRef::Scalar(ScalarKind::Any)
    }
}

/// One constant of an enum type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumConstant {
    /// Identifier in generated code
    pub name: String,
    /// Value as it appears in JSON
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Enum { constants: Vec<EnumConstant> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Declared under `properties`
    Property,
    /// Catch-all bag for undeclared properties
    AdditionalProperties,
}

/// A field of a class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Name as it appears in JSON
    pub json_name: String,
    /// Identifier in generated code (unescaped)
    pub name: String,
    pub ty: TypeRef,
    pub optional: bool,
    pub role: FieldRole,
    pub docs: Vec<String>,
}

impl Field {
    pub fn new(json_name: impl Into<String>, name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            json_name: json_name.into(),
            name: name.into(),
            ty,
            optional: false,
            role: FieldRole::Property,
            docs: Vec::new(),
        }
    }
}

/// A generated type prior to rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub package: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: TypeKind,
    /// Type this one was declared for, if nested
    pub enclosing: Option<TypeId>,
    pub fields: Vec<Field>,
    pub docs: Vec<String>,
    pub behaviors: BTreeSet<Behavior>,
}

impl TypeDescriptor {
    /// Fully qualified name (`package::Name`)
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.package, self.name)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }

    pub fn has_behavior(&self, behavior: Behavior) -> bool {
        self.behaviors.contains(&behavior)
    }

    pub fn add_behaviors(&mut self, behaviors: impl IntoIterator<Item = Behavior>) {
        self.behaviors.extend(behaviors);
    }

    /// Append a field, returning its handle
    pub fn add_field(&mut self, field: Field) -> FieldId {
        self.fields.push(field);
        FieldId {
            owner: self.id,
            index: self.fields.len() - 1,
        }
    }

    /// Find a field by its JSON name
    pub fn field_by_json_name(&self, json_name: &str) -> Option<FieldId> {
        self.fields
            .iter()
            .position(|f| f.json_name == json_name)
            .map(|index| FieldId { owner: self.id, index })
    }

    pub fn has_role(&self, role: FieldRole) -> bool {
        self.fields.iter().any(|f| f.role == role)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

// =============================================================================
// Package
// =============================================================================

/// Namespace owning every type produced by one compilation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    name: String,
    types: Vec<TypeDescriptor>,
    #[serde(skip)]
    names: HashMap<String, TypeId>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            names: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a new type under `name`.
    ///
    /// Fails with `TypeAlreadyExists` if the name is already registered; the
    /// package is left untouched in that case.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        kind: TypeKind,
        enclosing: Option<TypeId>,
    ) -> Result<TypeId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(GenerationError::TypeAlreadyExists {
                package: self.name.clone(),
                name,
            });
        }

        let id = TypeId(self.types.len());
        self.names.insert(name.clone(), id);
        self.types.push(TypeDescriptor {
            id,
            package: self.name.clone(),
            name,
            kind,
            enclosing,
            fields: Vec::new(),
            docs: Vec::new(),
            behaviors: BTreeSet::new(),
        });
        Ok(id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id.0)
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.types.get(id.owner.0)?.fields.get(id.index)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.types.get_mut(id.owner.0)?.fields.get_mut(id.index)
    }

    /// Documentation lines of a member, if it exists
    pub fn docs_mut(&mut self, member: Member) -> Option<&mut Vec<String>> {
        match member {
            Member::Type(id) => self.types.get_mut(id.0).map(|t| &mut t.docs),
            Member::Field(id) => self.field_mut(id).map(|f| &mut f.docs),
        }
    }

    /// Types in declaration order
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Index<TypeId> for Package {
    type Output = TypeDescriptor;

    fn index(&self, id: TypeId) -> &TypeDescriptor {
        &self.types[id.0]
    }
}

impl IndexMut<TypeId> for Package {
    fn index_mut(&mut self, id: TypeId) -> &mut TypeDescriptor {
        &mut self.types[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_registers_name() {
        let mut package = Package::new("com.example");
        let id = package.declare("FooBar", TypeKind::Class, None).unwrap();

        assert!(package.contains("FooBar"));
        assert_eq!(package.lookup("FooBar"), Some(id));
        assert_eq!(package[id].qualified_name(), "com.example::FooBar");
        assert!(package[id].fields.is_empty());
        assert!(package[id].behaviors.is_empty());
    }

    #[test]
    fn test_declare_rejects_collision() {
        let mut package = Package::new("pkg");
        package.declare("ExistingClass", TypeKind::Class, None).unwrap();

        let err = package.declare("ExistingClass", TypeKind::Class, None).unwrap_err();
        assert_eq!(
            err,
            GenerationError::TypeAlreadyExists {
                package: "pkg".to_string(),
                name: "ExistingClass".to_string(),
            }
        );
        assert_eq!(package.len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut package = Package::new("pkg");
        package.declare("Foo", TypeKind::Class, None).unwrap();
        assert!(package.declare("foo", TypeKind::Class, None).is_ok());
    }

    #[test]
    fn test_fields_and_docs() {
        let mut package = Package::new("pkg");
        let id = package.declare("Person", TypeKind::Class, None).unwrap();
        let field = package[id].add_field(Field::new("firstName", "first_name", TypeRef::Scalar(ScalarKind::String)));

        assert_eq!(package[id].field_by_json_name("firstName"), Some(field));
        assert_eq!(package[id].field_by_json_name("missing"), None);

        package.docs_mut(Member::Field(field)).unwrap().push("Given name".to_string());
        package.docs_mut(Member::Type(id)).unwrap().push("A person".to_string());
        assert_eq!(package.field(field).unwrap().docs, vec!["Given name"]);
        assert_eq!(package[id].docs, vec!["A person"]);
    }
}
