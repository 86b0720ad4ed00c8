//! Rust Code Emitter
//!
//! Renders one `TypeDescriptor` at a time using a `RenderProfile`.
//!
//! Key constraints:
//! - Only the type model is read here, never schema JSON
//! - Type names are the descriptor names (already unique in the package)
//! - Behaviors map onto a fixed template: `Serializable` -> serde derives,
//!   `Equality` -> `PartialEq` + `Eq`, `Hash` -> a `Hash` impl over each
//!   field's JSON text, `StringForm` -> `Display` as compact JSON
//! - Accessor names that collide (a property `new`, or `set_x` next to `x`)
//!   are rejected, never renamed

use std::collections::HashSet;

use crate::error::{GenerationError, Result};
use crate::model::{Behavior, EnumConstant, Field, FieldId, FieldRole, Package, TypeDescriptor, TypeKind, TypeRef};

use super::RenderProfile;

/// Marker line preceding every emitted type
pub const PROVENANCE_MARKER: &str = "// @generated by jsonschema-typegen";

/// Emit Rust code for a descriptor.
///
/// `boxed` holds the fields that must be boxed to break direct recursion.
pub fn emit_type(
    package: &Package,
    ty: &TypeDescriptor,
    boxed: &HashSet<FieldId>,
    profile: &RenderProfile,
) -> Result<String> {
    let mut output = String::new();
    output.push_str(PROVENANCE_MARKER);
    output.push('\n');
    push_docs(&mut output, "", &ty.docs);

    match &ty.kind {
        TypeKind::Enum { constants } => emit_enum(&mut output, ty, constants, profile),
        TypeKind::Class => {
            let emitter = StructEmitter { package, ty, boxed, profile };
            emitter.emit(&mut output)?;
        }
    }

    Ok(output)
}

// =============================================================================
// Enum Emission
// =============================================================================

fn emit_enum(output: &mut String, ty: &TypeDescriptor, constants: &[EnumConstant], profile: &RenderProfile) {
    let mut derives = vec!["Debug", "Clone", "Copy"];
    if ty.has_behavior(Behavior::Equality) {
        derives.extend(["PartialEq", "Eq"]);
    }
    if ty.has_behavior(Behavior::Hash) {
        derives.push("Hash");
    }
    let serializable = ty.has_behavior(Behavior::Serializable);
    if serializable {
        derives.extend(["serde::Serialize", "serde::Deserialize"]);
    }
    push_derives(output, &derives, profile);

    output.push_str(&format!("pub enum {} {{\n", ty.name));
    for constant in constants {
        if serializable && constant.name != constant.value {
            output.push_str(&format!("    #[serde(rename = {:?})]\n", constant.value));
        }
        output.push_str(&format!("    {},\n", constant.name));
    }
    output.push_str("}\n\n");

    output.push_str(&format!("impl {} {{\n", ty.name));
    output.push_str("    /// Value as it appears in JSON\n");
    output.push_str("    pub fn value(&self) -> &'static str {\n");
    output.push_str("        match self {\n");
    for constant in constants {
        output.push_str(&format!("            Self::{} => {:?},\n", constant.name, constant.value));
    }
    output.push_str("        }\n");
    output.push_str("    }\n");
    output.push_str("}\n");

    if ty.has_behavior(Behavior::StringForm) {
        output.push_str(&format!("\nimpl std::fmt::Display for {} {{\n", ty.name));
        output.push_str("    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {\n");
        output.push_str("        f.write_str(self.value())\n");
        output.push_str("    }\n");
        output.push_str("}\n");
    }
}

// =============================================================================
// Struct Emission
// =============================================================================

struct StructEmitter<'a> {
    package: &'a Package,
    ty: &'a TypeDescriptor,
    boxed: &'a HashSet<FieldId>,
    profile: &'a RenderProfile,
}

impl StructEmitter<'_> {
    fn emit(&self, output: &mut String) -> Result<()> {
        self.emit_definition(output);
        if self.profile.accessors {
            self.check_method_names()?;
            self.emit_accessors(output);
        }
        if self.ty.has_behavior(Behavior::Equality) {
            output.push_str(&format!("\nimpl Eq for {} {{}}\n", self.ty.name));
        }
        if self.ty.has_behavior(Behavior::Hash) {
            self.emit_hash(output);
        }
        if self.ty.has_behavior(Behavior::StringForm) {
            self.emit_display(output);
        }
        Ok(())
    }

    /// Every inherent method `emit_accessors` would write must be unique.
    fn check_method_names(&self) -> Result<()> {
        let mut names = HashSet::from(["new".to_string()]);
        for field in &self.ty.fields {
            let getter = self.profile.escape_keyword(&field.name);
            let getter = getter.trim_start_matches("r#").to_string();
            let setter = match field.role {
                FieldRole::Property => format!("set_{}", field.name),
                FieldRole::AdditionalProperties => "set_additional_property".to_string(),
            };
            for method in [getter, setter] {
                if !names.insert(method.clone()) {
                    return Err(GenerationError::DuplicateMember {
                        owner: self.ty.qualified_name(),
                        name: method,
                    });
                }
            }
        }
        Ok(())
    }

    fn emit_definition(&self, output: &mut String) {
        let mut derives = vec!["Debug", "Clone"];
        if self.ty.has_behavior(Behavior::Equality) {
            derives.push("PartialEq");
        }
        let serializable = self.ty.has_behavior(Behavior::Serializable);
        if serializable {
            derives.extend(["serde::Serialize", "serde::Deserialize"]);
        }
        push_derives(output, &derives, self.profile);

        let visibility = if self.profile.accessors { "" } else { "pub " };
        output.push_str(&format!("pub struct {} {{\n", self.ty.name));
        for (index, field) in self.ty.fields.iter().enumerate() {
            push_docs(output, "    ", &field.docs);
            if serializable {
                if let Some(attributes) = serde_attributes(field) {
                    output.push_str(&format!("    #[serde({})]\n", attributes));
                }
            }
            output.push_str(&format!(
                "    {}{}: {},\n",
                visibility,
                self.profile.escape_keyword(&field.name),
                self.field_type(index, field)
            ));
        }
        output.push_str("}\n");
    }

    fn emit_accessors(&self, output: &mut String) {
        let fields = &self.ty.fields;
        output.push_str(&format!("\nimpl {} {{\n", self.ty.name));

        // Constructor over the required fields
        let required: Vec<_> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.optional && f.role == FieldRole::Property)
            .collect();
        let params: Vec<_> = required
            .iter()
            .map(|(_, f)| format!("{}: {}", self.profile.escape_keyword(&f.name), self.render(&f.ty)))
            .collect();
        output.push_str(&format!("    pub fn new({}) -> Self {{\n", params.join(", ")));
        output.push_str("        Self {\n");
        for (index, field) in fields.iter().enumerate() {
            let name = self.profile.escape_keyword(&field.name);
            if field.optional && field.role == FieldRole::Property {
                output.push_str(&format!("            {}: None,\n", name));
            } else if field.role == FieldRole::AdditionalProperties {
                output.push_str(&format!("            {}: Default::default(),\n", name));
            } else if self.is_boxed(index) {
                output.push_str(&format!("            {}: Box::new({}),\n", name, name));
            } else {
                output.push_str(&format!("            {},\n", name));
            }
        }
        output.push_str("        }\n");
        output.push_str("    }\n");

        for (index, field) in fields.iter().enumerate() {
            output.push('\n');
            match field.role {
                FieldRole::Property => self.emit_property_accessors(output, index, field),
                FieldRole::AdditionalProperties => self.emit_additional_accessors(output, field),
            }
        }

        output.push_str("}\n");
    }

    fn emit_property_accessors(&self, output: &mut String, index: usize, field: &Field) {
        let name = self.profile.escape_keyword(&field.name);
        let inner = self.render(&field.ty);
        let boxed = self.is_boxed(index);

        push_docs(output, "    ", &field.docs);
        if field.optional {
            let read = if boxed { "as_deref" } else { "as_ref" };
            output.push_str(&format!("    pub fn {}(&self) -> Option<&{}> {{\n", name, inner));
            output.push_str(&format!("        self.{}.{}()\n", name, read));
        } else {
            output.push_str(&format!("    pub fn {}(&self) -> &{} {{\n", name, inner));
            output.push_str(&format!("        &self.{}\n", name));
        }
        output.push_str("    }\n\n");

        let (param, store) = match (field.optional, boxed) {
            (true, true) => (format!("Option<{}>", inner), "value.map(Box::new)"),
            (true, false) => (format!("Option<{}>", inner), "value"),
            (false, true) => (inner, "Box::new(value)"),
            (false, false) => (inner, "value"),
        };
        output.push_str(&format!("    pub fn set_{}(&mut self, value: {}) {{\n", field.name, param));
        output.push_str(&format!("        self.{} = {};\n", name, store));
        output.push_str("    }\n");
    }

    fn emit_additional_accessors(&self, output: &mut String, field: &Field) {
        let name = self.profile.escape_keyword(&field.name);
        let map_type = self.render(&field.ty);
        let value_type = match &field.ty {
            TypeRef::Map(value) => self.render(value),
            other => self.render(other),
        };

        output.push_str("    /// Properties not declared by the schema\n");
        output.push_str(&format!("    pub fn {}(&self) -> &{} {{\n", name, map_type));
        output.push_str(&format!("        &self.{}\n", name));
        output.push_str("    }\n\n");
        output.push_str(&format!(
            "    pub fn set_additional_property(&mut self, name: impl Into<String>, value: {}) {{\n",
            value_type
        ));
        output.push_str(&format!("        self.{}.insert(name.into(), value);\n", name));
        output.push_str("    }\n");
    }

    fn emit_hash(&self, output: &mut String) {
        output.push_str(&format!("\nimpl std::hash::Hash for {} {{\n", self.ty.name));
        output.push_str("    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {\n");
        if self.ty.fields.is_empty() {
            output.push_str(&format!("        std::hash::Hash::hash({:?}, state);\n", self.ty.name));
        }
        for field in &self.ty.fields {
            output.push_str(&format!(
                "        std::hash::Hash::hash(&serde_json::to_string(&self.{}).unwrap_or_default(), state);\n",
                self.profile.escape_keyword(&field.name)
            ));
        }
        output.push_str("    }\n");
        output.push_str("}\n");
    }

    fn emit_display(&self, output: &mut String) {
        output.push_str(&format!("\nimpl std::fmt::Display for {} {{\n", self.ty.name));
        output.push_str("    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {\n");
        if self.ty.has_behavior(Behavior::Serializable) {
            output.push_str("        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;\n");
            output.push_str("        f.write_str(&json)\n");
        } else {
            output.push_str("        write!(f, \"{:?}\", self)\n");
        }
        output.push_str("    }\n");
        output.push_str("}\n");
    }

    /// Declared field type, with boxing and optionality applied
    fn field_type(&self, index: usize, field: &Field) -> String {
        let mut rendered = self.render(&field.ty);
        if self.is_boxed(index) {
            rendered = self.profile.wrap_box(&rendered);
        }
        if field.optional && field.role == FieldRole::Property {
            rendered = self.profile.wrap_optional(&rendered);
        }
        rendered
    }

    fn is_boxed(&self, index: usize) -> bool {
        self.boxed.contains(&FieldId {
            owner: self.ty.id,
            index,
        })
    }

    fn render(&self, ty: &TypeRef) -> String {
        render_type(self.package, ty, self.profile)
    }
}

// =============================================================================
// Helper Utilities
// =============================================================================

/// Rust spelling of a type reference
pub fn render_type(package: &Package, ty: &TypeRef, profile: &RenderProfile) -> String {
    match ty {
        TypeRef::Scalar(kind) => profile.scalar_type(*kind).to_string(),
        TypeRef::List(item) => profile.wrap_list(&render_type(package, item, profile)),
        TypeRef::Set(item) => profile.wrap_set(&render_type(package, item, profile)),
        TypeRef::Map(value) => profile.wrap_map(&render_type(package, value, profile)),
        TypeRef::Declared(id) => package[*id].name.clone(),
    }
}

fn serde_attributes(field: &Field) -> Option<String> {
    if field.role == FieldRole::AdditionalProperties {
        return Some("flatten".to_string());
    }

    let mut attributes = Vec::new();
    if field.name != field.json_name {
        attributes.push(format!("rename = {:?}", field.json_name));
    }
    if field.optional {
        attributes.push("default".to_string());
        attributes.push("skip_serializing_if = \"Option::is_none\"".to_string());
    }
    if attributes.is_empty() {
        None
    } else {
        Some(attributes.join(", "))
    }
}

fn push_derives(output: &mut String, derives: &[&str], profile: &RenderProfile) {
    let mut all: Vec<&str> = derives.to_vec();
    for extra in &profile.extra_derives {
        if !all.contains(&extra.as_str()) {
            all.push(extra.as_str());
        }
    }
    output.push_str(&format!("#[derive({})]\n", all.join(", ")));
}

fn push_docs(output: &mut String, indent: &str, docs: &[String]) {
    for (i, doc) in docs.iter().enumerate() {
        if i > 0 {
            output.push_str(&format!("{}///\n", indent));
        }
        for line in doc.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                output.push_str(&format!("{}///\n", indent));
            } else {
                output.push_str(&format!("{}/// {}\n", indent, line));
            }
        }
    }
}
