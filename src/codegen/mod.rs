//! Code Generation
//!
//! Renders a compiled `Package` to Rust source.
//!
//! Architecture:
//! - RenderProfile: type mappings and emission switches (config.rs)
//! - Recursion analysis: SCCs over inline field edges decide which fields
//!   need a `Box` to give a finite size
//! - Emitter: one type at a time, in declaration order (rust.rs)
//!
//! The emitter never reads schema JSON, only the type model.

pub mod config;
pub mod rust;

pub use config::{KeywordEscape, RenderProfile, TypeMappings};

use std::collections::{HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::checksum::Checksum;
use crate::error::Result;
use crate::model::{FieldId, Package, TypeId, TypeRef};

// =============================================================================
// Generated Output
// =============================================================================

/// Output from code generation
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Generated code as a string
    pub code: String,
    /// Number of types generated
    pub type_count: usize,
}

// =============================================================================
// Public API
// =============================================================================

/// Generate Rust code for every type in `package`.
///
/// `source` is the checksum of the schemas the package was compiled from and
/// is recorded in the file header. Fails with `DuplicateMember` when the
/// accessors of a type would collide.
pub fn generate_rust(package: &Package, profile: &RenderProfile, source: Option<&Checksum>) -> Result<GeneratedOutput> {
    let boxed = boxed_fields(package);
    let mut output = String::new();

    output.push_str("//! Generated from JSON schemas - DO NOT EDIT\n");
    output.push_str("//!\n");
    output.push_str(&format!("//! Package: {}\n", package.name()));
    if let Some(checksum) = source {
        output.push_str(&format!("//! Source checksum: sha256:{}\n", checksum));
    }
    output.push_str("//!\n");
    output.push_str("//! To regenerate, run `typegen generate` on the source schemas.\n");

    let mut type_count = 0;
    for ty in package.types() {
        output.push('\n');
        output.push_str(&rust::emit_type(package, ty, &boxed, profile)?);
        type_count += 1;
    }

    tracing::debug!("Rendered {} types for package {}", type_count, package.name());

    Ok(GeneratedOutput {
        code: output,
        type_count,
    })
}

// =============================================================================
// Recursion Analysis
// =============================================================================

/// Fields whose type is held inline and leads back to the owning type.
///
/// Only a bare `Declared` field is stored inline; collections already live on
/// the heap and break the cycle on their own. An inline edge needs a `Box`
/// exactly when both ends sit in the same strongly connected component,
/// which covers self-references as well as mutual recursion.
pub fn boxed_fields(package: &Package) -> HashSet<FieldId> {
    let graph = inline_graph(package);

    let mut component = HashMap::new();
    for (scc_id, scc) in kosaraju_scc(&graph).into_iter().enumerate() {
        for node_idx in scc {
            component.insert(node_idx, scc_id);
        }
    }

    let boxed: HashSet<FieldId> = graph
        .edge_references()
        .filter(|e| component.get(&e.source()) == component.get(&e.target()))
        .map(|e| *e.weight())
        .collect();

    tracing::debug!("{} fields boxed to break recursion in {}", boxed.len(), package.name());
    boxed
}

/// Type graph with one edge per inline `Declared` field
fn inline_graph(package: &Package) -> DiGraph<TypeId, FieldId> {
    let mut graph = DiGraph::with_capacity(package.len(), package.len() * 2);
    let node_indices: HashMap<TypeId, NodeIndex> = package
        .types()
        .map(|ty| (ty.id, graph.add_node(ty.id)))
        .collect();

    for ty in package.types() {
        for (index, field) in ty.fields.iter().enumerate() {
            if let TypeRef::Declared(target) = field.ty {
                if let (Some(&from_idx), Some(&to_idx)) = (node_indices.get(&ty.id), node_indices.get(&target)) {
                    graph.add_edge(from_idx, to_idx, FieldId { owner: ty.id, index });
                }
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, TypeKind};

    fn field(name: &str, ty: TypeRef) -> Field {
        Field::new(name, name, ty)
    }

    #[test]
    fn test_boxes_edges_within_cycles_only() {
        let mut package = Package::new("graph");
        let a = package.declare("A", TypeKind::Class, None).unwrap();
        let b = package.declare("B", TypeKind::Class, None).unwrap();
        let leaf = package.declare("Leaf", TypeKind::Class, None).unwrap();

        let a_to_b = package[a].add_field(field("b", TypeRef::Declared(b)));
        let a_to_leaf = package[a].add_field(field("leaf", TypeRef::Declared(leaf)));
        let b_to_a = package[b].add_field(field("a", TypeRef::Declared(a)));
        let b_to_many = package[b].add_field(field("many", TypeRef::List(Box::new(TypeRef::Declared(b)))));

        let self_ref = package[leaf].add_field(field("next", TypeRef::Declared(leaf)));

        let boxed = boxed_fields(&package);

        assert_eq!(boxed.len(), 3);
        assert!(boxed.contains(&self_ref));
        assert!(boxed.contains(&a_to_b));
        assert!(boxed.contains(&b_to_a));
        assert!(!boxed.contains(&a_to_leaf));
        assert!(!boxed.contains(&b_to_many));
    }

    #[test]
    fn test_header_and_count() {
        let mut package = Package::new("empty");
        package.declare("One", TypeKind::Class, None).unwrap();
        package.declare("Two", TypeKind::Class, None).unwrap();
        let checksum = Checksum::from_str("{}");

        let output = generate_rust(&package, &RenderProfile::rust(), Some(&checksum)).unwrap();

        assert_eq!(output.type_count, 2);
        assert!(output.code.starts_with("//! Generated from JSON schemas - DO NOT EDIT\n"));
        assert!(output.code.contains("//! Package: empty\n"));
        assert!(output.code.contains(&format!("//! Source checksum: sha256:{}\n", checksum)));
        assert_eq!(output.code.matches(rust::PROVENANCE_MARKER).count(), 2);
        assert!(output.code.find("pub struct One").unwrap() < output.code.find("pub struct Two").unwrap());
    }
}
