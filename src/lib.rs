//! JSON Schema Type Generator
//!
//! Compiles JSON Schema documents into a type model (classes with fields,
//! enums, documentation and generated behaviors) and renders that model as
//! Rust source.
//!
//! ## Features
//!
//! - **Rule Dispatch**: one rule per schema construct, looked up through a
//!   replaceable `RuleFactory`
//! - **Deterministic Naming**: the same schema always yields the same names;
//!   name collisions fail instead of being renamed
//! - **Local References**: `#` and `#/...` `$ref`s, including cycles
//! - **Provenance**: generated files record a checksum of their sources
//!
//! ## Architecture
//!
//! ```text
//! schema files ── loader ──> SchemaSource ── SchemaMapper ──> Package
//!                                              │
//!                                  RuleFactory (rules/*)
//!
//! Package ── codegen::generate_rust ──> <package>.rs
//! ```

pub mod checksum;
pub mod codegen;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod naming;
pub mod rules;
pub mod schema;

pub use checksum::Checksum;
pub use codegen::{generate_rust, GeneratedOutput, RenderProfile};
pub use config::{GenerationConfig, TypegenConfig};
pub use error::{GenerationError, Result};
pub use loader::{compile_sources, load_sources, SchemaSource};
pub use model::{Package, TypeDescriptor, TypeId, TypeRef};
pub use rules::{Generation, RuleFactory, SchemaMapper, SchemaRule};
