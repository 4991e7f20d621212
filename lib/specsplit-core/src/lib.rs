//! # specsplit-core
//!
//! Partition large OpenAPI-style documents into self-contained service
//! documents, and collapse schema composition keywords into one effective
//! shape.
//!
//! A monolithic API description quickly becomes unwieldy: hundreds of
//! operations, a `components` section shared by all of them, and `$ref`
//! pointers criss-crossing the whole tree. This crate splits such a document
//! along a configurable discriminator (operation tag or path segment) so
//! that each resulting document stands alone — every pointer it contains
//! resolves within it — while carrying only the components it actually
//! needs.
//!
//! ## Splitting a document
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use specsplit_core::document::load_document;
//! use specsplit_core::split::{Discriminator, SplitOptions, partition};
//!
//! # fn main() -> Result<(), specsplit_core::SplitError> {
//! let document = load_document(Path::new("openapi.yaml"))?;
//! let options = SplitOptions::new("acme").with_discriminator(Discriminator::Tag);
//!
//! let outcome = partition(&document, &options)?;
//! for (name, service) in &outcome.services {
//!     println!("{name}: {} paths", service.paths.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Computing an effective schema
//!
//! Downstream generators want one concrete shape, not a lattice of `allOf`/
//! `anyOf`/`oneOf` compositions:
//!
//! ```rust
//! use serde_json::json;
//! use specsplit_core::compose::effective_schema;
//!
//! let schema = json!({
//!     "allOf": [
//!         {"type": "object", "properties": {"id": {"type": "string", "readOnly": true}}},
//!         {"properties": {"name": {"type": "string"}}, "required": ["name"]}
//!     ]
//! });
//!
//! let effective = effective_schema(&schema);
//! assert!(effective.get("allOf").is_none());
//! assert!(effective["properties"].get("id").is_none()); // readOnly stripped
//! ```
//!
//! Both halves are cycle-safe: reference closure uses a processed-pointer
//! set, and the composition rewrites guard with a depth ceiling plus an
//! on-path identity check, so self- or mutually-referential schemas
//! terminate instead of recursing forever.

pub mod compose;
pub mod document;
mod error;
pub mod refs;
pub mod split;
pub mod yaml;

pub use compose::{effective_schema, merge_all_of, resolve_union_first_branch, strip_read_only};
pub use document::{ComponentBucket, load_document};
pub use error::SplitError;
pub use refs::{ComponentClosure, ComponentRef, collect_refs, compute_closure};
pub use split::{
    Discriminator, Service, SplitOptions, SplitOutcome, SplitReport, partition, write_services,
};
pub use yaml::ToYaml;
