//! Partitioning a document into self-contained service documents.
//!
//! # Overview
//!
//! A large API document is split into one document per *service*, where a
//! service is a named group of operations chosen by a [`Discriminator`]
//! (the operation's first tag, or the first significant path segment). Each
//! service document carries:
//!
//! - the subset of `paths` whose operations were classified into it,
//!   together with path-level entries shared by those operations;
//! - exactly the `components` transitively referenced from those paths
//!   (computed by [`compute_closure`](crate::refs::compute_closure)), deep
//!   copied so services never share mutable structure;
//! - the `servers` block and an `info` skeleton copied from the source.
//!
//! Post-processing then normalizes the output for downstream consumers:
//! hyphenated `{path-params}` become underscored (template and parameter
//! declaration together), schema objects that declare `properties` without
//! `type` gain `type: object`, and empty component buckets are pruned.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use specsplit_core::document::load_document;
//! use specsplit_core::split::{SplitOptions, create_dest_dir, partition, write_services};
//!
//! # fn main() -> Result<(), specsplit_core::SplitError> {
//! let document = load_document(Path::new("openapi.yaml"))?;
//! let options = SplitOptions::new("acme").with_overwrite(true);
//!
//! let outcome = partition(&document, &options)?;
//!
//! create_dest_dir(Path::new("services"), options.overwrite)?;
//! write_services(Path::new("services"), &outcome.services)?;
//!
//! for unresolved in &outcome.report.unresolved {
//!     eprintln!("dangling reference: {unresolved}");
//! }
//! # Ok(())
//! # }
//! ```

mod options;
mod partitioner;
mod postprocess;
mod service;
mod writer;

pub use options::{Discriminator, InvalidDiscriminator, SKIP_SENTINEL, SplitOptions};
pub use partitioner::{SplitOutcome, SplitReport, UnresolvedRef, partition};
pub use service::{Components, Service, ServiceInfo};
pub use writer::{create_dest_dir, write_services};
