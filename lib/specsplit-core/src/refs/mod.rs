//! Reference extraction and transitive closure over document pointers.
//!
//! A pointer is a string of the shape `#/components/<bucket>/<name>` linking
//! an arbitrary location in a document to a named, reusable fragment under
//! `components`. This module provides the two graph primitives the
//! partitioner is built on:
//!
//! - [`collect_refs`] scans any subtree and returns the set of pointer
//!   strings it contains;
//! - [`compute_closure`] expands a set of seed pointers into the full set of
//!   components transitively reachable from them, so a partitioned document
//!   can carry exactly the fragments it needs and nothing else.
//!
//! Both are cycle-safe: self-referential or mutually-referential components
//! are processed exactly once each.

mod closure;
mod pointer;

pub use closure::{ComponentClosure, compute_closure};
pub use pointer::{ComponentRef, collect_refs};
