//! Schema composition normalizer.
//!
//! Collapses the composition keywords of a schema node into one concrete
//! "effective" shape for downstream generators:
//!
//! - [`merge_all_of`] folds `allOf` branches into a single object
//!   (later branch wins on key collisions);
//! - [`resolve_union_first_branch`] replaces `anyOf`/`oneOf` with their
//!   first branch only — a deliberate, lossy simplification, logged at debug
//!   level, not an attempt to model true sum types;
//! - [`strip_read_only`] removes properties marked `readOnly: true`, leaving
//!   the writable shape.
//!
//! The three rewrites share one traversal (descent into `properties`,
//! `items`, and object-typed `additionalProperties`) and one guard: a fixed
//! depth ceiling plus an on-stack node-identity set, so pathological nesting
//! and reference cycles return the node unmodified instead of recursing
//! forever. They are meant to be applied in sequence; [`effective_schema`]
//! does exactly that on an owned clone.

mod guard;
mod passes;

pub use passes::{merge_all_of, resolve_union_first_branch, strip_read_only};

use serde_json::Value;

/// Computes the effective schema of `node`: all-of merge, then first-branch
/// union resolution, then read-only stripping, on an independent clone.
///
/// Applying the sequence to an already-composed schema is a no-op, so the
/// result is stable under repeated application.
#[must_use]
pub fn effective_schema(node: &Value) -> Value {
    let mut effective = node.clone();
    merge_all_of(&mut effective);
    resolve_union_first_branch(&mut effective);
    strip_read_only(&mut effective);
    effective
}
