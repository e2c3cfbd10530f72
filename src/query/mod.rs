//! Traversal over stored relations
//!
//! Closures are computed level by level against the `GraphStore` trait,
//! so any backend that can answer one-hop neighbour queries gets
//! unbounded-depth traversal for free.

mod traverse;
mod types;

pub use traverse::{closure, closure_with_depth, ClosureResult};
pub use types::Direction;
