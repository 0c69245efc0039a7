//! Filter evaluation engine

pub mod compare;
pub mod filter;
pub mod keys;

pub use compare::{CompareOp, GlobPattern};
pub use filter::{BoolOp, Combination, Comparison, CustomFilter, FilterExpression};
pub use keys::{canonicalize, resolve_key};
