//! Type Expression Analysis
//!
//! Turns raw type-signature text emitted by the API extractor into
//! structured trees that templates can render as property tables.
//!
//! # Supported Shapes
//!
//! ```text
//! string | number | boolean | void | any | never | unknown | null | undefined
//! T[]                      array
//! A | B                    union
//! A & B                    intersection
//! Base<P1, P2>             generic (parameters kept raw, analyzed on demand)
//! { a: T; b?: U }          object literal
//! ```
//!
//! Shapes nest up to [`MAX_DEPTH`] levels. Anything else, including
//! unbalanced brackets, degrades to `Unknown`.

mod enrich;
mod node;
mod parser;
mod proptest;
pub mod split;

pub use enrich::{child_path, enrich, DescriptionLookup};
pub use node::{Primitive, PropertyNode, TypeNode};
pub use parser::{analyze, collapse_whitespace, MAX_DEPTH, PARAMETER_SEPARATOR, PROPERTY_SEPARATOR};
