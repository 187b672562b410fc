//! Core data types: configuration mappings produced by sources and the
//! configuration tree they are merged into.

mod mapping;
mod namespace;

pub use mapping::{ConfigMap, ConfigValue};
pub use namespace::{Leaf, Namespace, Node};
