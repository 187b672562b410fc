//! Folding a configuration mapping into a configuration tree
//!
//! Merging is additive at the top level and replacing below it: keys missing
//! from the incoming mapping are left alone, while a nested mapping always
//! becomes a brand new branch that replaces whatever sat at that key. Two
//! sources that both define `db.*` therefore do not union their `db` tables;
//! the later source's `db` wins as a whole.

use crate::domain::{ConfigMap, ConfigValue, Leaf, Namespace, Node};

/// Merge `values` into `target` and hand the target back for chaining.
pub fn merge<'a>(values: &ConfigMap, target: &'a mut Namespace) -> &'a mut Namespace {
    for (key, value) in values {
        target.set(key.as_str(), to_node(value));
    }
    target
}

fn to_node(value: &ConfigValue) -> Node {
    match value {
        ConfigValue::Scalar(text) => Node::Leaf(Leaf::Scalar(text.clone())),
        ConfigValue::List(items) => Node::Leaf(Leaf::List(items.clone())),
        ConfigValue::Map(nested) => {
            let mut branch = Namespace::new();
            merge(nested, &mut branch);
            Node::Branch(branch)
        }
    }
}
