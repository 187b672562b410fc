//! The merged configuration tree

use serde::Serialize;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A terminal configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Leaf {
    Scalar(String),
    List(Vec<String>),
}

/// A node of the configuration tree: either a value or a nested namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Leaf(Leaf),
    Branch(Namespace),
}

impl Node {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Node::Leaf(Leaf::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Node::Leaf(Leaf::List(values)) => Some(values),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Namespace> {
        match self {
            Node::Branch(namespace) => Some(namespace),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_branch_mut(&mut self) -> Option<&mut Namespace> {
        match self {
            Node::Branch(namespace) => Some(namespace),
            Node::Leaf(_) => None,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Node::Branch(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Leaf(Leaf::Scalar(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Leaf(Leaf::Scalar(value))
    }
}

impl From<Vec<String>> for Node {
    fn from(values: Vec<String>) -> Self {
        Node::Leaf(Leaf::List(values))
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Namespace> for Node {
    fn from(namespace: Namespace) -> Self {
        Node::Branch(namespace)
    }
}

/// Mutable, path-addressable configuration tree.
///
/// Keys are unique within a namespace. Assigning to an existing key replaces
/// the node wholesale, whatever its previous shape was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Namespace {
    entries: BTreeMap<String, Node>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    /// Assign `node` at `key`, returning whatever was there before.
    pub fn set(&mut self, key: impl Into<String>, node: impl Into<Node>) -> Option<Node> {
        self.entries.insert(key.into(), node.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Node> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Walk `segments` through nested branches.
    ///
    /// An empty path never resolves, since the root itself is not a node.
    pub fn get_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Node> {
        let (last, parents) = segments.split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.get(segment.as_ref())?.as_branch()?;
        }
        current.get(last.as_ref())
    }

    /// Dot-separated shorthand for [`Namespace::get_path`].
    pub fn lookup(&self, dotted: &str) -> Option<&Node> {
        let segments: Vec<&str> = dotted.split('.').collect();
        self.get_path(&segments)
    }

    /// Scalar value at a dotted path, if the path ends in a scalar leaf.
    pub fn scalar(&self, dotted: &str) -> Option<&str> {
        self.lookup(dotted).and_then(Node::as_scalar)
    }

    /// List value at a dotted path, if the path ends in a list leaf.
    pub fn list(&self, dotted: &str) -> Option<&[String]> {
        self.lookup(dotted).and_then(Node::as_list)
    }

    /// Assign `node` at the end of `segments`, creating branches on the way.
    ///
    /// A leaf standing where a branch is needed is replaced by an empty
    /// branch. Returns the node previously stored at the final segment.
    pub fn set_path<S: AsRef<str>>(&mut self, segments: &[S], node: impl Into<Node>) -> Option<Node> {
        let (last, parents) = segments.split_last()?;
        let mut current = self;
        for segment in parents {
            let slot = current
                .entries
                .entry(segment.as_ref().to_string())
                .or_insert_with(|| Node::Branch(Namespace::new()));
            if slot.is_leaf() {
                *slot = Node::Branch(Namespace::new());
            }
            current = slot.as_branch_mut()?;
        }
        current.set(last.as_ref(), node)
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = (&'a String, &'a Node);
    type IntoIter = btree_map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Namespace {
        let mut db = Namespace::new();
        db.set("host", "localhost");
        db.set("ports", vec!["5432".to_string(), "5433".to_string()]);
        let mut root = Namespace::new();
        root.set("db", db);
        root.set("name", "demo");
        root
    }

    #[test]
    fn lookup_walks_nested_branches() {
        let ns = sample();
        assert_eq!(ns.scalar("db.host"), Some("localhost"));
        assert_eq!(ns.list("db.ports").map(|p| p.len()), Some(2));
        assert_eq!(ns.scalar("name"), Some("demo"));
        assert!(ns.lookup("db.missing").is_none());
        assert!(ns.lookup("name.nested").is_none(), "cannot descend into a leaf");
    }

    #[test]
    fn empty_path_never_resolves() {
        let ns = sample();
        let empty: [&str; 0] = [];
        assert!(ns.get_path(&empty).is_none());
    }

    #[test]
    fn set_replaces_regardless_of_shape() {
        let mut ns = sample();
        let previous = ns.set("db", "flat");
        assert!(previous.map(|node| node.is_branch()).unwrap_or(false));
        assert_eq!(ns.scalar("db"), Some("flat"));

        ns.set("name", Namespace::new());
        assert!(ns.get("name").map(Node::is_branch).unwrap_or(false));
    }

    #[test]
    fn set_path_creates_and_overrides_intermediate_nodes() {
        let mut ns = Namespace::new();
        ns.set("a", "leaf");
        ns.set_path(&["a", "b", "c"], "deep");
        assert_eq!(ns.scalar("a.b.c"), Some("deep"));

        ns.set_path(&["a", "b", "d"], "sibling");
        assert_eq!(ns.scalar("a.b.c"), Some("deep"));
        assert_eq!(ns.scalar("a.b.d"), Some("sibling"));
    }

    #[test]
    fn serializes_as_plain_nested_structure() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "db": { "host": "localhost", "ports": ["5432", "5433"] },
                "name": "demo"
            })
        );
    }
}
