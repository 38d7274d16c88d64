//! Nested mapping mirroring the scanned directory hierarchy.

use crate::app::error::{AutoloadError, Result};
use indexmap::IndexMap;
use serde::Serialize;

/// A tree level: directory names map to branches, file stems map to leaves.
///
/// Keys keep insertion order, which is the traversal order of the scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tree<T> {
    children: IndexMap<String, Node<T>>,
}

/// A single entry of a [`Tree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node<T> {
    /// A directory holding at least one loaded module.
    Branch(Tree<T>),
    /// The value exported by a loaded file.
    Leaf(T),
}

impl<T> Node<T> {
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Tree<T>> {
        match self {
            Node::Branch(tree) => Some(tree),
            Node::Leaf(_) => None,
        }
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self {
            children: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.children.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Node<T>> {
        self.children.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node<T>)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Follows `segments` from this level down, one key per level.
    pub fn get_path(&self, segments: &[&str]) -> Option<&Node<T>> {
        let (last, dirs) = segments.split_last()?;
        let mut level = self;
        for dir in dirs {
            level = level.get(dir)?.as_branch()?;
        }
        level.get(last)
    }

    /// Shorthand for the leaf value at `segments`.
    pub fn leaf(&self, segments: &[&str]) -> Option<&T> {
        self.get_path(segments).and_then(Node::as_leaf)
    }

    /// Stores `value` under `key` below the branch addressed by `dirs`,
    /// creating missing branches on the way.
    ///
    /// Each key holds exactly one node: walking through a leaf, or storing
    /// under a key that is already taken, is a [`AutoloadError::TreeConflict`].
    pub fn insert(&mut self, dirs: &[String], key: impl Into<String>, value: T) -> Result<()> {
        let mut level = self;
        for (depth, dir) in dirs.iter().enumerate() {
            let node = level
                .children
                .entry(dir.clone())
                .or_insert_with(|| Node::Branch(Tree::new()));
            level = match node {
                Node::Branch(tree) => tree,
                Node::Leaf(_) => {
                    return Err(AutoloadError::TreeConflict {
                        namespace: dirs[..=depth].join("."),
                    })
                }
            };
        }

        let key = key.into();
        if level.children.contains_key(&key) {
            let mut namespace = dirs.to_vec();
            namespace.push(key);
            return Err(AutoloadError::TreeConflict {
                namespace: namespace.join("."),
            });
        }
        level.children.insert(key, Node::Leaf(value));
        Ok(())
    }

    /// Every leaf with its dotted path, depth-first in insertion order.
    pub fn leaves(&self) -> Vec<(String, &T)> {
        fn collect<'a, T>(level: &'a Tree<T>, prefix: &mut Vec<&'a str>, out: &mut Vec<(String, &'a T)>) {
            for (key, node) in level.iter() {
                prefix.push(key);
                match node {
                    Node::Leaf(value) => out.push((prefix.join("."), value)),
                    Node::Branch(tree) => collect(tree, prefix, out),
                }
                prefix.pop();
            }
        }

        let mut out = Vec::new();
        collect(self, &mut Vec::new(), &mut out);
        out
    }
}
