use crate::record::Record;
use serde::{Deserialize, Serialize};

pub mod builder;

pub use builder::{
    ForestBuild, ForestBuilder, ForestError, OrphanPolicy, PlacedRecord, Placement, build_forest,
};

/// A record plus the records that named it as parent.
///
/// Leaves carry `children: None`, so the serialized form omits the attribute
/// entirely instead of writing an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    data: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<Node>>,
}

impl Node {
    pub(crate) fn new(data: Record, children: Vec<Node>) -> Self {
        Self {
            data,
            children: (!children.is_empty()).then_some(children),
        }
    }

    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn id(&self) -> &str {
        self.data.id()
    }

    /// Number of dot-separated segments in the path identifier.
    pub fn depth(&self) -> usize {
        if self.id().is_empty() {
            0
        } else {
            self.id().split('.').count()
        }
    }

    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    fn normalize_leaves(&mut self) {
        if let Some(children) = self.children.as_mut() {
            if children.is_empty() {
                self.children = None;
            } else {
                children.iter_mut().for_each(Node::normalize_leaves);
            }
        }
    }
}

/// Root nodes in the order their records were first encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    roots: Vec<Node>,
}

impl Forest {
    pub(crate) fn from_roots(roots: Vec<Node>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Total number of nodes across all trees.
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first, pre-order traversal yielding each node with its nesting
    /// level (roots are level 0).
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.roots.iter().rev().map(|node| (0, node)).collect(),
        }
    }

    /// First node in pre-order whose `ID` equals `id`.
    pub fn find(&self, id: &str) -> Option<&Node> {
        self.walk().map(|(_, node)| node).find(|node| node.id() == id)
    }

    /// Drops any explicit empty child lists, e.g. after deserializing JSON
    /// written by another tool.
    pub(crate) fn normalize_leaves(&mut self) {
        self.roots.iter_mut().for_each(Node::normalize_leaves);
    }
}

pub struct Walk<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (level, node) = self.stack.pop()?;
        self.stack
            .extend(node.children().iter().rev().map(|child| (level + 1, child)));
        Some((level, node))
    }
}
