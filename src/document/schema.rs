//! Registered node types

use rustc_hash::FxHashSet;
use std::fmt;

/// Node types a document can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Paragraph,
    Heading,
    ListItem,
    PageBreak,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Paragraph,
        NodeType::Heading,
        NodeType::ListItem,
        NodeType::PageBreak,
    ];

    /// Name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::ListItem => "listItem",
            NodeType::PageBreak => "pageBreak",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of node types registered with a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    registered: FxHashSet<NodeType>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            registered: NodeType::ALL.into_iter().collect(),
        }
    }
}

impl Schema {
    /// Schema with every node type registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this schema with one node type unregistered
    pub fn without(mut self, node_type: NodeType) -> Self {
        self.registered.remove(&node_type);
        self
    }

    /// Check whether a node type is registered
    pub fn contains(&self, node_type: NodeType) -> bool {
        self.registered.contains(&node_type)
    }
}
