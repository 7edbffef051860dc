//! rtx DOM - Document Object Model
//!
//! Arena-based, namespace-aware document tree. This is the "live" tree the
//! filter engine rewrites in place: HTML view fragments and XML data
//! documents both end up in a [`DomTree`].

mod error;
mod interner;
mod node;
pub mod ns;
mod tree;

pub use error::{DomError, DomResult};
pub use interner::{InternedString, StringInterner};
pub use node::{Attribute, ElementData, Node, NodeData, NodeType, QualName, TextData};
pub use tree::{Children, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node" in sibling/parent links
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn to_option(self) -> Option<NodeId> {
        if self.is_valid() { Some(self) } else { None }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}
