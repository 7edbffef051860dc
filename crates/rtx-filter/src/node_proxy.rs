//! NodeProxy - buffered mutation of a single node
//!
//! A proxy never touches the tree while rules run. Structural decisions are
//! recorded as a [`NodeState`] and only applied by
//! [`Persist::persist_to_dom`], which also tells the filter whether rule
//! processing for this node may go on.

use rtx_dom::{DomTree, NodeData, NodeId, NodeType};

use crate::namespaces::DEFAULT_NAMESPACES;
use crate::{ElementProxy, FilterError};

/// The structural fate of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    /// Keep the node; subclasses may still rename or re-attribute it
    #[default]
    KeepOrReplace,
    /// Remove the node including its subtree
    RemoveRecursively,
    /// Remove the node, keeping its children at its position
    RemoveSelf,
    /// Remove all children, keep the node
    RemoveChildren,
}

/// Outcome of persisting a proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistResponse {
    /// Further rules may run on this node
    Continue,
    /// The node is gone or unsafe to process further
    Abort,
    /// Like `Abort`, but the walk must resume at the given node
    RestartFrom(NodeId),
}

impl PersistResponse {
    /// Whether rule processing for the node has to stop
    pub fn is_abort(self) -> bool {
        !matches!(self, Self::Continue)
    }

    /// The node to resume the walk from, if any
    pub fn restart(self) -> Option<NodeId> {
        match self {
            Self::RestartFrom(node) => Some(node),
            _ => None,
        }
    }
}

/// Access to the tree: exclusive for the proxy being filtered, shared for
/// read-only proxies of ancestors.
#[derive(Debug)]
enum TreeAccess<'t> {
    Exclusive(&'t mut DomTree),
    Shared(&'t DomTree),
}

/// Mutation buffer for one node
#[derive(Debug)]
pub struct NodeProxy<'t> {
    tree: TreeAccess<'t>,
    delegate: NodeId,
    state: NodeState,
    mutable: bool,
}

impl<'t> NodeProxy<'t> {
    /// Mutable proxy for `delegate`
    pub fn new(tree: &'t mut DomTree, delegate: NodeId) -> Self {
        Self {
            tree: TreeAccess::Exclusive(tree),
            delegate,
            state: NodeState::KeepOrReplace,
            mutable: true,
        }
    }

    /// Read-only proxy for `delegate`; every mutating call fails
    pub fn immutable(tree: &'t DomTree, delegate: NodeId) -> Self {
        Self {
            tree: TreeAccess::Shared(tree),
            delegate,
            state: NodeState::KeepOrReplace,
            mutable: false,
        }
    }

    /// The wrapped node (the replacement, once an element got replaced)
    #[inline]
    pub fn delegate(&self) -> NodeId {
        self.delegate
    }

    pub(crate) fn set_delegate(&mut self, delegate: NodeId) {
        self.delegate = delegate;
    }

    /// The live tree
    pub fn tree(&self) -> &DomTree {
        match &self.tree {
            TreeAccess::Exclusive(tree) => &**tree,
            TreeAccess::Shared(tree) => *tree,
        }
    }

    pub(crate) fn tree_mut(&mut self) -> Result<&mut DomTree, FilterError> {
        match &mut self.tree {
            TreeAccess::Exclusive(tree) => Ok(&mut **tree),
            TreeAccess::Shared(_) => Err(FilterError::ImmutableProxy { operation: "persist" }),
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub(crate) fn require_mutable(&self, operation: &'static str) -> Result<(), FilterError> {
        if self.mutable {
            Ok(())
        } else {
            Err(FilterError::ImmutableProxy { operation })
        }
    }

    fn toggle_state(&mut self, state: NodeState, on: bool, operation: &'static str) -> Result<(), FilterError> {
        self.require_mutable(operation)?;
        if on {
            self.state = state;
        } else if self.state == state {
            self.state = NodeState::KeepOrReplace;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // State toggles
    // ------------------------------------------------------------------

    /// Whether the node and its subtree are going to be removed
    pub fn remove(&self) -> bool {
        self.state == NodeState::RemoveRecursively
    }

    pub fn set_remove(&mut self, remove: bool) -> Result<(), FilterError> {
        self.toggle_state(NodeState::RemoveRecursively, remove, "set remove")
    }

    /// Whether the children are going to be removed
    pub fn remove_children(&self) -> bool {
        self.state == NodeState::RemoveChildren
    }

    pub fn set_remove_children(&mut self, remove: bool) -> Result<(), FilterError> {
        self.toggle_state(NodeState::RemoveChildren, remove, "set remove children")
    }

    /// Whether the node is going to be replaced by its children
    pub fn replace_by_children(&self) -> bool {
        self.state == NodeState::RemoveSelf
    }

    pub fn set_replace_by_children(&mut self, replace: bool) -> Result<(), FilterError> {
        self.toggle_state(NodeState::RemoveSelf, replace, "set replace by children")
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    /// Node name: lower-case tag for elements, `#text`, `#comment`, ...
    pub fn name(&self) -> String {
        let tree = self.tree();
        match tree.get(self.delegate).map(|n| &n.data) {
            Some(NodeData::Element(_)) => tree
                .tag_name(self.delegate)
                .unwrap_or_default()
                .to_lowercase(),
            Some(NodeData::Text(_)) => "#text".to_string(),
            Some(NodeData::Comment(_)) => "#comment".to_string(),
            Some(NodeData::Document) => "#document".to_string(),
            Some(NodeData::Doctype { name, .. }) => name.clone(),
            Some(NodeData::ProcessingInstruction { target, .. }) => target.clone(),
            None => String::new(),
        }
    }

    /// Node type of the delegate
    pub fn node_type(&self) -> Option<NodeType> {
        self.tree().node_type(self.delegate)
    }

    /// Whether this node is the only child of its parent
    pub fn singleton(&self) -> bool {
        let tree = self.tree();
        tree.parent(self.delegate)
            .is_some_and(|parent| tree.child_count(parent) == 1)
    }

    /// Whether the node has no children
    pub fn is_empty(&self) -> bool {
        self.tree().first_child(self.delegate).is_none()
    }

    /// Whether no child satisfies `consider`, e.g. to treat whitespace-only
    /// text as "nothing"
    pub fn is_empty_by(&self, consider: impl Fn(&DomTree, NodeId) -> bool) -> bool {
        let tree = self.tree();
        !tree.children(self.delegate).any(|(child, _)| consider(tree, child))
    }

    /// Whether this node is the last child of its parent
    pub fn last_node(&self) -> bool {
        self.tree().next_sibling(self.delegate).is_none()
    }

    /// First child satisfying `condition`
    pub fn find_first(&self, condition: impl Fn(&DomTree, NodeId) -> bool) -> Option<NodeId> {
        let tree = self.tree();
        tree.children(self.delegate)
            .map(|(child, _)| child)
            .find(|&child| condition(tree, child))
    }

    /// Read-only proxy of the parent node
    pub fn parent_node(&self) -> Option<NodeProxy<'_>> {
        let tree = self.tree();
        tree.parent(self.delegate)
            .map(|parent| NodeProxy::immutable(tree, parent))
    }

    /// Read-only proxy of the parent, if it is an element
    pub fn parent_element(&self) -> Option<ElementProxy<'_>> {
        let tree = self.tree();
        tree.parent(self.delegate)
            .filter(|&parent| tree.node_type(parent) == Some(NodeType::Element))
            .map(|parent| ElementProxy::immutable(tree, parent, &DEFAULT_NAMESPACES))
    }

    // ------------------------------------------------------------------
    // Structural persistence
    // ------------------------------------------------------------------

    fn persist_remove_recursively(&mut self) -> Result<PersistResponse, FilterError> {
        let node = self.delegate;
        tracing::trace!("Removing {} with subtree", node);
        self.tree_mut()?.detach(node)?;
        Ok(PersistResponse::Abort)
    }

    fn persist_replace_by_children(&mut self) -> Result<PersistResponse, FilterError> {
        let node = self.delegate;
        let tree = self.tree_mut()?;
        let first = tree.first_child(node);
        if let Some(parent) = tree.parent(node) {
            for child in tree.child_ids(node) {
                tree.insert_before(parent, child, Some(node))?;
            }
            tree.detach(node)?;
        }
        tracing::trace!("Replaced {} by its children, restart at {:?}", node, first);
        Ok(match first {
            Some(child) => PersistResponse::RestartFrom(child),
            None => PersistResponse::Abort,
        })
    }

    fn persist_remove_children(&mut self) -> Result<(), FilterError> {
        let node = self.delegate;
        self.tree_mut()?.remove_children(node)?;
        Ok(())
    }
}

/// Persistence protocol shared by all proxies.
///
/// Implementors provide access to their [`NodeProxy`] and may override the
/// keep-or-replace hook; the structural states are handled here.
pub trait Persist<'t> {
    fn node_proxy(&self) -> &NodeProxy<'t>;

    fn node_proxy_mut(&mut self) -> &mut NodeProxy<'t>;

    /// Apply non-structural changes (rename, attributes, text)
    fn persist_keep_or_replace(&mut self) -> Result<PersistResponse, FilterError> {
        Ok(PersistResponse::Continue)
    }

    /// Write buffered changes to the tree
    fn persist_to_dom(&mut self) -> Result<PersistResponse, FilterError> {
        if !self.node_proxy().is_mutable() {
            return Ok(PersistResponse::Continue);
        }
        match self.node_proxy().state() {
            NodeState::KeepOrReplace => self.persist_keep_or_replace(),
            NodeState::RemoveRecursively => self.node_proxy_mut().persist_remove_recursively(),
            NodeState::RemoveSelf => self.node_proxy_mut().persist_replace_by_children(),
            NodeState::RemoveChildren => {
                self.node_proxy_mut().persist_remove_children()?;
                // the node itself lives on, so do its buffered changes
                self.persist_keep_or_replace()
            }
        }
    }
}

impl<'t> Persist<'t> for NodeProxy<'t> {
    fn node_proxy(&self) -> &NodeProxy<'t> {
        self
    }

    fn node_proxy_mut(&mut self) -> &mut NodeProxy<'t> {
        self
    }
}
