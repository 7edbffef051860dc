//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed: detaching a node only unlinks it, so a `NodeId`
//! stays valid for the lifetime of the tree even after the node left the
//! document.

use crate::node::{Attribute, ElementData, Node, NodeData, NodeType, QualName};
use crate::{DomError, DomResult, InternedString, NodeId, StringInterner, ns};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            interner: StringInterner::new(),
        }
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the document has no content
    pub fn is_empty(&self) -> bool {
        !self.nodes[0].first_child.is_valid()
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    /// Access the string interner
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Intern a string
    pub fn intern(&mut self, s: &str) -> InternedString {
        self.interner.intern(s)
    }

    /// Resolve an interned string
    #[inline]
    pub fn resolve(&self, id: InternedString) -> &str {
        self.interner.get(id)
    }

    /// Build a qualified name from a namespace URI and a `prefix:local` name
    pub fn qual_name(&mut self, namespace: &str, qualified: &str) -> QualName {
        let (prefix, local) = ns::split_qualified(qualified);
        let ns = self.intern(namespace);
        let prefix = self.intern(prefix.unwrap_or(""));
        let local = self.intern(local);
        QualName::with_prefix(ns, prefix, local)
    }

    /// Render a qualified name as `prefix:local` (or `local`)
    pub fn qualified_name(&self, name: QualName) -> String {
        if name.prefix.is_empty() {
            self.resolve(name.local).to_string()
        } else {
            format!("{}:{}", self.resolve(name.prefix), self.resolve(name.local))
        }
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Add a detached node to the arena
    pub fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: QualName) -> NodeId {
        self.push_node(Node::element(name))
    }

    /// Create a detached element from a namespace URI and qualified name
    pub fn create_element_ns(&mut self, namespace: &str, qualified: &str) -> NodeId {
        let name = self.qual_name(namespace, qualified);
        self.create_element(name)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push_node(Node::text(content.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push_node(Node::comment(content.to_string()))
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Node type, if the node exists
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.to_option())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.to_option())
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.last_child.to_option())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling.to_option())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling.to_option())
    }

    /// Iterate over the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE),
        }
    }

    /// Snapshot of the child IDs of a node
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// Number of children
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Check whether `ancestor` is `node` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node.to_option();
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Unlink a node (and its subtree) from its parent
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Append a child, moving it from its current position if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or append when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild { parent, child: reference });
            }
            if reference == child {
                return Ok(());
            }
        }

        self.detach(child)?;

        let (prev, next) = match reference {
            Some(reference) => (self.nodes[reference.index()].prev_sibling, reference),
            None => (self.nodes[parent.index()].last_child, NodeId::NONE),
        };

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }
        Ok(())
    }

    /// Put `new_child` where `old_child` is and detach `old_child`
    pub fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> DomResult<()> {
        if self.parent(old_child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child: old_child });
        }
        if new_child == old_child {
            return Ok(());
        }
        self.insert_before(parent, new_child, Some(old_child))?;
        self.detach(old_child)
    }

    /// Detach every child of a node
    pub fn remove_children(&mut self, id: NodeId) -> DomResult<()> {
        for child in self.child_ids(id) {
            self.detach(child)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Elements and attributes
    // ------------------------------------------------------------------

    /// Element data, if the node is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?.as_element_mut().ok_or(DomError::NotAnElement(id))
    }

    /// Qualified tag name as stored (`prefix:local` or `local`)
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        self.element(id).map(|e| self.qualified_name(e.name))
    }

    /// Local name of an element
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| self.resolve(e.name.local))
    }

    /// Namespace URI of an element (empty for no namespace)
    pub fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| self.resolve(e.name.ns))
    }

    /// Attributes of an element in document order
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        self.element(id).map(|e| e.attrs.as_slice()).unwrap_or(&[])
    }

    /// Qualified names of all attributes in document order
    pub fn attribute_names(&self, id: NodeId) -> Vec<String> {
        self.attrs(id).iter().map(|a| self.qualified_name(a.name)).collect()
    }

    /// Attribute value by qualified name (`getAttribute`)
    pub fn attribute(&self, id: NodeId, qualified: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| self.qualified_name(a.name) == qualified)
            .map(|a| a.value.as_str())
    }

    /// Attribute value by namespace and local name (`getAttributeNS`)
    pub fn attribute_ns(&self, id: NodeId, namespace: &str, local: &str) -> Option<&str> {
        let ns = self.interner.lookup(namespace)?;
        let local = self.interner.lookup(local)?;
        self.element(id)?.attr_ns(ns, local).map(|a| a.value.as_str())
    }

    /// Set an attribute by qualified name without namespace processing
    /// (`setAttribute`). An existing attribute of that qualified name keeps
    /// its namespace; a new one gets no namespace and the whole name as
    /// local name.
    pub fn set_attribute(&mut self, id: NodeId, qualified: &str, value: &str) -> DomResult<()> {
        let existing = self
            .attrs(id)
            .iter()
            .position(|a| self.qualified_name(a.name) == qualified);
        let local = self.intern(qualified);
        let element = self.element_mut(id)?;
        match existing {
            Some(index) => element.attrs[index].value = value.to_string(),
            None => element.attrs.push(Attribute {
                name: QualName::new(InternedString::EMPTY, local),
                value: value.to_string(),
            }),
        }
        Ok(())
    }

    /// Remove an attribute by qualified name (`removeAttribute`)
    pub fn remove_attribute(&mut self, id: NodeId, qualified: &str) -> DomResult<bool> {
        let existing = self
            .attrs(id)
            .iter()
            .position(|a| self.qualified_name(a.name) == qualified);
        let element = self.element_mut(id)?;
        Ok(match existing {
            Some(index) => {
                element.attrs.remove(index);
                true
            }
            None => false,
        })
    }

    /// Set a namespaced attribute (`setAttributeNS`)
    pub fn set_attribute_ns(
        &mut self,
        id: NodeId,
        namespace: &str,
        qualified: &str,
        value: &str,
    ) -> DomResult<()> {
        let name = self.qual_name(namespace, qualified);
        self.element_mut(id)?.set_attr(name, value.to_string());
        Ok(())
    }

    /// Remove a namespaced attribute (`removeAttributeNS`)
    pub fn remove_attribute_ns(&mut self, id: NodeId, namespace: &str, local: &str) -> DomResult<bool> {
        let ns = self.intern(namespace);
        let local = self.intern(local);
        Ok(self.element_mut(id)?.remove_attr_ns(ns, local).is_some())
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(Node::as_text)
    }

    /// Replace the data of a text node
    pub fn set_text(&mut self, id: NodeId, content: &str) -> DomResult<()> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(text) => {
                text.content = content.to_string();
                Ok(())
            }
            _ => Err(DomError::NotFound(id)),
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.text(id) {
            out.push_str(text);
            return;
        }
        for (child, _) in self.children(id) {
            self.collect_text(child, out);
        }
    }

    // ------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------

    /// The first element child of the document node
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .find(|(_, node)| node.is_element())
            .map(|(id, _)| id)
    }

    /// Namespace of the document element; new elements default to it
    pub fn default_namespace(&self) -> &str {
        self.document_element()
            .and_then(|id| self.namespace_uri(id))
            .unwrap_or("")
    }

    /// Deep-copy `node` from `source` into this tree, returning the detached
    /// copy. Names are re-interned.
    pub fn import_node(&mut self, source: &DomTree, node: NodeId) -> DomResult<NodeId> {
        let data = match &source.node(node)?.data {
            NodeData::Element(element) => {
                let name = self.reintern(source, element.name);
                let mut copy = ElementData::new(name);
                for attr in &element.attrs {
                    copy.attrs.push(Attribute {
                        name: self.reintern(source, attr.name),
                        value: attr.value.clone(),
                    });
                }
                NodeData::Element(copy)
            }
            other => other.clone(),
        };
        let copy = self.push_node(Node::from_data(data));
        tracing::trace!("Imported {} as {}", node, copy);
        for child in source.child_ids(node) {
            let child_copy = self.import_node(source, child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    fn reintern(&mut self, source: &DomTree, name: QualName) -> QualName {
        QualName::with_prefix(
            self.intern(source.resolve(name.ns)),
            self.intern(source.resolve(name.prefix)),
            self.intern(source.resolve(name.local)),
        )
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.to_option()?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
