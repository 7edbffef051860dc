//! DOM Node - Compact representation
//!
//! - Uses NodeId (4 bytes) instead of pointers for tree links
//! - Names are interned; an element or attribute name is three IDs

use crate::{InternedString, NodeId};

/// Qualified name: namespace URI, prefix and local name, all interned.
///
/// An empty namespace means "no namespace", an empty prefix means
/// "unprefixed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualName {
    pub ns: InternedString,
    pub prefix: InternedString,
    pub local: InternedString,
}

impl QualName {
    /// Unprefixed name in the given namespace
    pub fn new(ns: InternedString, local: InternedString) -> Self {
        Self { ns, prefix: InternedString::EMPTY, local }
    }

    /// Prefixed name in the given namespace
    pub fn with_prefix(ns: InternedString, prefix: InternedString, local: InternedString) -> Self {
        Self { ns, prefix, local }
    }
}

/// DOM node types the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Doctype,
    Element,
    Text,
    Comment,
    ProcessingInstruction,
}

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn unlinked(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(name: QualName) -> Self {
        Self::unlinked(NodeData::Element(ElementData::new(name)))
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self::unlinked(NodeData::Text(TextData { content }))
    }

    /// Create a new comment node
    pub fn comment(content: String) -> Self {
        Self::unlinked(NodeData::Comment(content))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::unlinked(NodeData::Document)
    }

    /// Create a node from arbitrary data
    pub fn from_data(data: NodeData) -> Self {
        Self::unlinked(data)
    }

    /// Node type of this node
    pub fn node_type(&self) -> NodeType {
        match &self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Doctype { .. } => NodeType::Doctype,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    /// Element
    Element(ElementData),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
    /// Processing instruction
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name (qualified)
    pub name: QualName,
    /// Attributes in document order
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(name: QualName) -> Self {
        Self { name, attrs: Vec::new() }
    }

    /// Find an attribute by namespace and local name
    pub fn attr_ns(&self, ns: InternedString, local: InternedString) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name.ns == ns && a.name.local == local)
    }

    /// Set an attribute, matching an existing one by namespace and local name
    pub fn set_attr(&mut self, name: QualName, value: String) {
        for attr in self.attrs.iter_mut() {
            if attr.name.ns == name.ns && attr.name.local == name.local {
                attr.name.prefix = name.prefix;
                attr.value = value;
                return;
            }
        }
        self.attrs.push(Attribute { name, value });
    }

    /// Remove an attribute by namespace and local name
    pub fn remove_attr_ns(&mut self, ns: InternedString, local: InternedString) -> Option<Attribute> {
        let index = self.attrs.iter().position(|a| a.name.ns == ns && a.name.local == local)?;
        Some(self.attrs.remove(index))
    }
}

/// Text node data
#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}

/// Attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}
