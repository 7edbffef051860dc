//! HTML5 / XML parser implementation
//!
//! Uses the servo parsers' RcDom and converts it to our arena DOM. Unlike a
//! rendering engine we keep whitespace-only text: the filter must see the
//! document exactly as authored.

use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use rtx_dom::{DomResult, DomTree, Node, NodeData, NodeId};

use crate::MarkupError;

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML document
    pub fn parse(&self, html: &str) -> Result<DomTree, MarkupError> {
        tracing::debug!("Parsing HTML document ({} bytes)", html.len());

        let dom = html5ever::parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut tree = DomTree::new();
        convert_node(&dom.document, &mut tree, NodeId::ROOT)?;

        tracing::debug!("Parsed {} nodes", tree.len());
        Ok(tree)
    }

    /// Parse an HTML fragment. The fragment ends up as the children of the
    /// returned `<body>` element.
    pub fn parse_fragment(&self, html: &str) -> Result<(DomTree, NodeId), MarkupError> {
        let tree = self.parse(html)?;
        let body = tree
            .document_element()
            .and_then(|root| {
                tree.children(root)
                    .find(|(id, _)| tree.local_name(*id) == Some("body"))
                    .map(|(id, _)| id)
            })
            .ok_or(MarkupError::MissingElement("body"))?;
        Ok((tree, body))
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// XML parser
pub struct XmlParser;

impl XmlParser {
    /// Create a new XML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse an XML document
    pub fn parse(&self, xml: &str) -> Result<DomTree, MarkupError> {
        tracing::debug!("Parsing XML document ({} bytes)", xml.len());

        let dom = xml5ever::driver::parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut xml.as_bytes())?;

        let mut tree = DomTree::new();
        convert_node(&dom.document, &mut tree, NodeId::ROOT)?;

        tracing::debug!("Parsed {} nodes", tree.len());
        Ok(tree)
    }
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an RcDom node to our DOM format
fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId) -> DomResult<()> {
    match &handle.data {
        RcNodeData::Document => {
            for child in handle.children.borrow().iter() {
                convert_node(child, tree, parent)?;
            }
        }
        RcNodeData::Doctype { name, public_id, system_id } => {
            let id = tree.push_node(Node::from_data(NodeData::Doctype {
                name: name.to_string(),
                public_id: public_id.to_string(),
                system_id: system_id.to_string(),
            }));
            tree.append_child(parent, id)?;
        }
        RcNodeData::Text { contents } => {
            let id = tree.create_text(&contents.borrow());
            tree.append_child(parent, id)?;
        }
        RcNodeData::Comment { contents } => {
            let id = tree.create_comment(contents);
            tree.append_child(parent, id)?;
        }
        RcNodeData::ProcessingInstruction { target, contents } => {
            let id = tree.push_node(Node::from_data(NodeData::ProcessingInstruction {
                target: target.to_string(),
                data: contents.to_string(),
            }));
            tree.append_child(parent, id)?;
        }
        RcNodeData::Element { name, attrs, .. } => {
            let id = tree.create_element_ns(&name.ns, &qualified(name));

            for attr in attrs.borrow().iter() {
                let name = qualified(&attr.name);
                if attr.name.ns.is_empty() {
                    // HTML keeps `foo:bar` as one plain name
                    tree.set_attribute(id, &name, &attr.value)?;
                } else {
                    tree.set_attribute_ns(id, &attr.name.ns, &name, &attr.value)?;
                }
            }

            tree.append_child(parent, id)?;

            for child in handle.children.borrow().iter() {
                convert_node(child, tree, id)?;
            }
        }
    }
    Ok(())
}

fn qualified(name: &html5ever::QualName) -> String {
    match &name.prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, name.local),
        _ => name.local.to_string(),
    }
}
