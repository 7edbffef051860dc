//! rtx markup
//!
//! Parses HTML (html5ever) and XML (xml5ever) into an [`rtx_dom::DomTree`]
//! and serializes trees back to text. The filter engine itself never parses
//! or serializes; callers do that around a filter pass.

mod parser;
mod serializer;

pub use parser::{HtmlParser, XmlParser};
pub use serializer::{HtmlSerializer, XmlSerializer};

use rtx_dom::{DomError, DomTree, NodeId};

/// Parse a complete HTML document
pub fn parse_html(html: &str) -> Result<DomTree, MarkupError> {
    HtmlParser::new().parse(html)
}

/// Parse an HTML fragment; returns the tree and the `<body>` holding the
/// fragment's nodes
pub fn parse_html_fragment(html: &str) -> Result<(DomTree, NodeId), MarkupError> {
    HtmlParser::new().parse_fragment(html)
}

/// Parse an XML document
pub fn parse_xml(xml: &str) -> Result<DomTree, MarkupError> {
    XmlParser::new().parse(xml)
}

/// Serialize the children of `node` as HTML
pub fn inner_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node)
}

/// Serialize `node` and its subtree as HTML
pub fn outer_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node)
}

/// Serialize `node` and its subtree as XML
pub fn outer_xml(tree: &DomTree, node: NodeId) -> String {
    XmlSerializer::new().serialize_outer(tree, node)
}

/// Serialize a whole tree as XML (without declaration)
pub fn to_xml(tree: &DomTree) -> String {
    XmlSerializer::new().serialize_outer(tree, tree.root())
}

/// Markup errors
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("Failed to read markup: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOM error while building tree: {0}")]
    Dom(#[from] DomError),

    #[error("Parsed document has no <{0}> element")]
    MissingElement(&'static str),
}
