//! HTML and XML serialization
//!
//! - HTML: void elements, raw text elements, HTML escaping
//! - XML: self-closing empty elements, and namespace declarations emitted
//!   wherever the tree uses a namespace that is not yet in scope

use rtx_dom::{DomTree, NodeData, NodeId, ns};

/// HTML serializer
#[derive(Debug, Default)]
pub struct HtmlSerializer;

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl HtmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output);
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                self.serialize_children(tree, node_id, output);
            }
            NodeData::Element(elem) => {
                let tag = tree.qualified_name(elem.name);
                let is_void = VOID_ELEMENTS.contains(&tag.as_str());
                let is_raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());

                output.push('<');
                output.push_str(&tag);

                for attr in elem.attrs.iter() {
                    output.push(' ');
                    output.push_str(&tree.qualified_name(attr.name));
                    output.push_str("=\"");
                    escape_attribute(&attr.value, output);
                    output.push('"');
                }

                output.push('>');
                if is_void {
                    return;
                }

                if is_raw {
                    for (_, child) in tree.children(node_id) {
                        if let Some(text) = child.as_text() {
                            output.push_str(text);
                        }
                    }
                } else {
                    self.serialize_children(tree, node_id, output);
                }

                output.push_str("</");
                output.push_str(&tag);
                output.push('>');
            }
            NodeData::Text(text) => {
                escape_text(&text.content, output);
            }
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype { name, .. } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                output.push('>');
            }
            NodeData::ProcessingInstruction { target, data } => {
                push_processing_instruction(target, data, output);
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String) {
        for (child_id, _) in tree.children(parent_id) {
            self.serialize_node(tree, child_id, output);
        }
    }
}

/// XML serializer
#[derive(Debug, Default)]
pub struct XmlSerializer;

/// Namespace bindings visible at the current element
#[derive(Clone)]
struct Scope<'a> {
    default_ns: String,
    prefixes: Vec<(String, &'a str)>,
}

impl Scope<'_> {
    fn prefix_bound_to(&self, prefix: &str, uri: &str) -> bool {
        matches!(prefix, "xml" | "xmlns")
            || self.prefixes.iter().rev().find(|(p, _)| p == prefix).map(|(_, u)| *u) == Some(uri)
    }
}

impl XmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize the children of a node
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        let scope = Scope { default_ns: inherited_default_ns(tree, node_id, true), prefixes: Vec::new() };
        for (child, _) in tree.children(node_id) {
            self.serialize_node(tree, child, &scope, &mut output);
        }
        output
    }

    /// Serialize a node including itself
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        let scope = Scope { default_ns: inherited_default_ns(tree, node_id, false), prefixes: Vec::new() };
        self.serialize_node(tree, node_id, &scope, &mut output);
        output
    }

    fn serialize_node<'a>(&self, tree: &'a DomTree, node_id: NodeId, scope: &Scope<'a>, output: &mut String) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                for (child, _) in tree.children(node_id) {
                    self.serialize_node(tree, child, scope, output);
                }
            }
            NodeData::Element(elem) => {
                let mut scope = scope.clone();
                let mut declarations: Vec<(String, String)> = Vec::new();
                let mut declared_here: Vec<String> = Vec::new();

                // explicit declarations carried as attributes
                for attr in &elem.attrs {
                    let name = tree.qualified_name(attr.name);
                    if name == "xmlns" {
                        scope.default_ns = attr.value.clone();
                    } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                        scope.prefixes.push((prefix.to_string(), attr.value.as_str()));
                    } else {
                        continue;
                    }
                    declared_here.push(name);
                }

                let tag = tree.qualified_name(elem.name);
                let element_ns = tree.resolve(elem.name.ns);
                if elem.name.prefix.is_empty() {
                    if scope.default_ns != element_ns && !declared_here.iter().any(|d| d == "xmlns") {
                        declarations.push(("xmlns".to_string(), element_ns.to_string()));
                        scope.default_ns = element_ns.to_string();
                    }
                } else {
                    let prefix = tree.resolve(elem.name.prefix);
                    let declaration = format!("xmlns:{prefix}");
                    if !scope.prefix_bound_to(prefix, element_ns) && !declared_here.contains(&declaration) {
                        declarations.push((declaration, element_ns.to_string()));
                        scope.prefixes.push((prefix.to_string(), element_ns));
                    }
                }
                for attr in &elem.attrs {
                    if attr.name.prefix.is_empty() {
                        continue;
                    }
                    let prefix = tree.resolve(attr.name.prefix);
                    let uri = tree.resolve(attr.name.ns);
                    let declaration = format!("xmlns:{prefix}");
                    if !uri.is_empty()
                        && uri != ns::XMLNS
                        && !scope.prefix_bound_to(prefix, uri)
                        && !declared_here.contains(&declaration)
                        && !declarations.iter().any(|(d, _)| *d == declaration)
                    {
                        declarations.push((declaration, uri.to_string()));
                        scope.prefixes.push((prefix.to_string(), uri));
                    }
                }

                output.push('<');
                output.push_str(&tag);
                for attr in &elem.attrs {
                    output.push(' ');
                    output.push_str(&tree.qualified_name(attr.name));
                    output.push_str("=\"");
                    escape_attribute(&attr.value, output);
                    output.push('"');
                }
                for (name, value) in &declarations {
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    escape_attribute(value, output);
                    output.push('"');
                }

                if !node.first_child.is_valid() {
                    output.push_str("/>");
                    return;
                }
                output.push('>');
                for (child, _) in tree.children(node_id) {
                    self.serialize_node(tree, child, &scope, output);
                }
                output.push_str("</");
                output.push_str(&tag);
                output.push('>');
            }
            NodeData::Text(text) => escape_text(&text.content, output),
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype { name, .. } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                output.push('>');
            }
            NodeData::ProcessingInstruction { target, data } => {
                push_processing_instruction(target, data, output);
            }
        }
    }
}

/// Default namespace in scope where serialization starts
fn inherited_default_ns(tree: &DomTree, node_id: NodeId, include_self: bool) -> String {
    let start = if include_self { Some(node_id) } else { tree.parent(node_id) };
    let mut current = start;
    while let Some(id) = current {
        if let Some(elem) = tree.element(id) {
            if elem.name.prefix.is_empty() {
                return tree.resolve(elem.name.ns).to_string();
            }
        }
        current = tree.parent(id);
    }
    String::new()
}

fn push_processing_instruction(target: &str, data: &str, output: &mut String) {
    output.push_str("<?");
    output.push_str(target);
    if !data.is_empty() {
        output.push(' ');
        output.push_str(data);
    }
    output.push_str("?>");
}

/// Escape text content
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}
