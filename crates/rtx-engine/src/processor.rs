//! DataProcessor - view/data conversion
//!
//! `to_data` parses an HTML fragment, moves it below a data root element and
//! runs the `to_data` rules. Elements end up in the data namespace because
//! every element whose namespace differs from the document's is recreated
//! when its proxy is persisted. `to_view` does the same the other way round,
//! with an HTML `<body>` as container.

use std::any::Any;

use rtx_dom::{DomError, DomTree, NodeId};
use rtx_filter::{FilterError, FilterRuleSet, FilterRuleSetConfiguration, HtmlFilter, ParsedFilterRuleSet};
use rtx_markup::MarkupError;

use crate::ProcessorConfig;

/// Converts between the HTML view and the XML data representation
pub struct DataProcessor {
    config: ProcessorConfig,
    rules: ParsedFilterRuleSet,
}

impl DataProcessor {
    /// Create a processor from compiled rules
    pub fn new(config: ProcessorConfig, rules: ParsedFilterRuleSet) -> Self {
        tracing::debug!(
            "Data processor for <{}> in {} initialized",
            config.data_root,
            config.data_namespace
        );
        Self { config, rules }
    }

    /// Compile `custom` over `default` and create a processor
    pub fn from_configurations(
        config: ProcessorConfig,
        custom: Option<&FilterRuleSetConfiguration>,
        default: Option<&FilterRuleSetConfiguration>,
    ) -> Self {
        Self::new(config, rtx_filter::parse_rule_set_configurations(custom, default))
    }

    /// Get processor configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn rules(&self) -> &ParsedFilterRuleSet {
        &self.rules
    }

    /// Convert an HTML view fragment to a data document
    pub fn to_data(&self, view: &str) -> Result<String, ProcessorError> {
        self.to_data_with_context(view, &())
    }

    /// [`to_data`](Self::to_data), handing `context` to every rule
    pub fn to_data_with_context(&self, view: &str, context: &dyn Any) -> Result<String, ProcessorError> {
        let (view_tree, body) = rtx_markup::parse_html_fragment(view)?;

        let mut data = DomTree::new();
        let root = data.create_element_ns(&self.config.data_namespace, &self.config.data_root);
        data.append_child(data.root(), root)?;
        import_children(&mut data, root, &view_tree, body)?;

        self.filter(&self.rules.to_data, context)
            .apply_to(&mut data, root)?;
        let xml = rtx_markup::outer_xml(&data, root);
        tracing::debug!("to_data: {} bytes view -> {} bytes data", view.len(), xml.len());
        Ok(xml)
    }

    /// Convert a data document to an HTML view fragment
    pub fn to_view(&self, data: &str) -> Result<String, ProcessorError> {
        self.to_view_with_context(data, &())
    }

    /// [`to_view`](Self::to_view), handing `context` to every rule
    pub fn to_view_with_context(&self, data: &str, context: &dyn Any) -> Result<String, ProcessorError> {
        if data.trim().is_empty() {
            return Ok(String::new());
        }
        let data_tree = rtx_markup::parse_xml(data)?;
        let root = data_tree.document_element().ok_or(ProcessorError::MissingRoot)?;

        let (mut view, body) = rtx_markup::parse_html_fragment("")?;
        import_children(&mut view, body, &data_tree, root)?;

        self.filter(&self.rules.to_view, context)
            .apply_to(&mut view, body)?;
        let html = rtx_markup::inner_html(&view, body);
        tracing::debug!("to_view: {} bytes data -> {} bytes view", data.len(), html.len());
        Ok(html)
    }

    fn filter<'r>(&'r self, rules: &'r FilterRuleSet, context: &'r dyn Any) -> HtmlFilter<'r> {
        HtmlFilter::new(rules)
            .with_namespaces(self.config.namespaces.clone())
            .with_context(context)
    }
}

/// Deep-copy the children of `source_parent` below `parent`
fn import_children(
    tree: &mut DomTree,
    parent: NodeId,
    source: &DomTree,
    source_parent: NodeId,
) -> Result<(), DomError> {
    for child in source.child_ids(source_parent) {
        let copy = tree.import_node(source, child)?;
        tree.append_child(parent, copy)?;
    }
    Ok(())
}

/// Processor error
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Data document has no root element")]
    MissingRoot,
}
