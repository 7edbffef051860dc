//! Processor Configuration

use rtx_filter::NamespaceTable;

/// Namespace of the data format
pub const RICHTEXT_NAMESPACE: &str = "http://www.coremedia.com/2003/richtext-1.0";

/// Data processor configuration options
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Element wrapping every data document
    pub data_root: String,

    /// Namespace of data elements
    pub data_namespace: String,

    /// Prefixes resolved when attributes are persisted
    pub namespaces: NamespaceTable,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            data_root: "div".to_string(),
            data_namespace: RICHTEXT_NAMESPACE.to_string(),
            namespaces: NamespaceTable::default(),
        }
    }
}
