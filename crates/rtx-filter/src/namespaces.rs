//! Namespace table for attribute persistence
//!
//! Maps attribute prefixes to namespace URIs. Only prefixes found here are
//! namespace-resolved when a `prefix:local` attribute is persisted; any other
//! prefix is kept as part of a plain attribute name.

use std::sync::LazyLock;

use rtx_dom::ns;

/// Shared default table, used by read-only proxies
pub(crate) static DEFAULT_NAMESPACES: LazyLock<NamespaceTable> = LazyLock::new(NamespaceTable::default);

/// Prefix → namespace URI table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTable {
    entries: Vec<(String, String)>,
}

impl NamespaceTable {
    /// A table without any prefix, not even the XML defaults
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register (or re-bind) a prefix
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let prefix = prefix.into();
        let uri = uri.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = uri,
            None => self.entries.push((prefix, uri)),
        }
    }

    /// Builder variant of [`insert`](Self::insert)
    pub fn with(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.insert(prefix, uri);
        self
    }

    /// Namespace URI registered for a prefix
    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.uri(prefix).is_some()
    }

    /// Iterate `(prefix, uri)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }
}

impl Default for NamespaceTable {
    /// `xlink`, `xml` and `xmlns` bound to their standard URIs
    fn default() -> Self {
        Self::empty()
            .with("xlink", ns::XLINK)
            .with("xml", ns::XML)
            .with("xmlns", ns::XMLNS)
    }
}
