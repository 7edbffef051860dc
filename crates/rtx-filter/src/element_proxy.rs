//! ElementProxy - buffered rename and attribute changes
//!
//! Reads merge the pending overrides with the live element; writes only touch
//! the overrides. On persist the overrides are written to the element, or the
//! element is replaced when its name or namespace has to change.

use std::any::Any;
use std::ops::{Deref, DerefMut};

use rtx_dom::{DomResult, DomTree, NodeId, ns};

use crate::rule::{ElementFilterParams, ElementRuleFn, noop_element_rule};
use crate::{ClassList, FilterError, NamespaceTable, NodeProxy, Persist, PersistResponse};

/// Attribute name that selects the namespace of a replacement element
const XMLNS: &str = "xmlns";

/// Pending attribute writes in insertion order. `None` marks a deletion.
#[derive(Debug, Clone, Default)]
pub(crate) struct AttributeOverrides {
    entries: Vec<(String, Option<String>)>,
}

impl AttributeOverrides {
    /// `Some(None)` for a tombstone, `None` if the key was never touched
    pub(crate) fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub(crate) fn set(&mut self, key: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Mutation buffer for one element
#[derive(Debug)]
pub struct ElementProxy<'t> {
    node: NodeProxy<'t>,
    namespaces: &'t NamespaceTable,
    name: Option<String>,
    attributes: AttributeOverrides,
    replacement: Option<NodeId>,
}

impl<'t> ElementProxy<'t> {
    /// Mutable proxy for the element `delegate`
    pub fn new(tree: &'t mut DomTree, delegate: NodeId, namespaces: &'t NamespaceTable) -> Self {
        Self::wrap(NodeProxy::new(tree, delegate), namespaces)
    }

    /// Read-only proxy for the element `delegate`
    pub fn immutable(tree: &'t DomTree, delegate: NodeId, namespaces: &'t NamespaceTable) -> Self {
        Self::wrap(NodeProxy::immutable(tree, delegate), namespaces)
    }

    fn wrap(node: NodeProxy<'t>, namespaces: &'t NamespaceTable) -> Self {
        Self {
            node,
            namespaces,
            name: None,
            attributes: AttributeOverrides::default(),
            replacement: None,
        }
    }

    // ------------------------------------------------------------------
    // Name
    // ------------------------------------------------------------------

    /// Pending name, else the lower-cased live tag name
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.live_name(),
        }
    }

    /// Buffer a rename. The element is replaced on persist.
    pub fn set_name(&mut self, name: &str) -> Result<(), FilterError> {
        self.node.require_mutable("set name")?;
        self.name = Some(name.to_lowercase());
        Ok(())
    }

    fn live_name(&self) -> String {
        self.tree()
            .tag_name(self.delegate())
            .unwrap_or_default()
            .to_lowercase()
    }

    /// The element that replaced the original one, once persisted
    pub fn replacement(&self) -> Option<NodeId> {
        self.replacement
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Attribute facade with `get`/`set`/`delete`/`has`/`keys`
    pub fn attributes(&mut self) -> AttributeMap<'_, 't> {
        AttributeMap { proxy: self }
    }

    /// Token list view over the `class` attribute
    pub fn class_list(&mut self) -> ClassList<'_, 't> {
        ClassList::new(self)
    }

    /// Current value: pending override (a deletion reads as `None`), else
    /// the live attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(value) => value,
            None => self.tree().attribute(self.delegate(), key),
        }
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) -> Result<(), FilterError> {
        self.node.require_mutable("set attribute")?;
        self.attributes.set(key, Some(value.into()));
        Ok(())
    }

    /// Mark an attribute for removal
    pub fn delete_attribute(&mut self, key: &str) -> Result<(), FilterError> {
        self.node.require_mutable("delete attribute")?;
        self.attributes.set(key, None);
        Ok(())
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    /// Live names in document order, then newly added names. Deleted
    /// attributes are left out.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tree()
            .attribute_names(self.delegate())
            .into_iter()
            .filter(|name| !matches!(self.attributes.get(name), Some(None)))
            .collect();
        for (key, value) in self.attributes.iter() {
            if value.is_some() && !names.iter().any(|n| n == key) {
                names.push(key.to_string());
            }
        }
        names
    }

    // ------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------

    /// Run `rules` in order, persisting after each one.
    ///
    /// Returns the node the walk has to resume at, or `None` to continue
    /// with the sibling captured before the visit.
    pub fn apply_rules(
        &mut self,
        rules: &[&ElementRuleFn<'_>],
        context: &dyn Any,
    ) -> Result<Option<NodeId>, FilterError> {
        for rule in rules {
            let mut params = ElementFilterParams::new(self, context, &noop_element_rule);
            rule(&mut params)?;
            match self.persist_to_dom()? {
                PersistResponse::Continue => {}
                PersistResponse::Abort => return Ok(None),
                PersistResponse::RestartFrom(node) => return Ok(Some(node)),
            }
        }
        Ok(self.replacement.and_then(|node| self.tree().next_sibling(node)))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    fn persist_attributes(&mut self) -> Result<PersistResponse, FilterError> {
        let delegate = self.delegate();
        let tree = self.tree();
        let foreign = tree.namespace_uri(delegate).unwrap_or("") != tree.default_namespace();
        if foreign || matches!(self.attributes.get(XMLNS), Some(Some(_))) {
            let name = self.name();
            return self.persist_replace_by(&name, None);
        }
        if self.attributes.is_empty() {
            return Ok(PersistResponse::Continue);
        }

        let pending: Vec<(String, Option<String>)> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect();
        let namespaces = self.namespaces;
        apply_attributes(self.node.tree_mut()?, delegate, &pending, namespaces)?;
        Ok(PersistResponse::Continue)
    }

    /// Replace the element by a new one named `new_name`, carrying over the
    /// merged attributes and all children.
    ///
    /// The namespace is `namespace`, else a pending `xmlns` value, else the
    /// default namespace of the document.
    pub fn persist_replace_by(
        &mut self,
        new_name: &str,
        namespace: Option<&str>,
    ) -> Result<PersistResponse, FilterError> {
        self.node.require_mutable("replace element")?;
        let old = self.delegate();
        let namespace = match namespace {
            Some(uri) => uri.to_string(),
            None => match self.attributes.get(XMLNS) {
                Some(Some(uri)) => uri.to_string(),
                _ => self.tree().default_namespace().to_string(),
            },
        };
        let entries: Vec<(String, Option<String>)> = self
            .attribute_names()
            .into_iter()
            .map(|key| {
                let value = self.attribute(&key).map(str::to_string);
                (key, value)
            })
            .collect();

        let namespaces = self.namespaces;
        let tree = self.node.tree_mut()?;
        let replacement = tree.create_element_ns(&namespace, new_name);
        apply_attributes(tree, replacement, &entries, namespaces)?;
        for child in tree.child_ids(old) {
            tree.append_child(replacement, child)?;
        }
        if let Some(parent) = tree.parent(old) {
            tree.replace_child(parent, replacement, old)?;
        }
        tracing::trace!("Replaced {} by <{}> {} in {:?}", old, new_name, replacement, namespace);

        self.node.set_delegate(replacement);
        self.replacement = Some(replacement);
        Ok(PersistResponse::Continue)
    }
}

impl<'t> Persist<'t> for ElementProxy<'t> {
    fn node_proxy(&self) -> &NodeProxy<'t> {
        &self.node
    }

    fn node_proxy_mut(&mut self) -> &mut NodeProxy<'t> {
        &mut self.node
    }

    fn persist_keep_or_replace(&mut self) -> Result<PersistResponse, FilterError> {
        let response = match self.name.take() {
            Some(name) if name != self.live_name() => self.persist_replace_by(&name, None)?,
            _ => self.persist_attributes()?,
        };
        // committed; later reads see the live values
        self.attributes.clear();
        Ok(response)
    }
}

impl<'t> Deref for ElementProxy<'t> {
    type Target = NodeProxy<'t>;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

impl DerefMut for ElementProxy<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.node
    }
}

/// Map-like view over an element's attributes.
///
/// Lookup goes through the pending overrides first (a deletion counts as
/// an override) and falls back to the live element.
pub struct AttributeMap<'p, 't> {
    proxy: &'p mut ElementProxy<'t>,
}

impl AttributeMap<'_, '_> {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.proxy.attribute(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), FilterError> {
        self.proxy.set_attribute(key, value)
    }

    /// Tombstone the key; distinct from never having touched it
    pub fn delete(&mut self, key: &str) -> Result<(), FilterError> {
        self.proxy.delete_attribute(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.proxy.has_attribute(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.proxy.attribute_names()
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}

/// Write attribute entries to `element`.
///
/// Keys of the form `prefix:local` with a prefix from `namespaces` are set
/// namespace-aware and their prefix is declared on the document element.
/// Any other key is a plain attribute name, colon included. `xmlns` is
/// skipped; it selects the element namespace instead.
pub(crate) fn apply_attributes(
    tree: &mut DomTree,
    element: NodeId,
    entries: &[(String, Option<String>)],
    namespaces: &NamespaceTable,
) -> DomResult<()> {
    for (key, value) in entries {
        if key == XMLNS {
            continue;
        }
        let (prefix, local) = ns::split_qualified(key);
        match prefix.and_then(|p| namespaces.uri(p).map(|uri| (p, uri))) {
            Some((prefix, uri)) => match value {
                Some(value) => {
                    tree.set_attribute_ns(element, uri, key, value)?;
                    publish_namespace(tree, prefix, uri)?;
                }
                None => {
                    tree.remove_attribute_ns(element, uri, local)?;
                }
            },
            None => match value {
                Some(value) => tree.set_attribute(element, key, value)?,
                None => {
                    tree.remove_attribute(element, key)?;
                }
            },
        }
    }
    Ok(())
}

/// Declare `xmlns:prefix` on the document element unless already declared.
/// Declarations are never removed again.
fn publish_namespace(tree: &mut DomTree, prefix: &str, uri: &str) -> DomResult<()> {
    if prefix == "xml" || prefix == XMLNS {
        return Ok(());
    }
    let Some(root) = tree.document_element() else {
        return Ok(());
    };
    let declaration = format!("{XMLNS}:{prefix}");
    if tree.attribute_ns(root, ns::XMLNS, prefix).is_some() || tree.attribute(root, &declaration).is_some() {
        return Ok(());
    }
    tracing::trace!("Declaring namespace prefix {} = {}", prefix, uri);
    tree.set_attribute_ns(root, ns::XMLNS, &declaration, uri)
}
