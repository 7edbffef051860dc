//! HtmlFilter - rule-driven tree walker
//!
//! Visits the children of a root depth-first. Every element and text node is
//! wrapped in a proxy, its rules are applied and the walk continues at the
//! node the proxy reports, falling back to the sibling captured before the
//! visit.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use rtx_dom::{DomTree, NodeId, NodeType};

use crate::rule::{ElementFilterRule, ElementRuleFn, TextFilterRule, scoped_element_rule};
use crate::{ElementProxy, FilterError, NamespaceTable, TextProxy};

/// Rule key applied to every element before its tag rule
pub const BEFORE_ELEMENT: &str = "^";

/// Rule key applied to every element after its tag rule, before children
pub const AFTER_ELEMENT: &str = "$";

/// Rule key applied to every element after its children were filtered
pub const AFTER_CHILDREN: &str = "$$";

/// One-way rules as consumed by [`HtmlFilter`]
#[derive(Clone, Default)]
pub struct FilterRuleSet {
    /// Lower-case tag name (or reserved key) to rule
    pub elements: HashMap<String, ElementFilterRule>,
    /// Rule for every text node
    pub text: Option<TextFilterRule>,
}

impl FilterRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, key: impl Into<String>, rule: ElementFilterRule) -> Self {
        self.elements.insert(key.into(), rule);
        self
    }

    pub fn with_text(mut self, rule: TextFilterRule) -> Self {
        self.text = Some(rule);
        self
    }

    pub fn element(&self, key: &str) -> Option<&ElementFilterRule> {
        self.elements.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.text.is_none()
    }
}

impl fmt::Debug for FilterRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.elements.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("FilterRuleSet")
            .field("elements", &keys)
            .field("text", &self.text.is_some())
            .finish()
    }
}

/// Filter options
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Prefixes resolved when `prefix:local` attributes are persisted
    pub namespaces: NamespaceTable,
}

/// Applies a [`FilterRuleSet`] to a tree in place
pub struct HtmlFilter<'r> {
    rules: &'r FilterRuleSet,
    options: FilterOptions,
    context: &'r dyn Any,
}

impl<'r> HtmlFilter<'r> {
    pub fn new(rules: &'r FilterRuleSet) -> Self {
        Self {
            rules,
            options: FilterOptions::default(),
            context: &(),
        }
    }

    /// Opaque value handed to every rule
    pub fn with_context(mut self, context: &'r dyn Any) -> Self {
        self.context = context;
        self
    }

    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_namespaces(mut self, namespaces: NamespaceTable) -> Self {
        self.options.namespaces = namespaces;
        self
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Filter all descendants of `root`. `root` itself is not visited.
    ///
    /// The first rule error aborts the pass; the tree keeps every change
    /// persisted up to that point.
    pub fn apply_to(&self, tree: &mut DomTree, root: NodeId) -> Result<(), FilterError> {
        tracing::debug!(
            "Filtering below {} with {} element rule(s), text rule: {}",
            root,
            self.rules.elements.len(),
            self.rules.text.is_some()
        );
        self.apply_to_child_nodes(tree, root)
    }

    fn apply_to_child_nodes(&self, tree: &mut DomTree, parent: NodeId) -> Result<(), FilterError> {
        let mut current = tree.first_child(parent);
        while let Some(node) = current {
            current = self.apply_to_current(tree, parent, node)?;
        }
        Ok(())
    }

    /// Visit one node and return the next node to visit
    fn apply_to_current(
        &self,
        tree: &mut DomTree,
        parent: NodeId,
        current: NodeId,
    ) -> Result<Option<NodeId>, FilterError> {
        // rules may detach `current`
        let next = tree.next_sibling(current);
        tracing::trace!("Visiting {} in {}", current, parent);

        let restart = match tree.node_type(current) {
            Some(NodeType::Element) => self.apply_to_element(tree, current)?,
            Some(NodeType::Text) => self.apply_to_text(tree, current)?,
            _ => None,
        };
        if let Some(node) = restart {
            tracing::trace!("Restarting at {}", node);
        }
        Ok(restart.or(next))
    }

    fn apply_to_element(&self, tree: &mut DomTree, element: NodeId) -> Result<Option<NodeId>, FilterError> {
        let mut proxy = ElementProxy::new(tree, element, &self.options.namespaces);
        let name = proxy.name();

        // follows a replacement: the delegate is read when the rule runs
        let children = scoped_element_rule(|params| {
            let element = params.node.delegate();
            self.apply_to_child_nodes(params.node.tree_mut()?, element)
        });

        let mut rules: Vec<&ElementRuleFn<'_>> = Vec::with_capacity(5);
        for key in [BEFORE_ELEMENT, name.as_str(), AFTER_ELEMENT] {
            if let Some(rule) = self.rules.elements.get(key) {
                rules.push(&**rule);
            }
        }
        rules.push(&children);
        if let Some(rule) = self.rules.elements.get(AFTER_CHILDREN) {
            rules.push(&**rule);
        }

        proxy.apply_rules(&rules, self.context)
    }

    fn apply_to_text(&self, tree: &mut DomTree, text: NodeId) -> Result<Option<NodeId>, FilterError> {
        let Some(rule) = &self.rules.text else {
            return Ok(None);
        };
        let mut proxy = TextProxy::new(tree, text);
        proxy.apply_rules(&[&**rule], self.context)
    }
}

impl fmt::Debug for HtmlFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlFilter")
            .field("rules", self.rules)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
