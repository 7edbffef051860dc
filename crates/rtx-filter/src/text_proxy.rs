//! TextProxy - buffered text content

use std::any::Any;
use std::ops::{Deref, DerefMut};

use rtx_dom::{DomTree, NodeId};

use crate::rule::{TextFilterParams, TextRuleFn, noop_text_rule};
use crate::{FilterError, NodeProxy, Persist, PersistResponse};

/// Mutation buffer for one text node
#[derive(Debug)]
pub struct TextProxy<'t> {
    node: NodeProxy<'t>,
    text: Option<String>,
}

impl<'t> TextProxy<'t> {
    pub fn new(tree: &'t mut DomTree, delegate: NodeId) -> Self {
        Self { node: NodeProxy::new(tree, delegate), text: None }
    }

    pub fn immutable(tree: &'t DomTree, delegate: NodeId) -> Self {
        Self { node: NodeProxy::immutable(tree, delegate), text: None }
    }

    /// Pending text, else the live text
    pub fn text_content(&self) -> &str {
        match &self.text {
            Some(text) => text.as_str(),
            None => self.tree().text(self.delegate()).unwrap_or_default(),
        }
    }

    pub fn set_text_content(&mut self, text: impl Into<String>) -> Result<(), FilterError> {
        self.node.require_mutable("set text content")?;
        self.text = Some(text.into());
        Ok(())
    }

    /// Run `rules` in order, persisting after each one. Stops at the first
    /// response that is not `Continue`.
    pub fn apply_rules(
        &mut self,
        rules: &[&TextRuleFn<'_>],
        context: &dyn Any,
    ) -> Result<Option<NodeId>, FilterError> {
        for rule in rules {
            let mut params = TextFilterParams::new(self, context, &noop_text_rule);
            rule(&mut params)?;
            let response = self.persist_to_dom()?;
            if let Some(restart) = response.restart() {
                return Ok(Some(restart));
            }
            if response.is_abort() {
                return Ok(None);
            }
        }
        Ok(None)
    }
}

impl<'t> Persist<'t> for TextProxy<'t> {
    fn node_proxy(&self) -> &NodeProxy<'t> {
        &self.node
    }

    fn node_proxy_mut(&mut self) -> &mut NodeProxy<'t> {
        &mut self.node
    }

    fn persist_keep_or_replace(&mut self) -> Result<PersistResponse, FilterError> {
        if let Some(text) = self.text.take() {
            let delegate = self.delegate();
            if self.tree().text(delegate) != Some(text.as_str()) {
                self.node.tree_mut()?.set_text(delegate, &text)?;
            }
        }
        Ok(PersistResponse::Continue)
    }
}

impl<'t> Deref for TextProxy<'t> {
    type Target = NodeProxy<'t>;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

impl DerefMut for TextProxy<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::text_rule;

    fn sample() -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let p = tree.create_element_ns("", "p");
        tree.append_child(tree.root(), p).unwrap();
        let text = tree.create_text("Lorem");
        tree.append_child(p, text).unwrap();
        (tree, p, text)
    }

    #[test]
    fn test_text_is_buffered() {
        let (mut tree, _, text) = sample();
        let mut proxy = TextProxy::new(&mut tree, text);
        proxy.set_text_content("Ipsum").unwrap();
        assert_eq!(proxy.text_content(), "Ipsum");
        assert_eq!(proxy.tree().text(text), Some("Lorem"));

        assert_eq!(proxy.persist_to_dom().unwrap(), PersistResponse::Continue);
        assert_eq!(tree.text(text), Some("Ipsum"));
    }

    #[test]
    fn test_rules_stop_after_removal() {
        let (mut tree, p, text) = sample();
        let remove = text_rule(|params| params.node.set_remove(true));
        let never = text_rule(|_| Err(FilterError::rule("must not run")));

        let mut proxy = TextProxy::new(&mut tree, text);
        let restart = proxy.apply_rules(&[&*remove, &*never], &()).unwrap();
        assert_eq!(restart, None);
        assert!(tree.first_child(p).is_none());
    }

    #[test]
    fn test_rules_run_in_order() {
        let (mut tree, _, text) = sample();
        let upper = text_rule(|params| {
            let upper = params.node.text_content().to_uppercase();
            params.node.set_text_content(upper)
        });
        let suffix = text_rule(|params| {
            let text = format!("{}!", params.node.text_content());
            params.node.set_text_content(text)
        });

        let mut proxy = TextProxy::new(&mut tree, text);
        proxy.apply_rules(&[&*upper, &*suffix], &()).unwrap();
        assert_eq!(tree.text(text), Some("LOREM!"));
    }

    #[test]
    fn test_immutable_rejects_text() {
        let (tree, _, text) = sample();
        let mut proxy = TextProxy::immutable(&tree, text);
        assert!(proxy.set_text_content("x").is_err());
        assert_eq!(proxy.text_content(), "Lorem");
    }
}
