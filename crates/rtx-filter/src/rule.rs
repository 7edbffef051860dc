//! Filter rules and their composition
//!
//! A rule mutates the pending state of one proxy. It receives the proxy, the
//! opaque filter context and a `parent_rule` it may call explicitly; layering
//! rules is done once, at compile time, with [`chain_element_rules`] and
//! [`sequence_element_rules`] (and their text counterparts).

use std::any::Any;
use std::rc::Rc;

use crate::{ElementProxy, FilterError, TextProxy};

/// Signature of an element rule
pub type ElementRuleFn<'f> = dyn Fn(&mut ElementFilterParams<'_, '_>) -> Result<(), FilterError> + 'f;

/// Signature of a text rule
pub type TextRuleFn<'f> = dyn Fn(&mut TextFilterParams<'_, '_>) -> Result<(), FilterError> + 'f;

/// A compiled, shareable element rule
pub type ElementFilterRule = Rc<ElementRuleFn<'static>>;

/// A compiled, shareable text rule
pub type TextFilterRule = Rc<TextRuleFn<'static>>;

/// Arguments handed to an element rule
pub struct ElementFilterParams<'p, 't> {
    /// The element being filtered
    pub node: &'p mut ElementProxy<'t>,
    /// Opaque handle passed through from the filter
    pub context: &'p dyn Any,
    parent_rule: &'p ElementRuleFn<'p>,
}

impl<'p, 't> ElementFilterParams<'p, 't> {
    pub(crate) fn new(
        node: &'p mut ElementProxy<'t>,
        context: &'p dyn Any,
        parent_rule: &'p ElementRuleFn<'p>,
    ) -> Self {
        Self { node, context, parent_rule }
    }

    /// Run the rule this one was layered over. Not calling it skips the
    /// parent's effect entirely.
    ///
    /// The parent sees a no-op as its own `parent_rule`; a parent that is a
    /// chain itself supplies its own layer below.
    pub fn parent_rule(&mut self) -> Result<(), FilterError> {
        let parent = self.parent_rule;
        let mut params = ElementFilterParams::new(&mut *self.node, self.context, &noop_element_rule);
        parent(&mut params)
    }

    /// Downcast the filter context
    pub fn context_as<T: Any>(&self) -> Option<&T> {
        self.context.downcast_ref()
    }
}

/// Arguments handed to a text rule
pub struct TextFilterParams<'p, 't> {
    /// The text node being filtered
    pub node: &'p mut TextProxy<'t>,
    /// Opaque handle passed through from the filter
    pub context: &'p dyn Any,
    parent_rule: &'p TextRuleFn<'p>,
}

impl<'p, 't> TextFilterParams<'p, 't> {
    pub(crate) fn new(
        node: &'p mut TextProxy<'t>,
        context: &'p dyn Any,
        parent_rule: &'p TextRuleFn<'p>,
    ) -> Self {
        Self { node, context, parent_rule }
    }

    /// Run the rule this one was layered over
    pub fn parent_rule(&mut self) -> Result<(), FilterError> {
        let parent = self.parent_rule;
        let mut params = TextFilterParams::new(&mut *self.node, self.context, &noop_text_rule);
        parent(&mut params)
    }

    /// Downcast the filter context
    pub fn context_as<T: Any>(&self) -> Option<&T> {
        self.context.downcast_ref()
    }
}

/// Wrap a closure as an element rule
pub fn element_rule<F>(f: F) -> ElementFilterRule
where
    F: Fn(&mut ElementFilterParams<'_, '_>) -> Result<(), FilterError> + 'static,
{
    Rc::new(f)
}

/// Wrap a closure as a text rule
pub fn text_rule<F>(f: F) -> TextFilterRule
where
    F: Fn(&mut TextFilterParams<'_, '_>) -> Result<(), FilterError> + 'static,
{
    Rc::new(f)
}

/// Pin a borrowed closure to the element rule signature
pub(crate) fn scoped_element_rule<'f, F>(f: F) -> F
where
    F: Fn(&mut ElementFilterParams<'_, '_>) -> Result<(), FilterError> + 'f,
{
    f
}

pub(crate) fn noop_element_rule(_: &mut ElementFilterParams<'_, '_>) -> Result<(), FilterError> {
    Ok(())
}

pub(crate) fn noop_text_rule(_: &mut TextFilterParams<'_, '_>) -> Result<(), FilterError> {
    Ok(())
}

/// Layer `child` over `parent`: only `child` runs, seeing `parent` as its
/// `parent_rule`.
pub fn chain_element_rules(parent: ElementFilterRule, child: ElementFilterRule) -> ElementFilterRule {
    element_rule(move |params| {
        let mut scoped = ElementFilterParams::new(&mut *params.node, params.context, &*parent);
        child(&mut scoped)
    })
}

/// Layer `child` over `parent` for text rules
pub fn chain_text_rules(parent: TextFilterRule, child: TextFilterRule) -> TextFilterRule {
    text_rule(move |params| {
        let mut scoped = TextFilterParams::new(&mut *params.node, params.context, &*parent);
        child(&mut scoped)
    })
}

/// Run independent rules one after another on the same node
pub fn sequence_element_rules(mut rules: Vec<ElementFilterRule>) -> ElementFilterRule {
    if rules.len() == 1 {
        return rules.remove(0);
    }
    element_rule(move |params| {
        for rule in &rules {
            rule(&mut *params)?;
        }
        Ok(())
    })
}
