//! Rule configuration compiler
//!
//! Rules are authored two-way: one entry per data tag, describing how the
//! element is written to data (`to_data`) and how it is rendered back
//! (`to_view`). [`parse_rule_set_configurations`] turns a custom and a default
//! configuration into the two one-way [`FilterRuleSet`]s.
//!
//! Layering is hierarchical: a custom rule for the same tag wraps the default
//! one and reaches it through `parent_rule`. Several data tags may render to
//! the same view tag; their `to_view` rules are kept apart by origin and all
//! run, one after another, when that view tag is encountered.

use std::collections::HashMap;

use crate::FilterRuleSet;
use crate::rule::{
    ElementFilterRule, TextFilterRule, chain_element_rules, chain_text_rules, sequence_element_rules,
};

/// `to_view` part of an element entry
#[derive(Clone)]
pub enum ElementToView {
    /// Render back to the same tag
    Same(ElementFilterRule),
    /// Render to other tags: target tag to rule
    Targets(Vec<(String, ElementFilterRule)>),
}

/// Two-way configuration of one element entry
#[derive(Clone, Default)]
pub struct ElementFilterRuleConfig {
    pub to_data: Option<ElementFilterRule>,
    pub to_view: Option<ElementToView>,
}

impl ElementFilterRuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_to_data(mut self, rule: ElementFilterRule) -> Self {
        self.to_data = Some(rule);
        self
    }

    pub fn with_to_view(mut self, rule: ElementFilterRule) -> Self {
        self.to_view = Some(ElementToView::Same(rule));
        self
    }

    /// Add a `to_view` rule for another target tag
    pub fn with_to_view_target(mut self, target: impl Into<String>, rule: ElementFilterRule) -> Self {
        let target = target.into();
        match &mut self.to_view {
            Some(ElementToView::Targets(targets)) => targets.push((target, rule)),
            _ => self.to_view = Some(ElementToView::Targets(vec![(target, rule)])),
        }
        self
    }
}

/// A bare rule is a `to_data` rule
impl From<ElementFilterRule> for ElementFilterRuleConfig {
    fn from(rule: ElementFilterRule) -> Self {
        Self::new().with_to_data(rule)
    }
}

/// Two-way configuration of the text rule
#[derive(Clone, Default)]
pub struct TextFilterRuleConfig {
    pub to_data: Option<TextFilterRule>,
    pub to_view: Option<TextFilterRule>,
}

impl TextFilterRuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_to_data(mut self, rule: TextFilterRule) -> Self {
        self.to_data = Some(rule);
        self
    }

    pub fn with_to_view(mut self, rule: TextFilterRule) -> Self {
        self.to_view = Some(rule);
        self
    }
}

impl From<TextFilterRule> for TextFilterRuleConfig {
    fn from(rule: TextFilterRule) -> Self {
        Self::new().with_to_data(rule)
    }
}

/// Two-way rule configuration, keyed by lower-case data tag (or one of the
/// reserved keys `^`, `$`, `$$`)
#[derive(Clone, Default)]
pub struct FilterRuleSetConfiguration {
    pub elements: Vec<(String, ElementFilterRuleConfig)>,
    pub text: Option<TextFilterRuleConfig>,
}

impl FilterRuleSetConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, key: impl Into<String>, config: impl Into<ElementFilterRuleConfig>) -> Self {
        self.elements.push((key.into(), config.into()));
        self
    }

    pub fn with_text(mut self, config: impl Into<TextFilterRuleConfig>) -> Self {
        self.text = Some(config.into());
        self
    }
}

/// The compiled pair of one-way rule sets
#[derive(Debug, Clone, Default)]
pub struct ParsedFilterRuleSet {
    pub to_data: FilterRuleSet,
    pub to_view: FilterRuleSet,
}

/// Where a `to_view` rule came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleOrigin {
    /// The data tag whose `to_data` rule this `to_view` rule reverts
    Tag(String),
    /// `to_view`-only entry, without a `to_data` rule for its key
    Unbound,
}

/// `to_view` rules per target tag, then per origin, in insertion order
#[derive(Default)]
struct ToViewBuckets {
    targets: Vec<(String, Vec<(RuleOrigin, ElementFilterRule)>)>,
}

impl ToViewBuckets {
    fn add(&mut self, target: &str, origin: RuleOrigin, rule: ElementFilterRule) {
        let index = match self.targets.iter().position(|(t, _)| t == target) {
            Some(index) => index,
            None => {
                self.targets.push((target.to_string(), Vec::new()));
                self.targets.len() - 1
            }
        };
        let buckets = &mut self.targets[index].1;
        match buckets.iter_mut().find(|(o, _)| *o == origin) {
            Some(bucket) => bucket.1 = chain_element_rules(bucket.1.clone(), rule),
            None => buckets.push((origin, rule)),
        }
    }

    fn into_rules(self) -> HashMap<String, ElementFilterRule> {
        self.targets
            .into_iter()
            .map(|(target, buckets)| {
                let rules = buckets.into_iter().map(|(_, rule)| rule).collect();
                (target, sequence_element_rules(rules))
            })
            .collect()
    }
}

#[derive(Default)]
struct Compiler {
    to_data: HashMap<String, ElementFilterRule>,
    to_data_text: Option<TextFilterRule>,
    to_view: ToViewBuckets,
    to_view_text: Option<TextFilterRule>,
}

impl Compiler {
    fn add(&mut self, config: &FilterRuleSetConfiguration) {
        for (key, entry) in &config.elements {
            if let Some(rule) = &entry.to_data {
                let rule = match self.to_data.remove(key) {
                    Some(parent) => chain_element_rules(parent, rule.clone()),
                    None => rule.clone(),
                };
                self.to_data.insert(key.clone(), rule);
            }
            // a key with a `to_data` rule in any layer is the origin of its
            // `to_view` rules
            let origin = if self.to_data.contains_key(key) {
                RuleOrigin::Tag(key.clone())
            } else {
                RuleOrigin::Unbound
            };
            match &entry.to_view {
                Some(ElementToView::Same(rule)) => self.to_view.add(key, origin, rule.clone()),
                Some(ElementToView::Targets(targets)) => {
                    for (target, rule) in targets {
                        self.to_view.add(target, origin.clone(), rule.clone());
                    }
                }
                None => {}
            }
        }

        if let Some(text) = &config.text {
            self.to_data_text = chain_text(self.to_data_text.take(), text.to_data.clone());
            self.to_view_text = chain_text(self.to_view_text.take(), text.to_view.clone());
        }
    }

    fn finish(self) -> ParsedFilterRuleSet {
        ParsedFilterRuleSet {
            to_data: FilterRuleSet {
                elements: self.to_data,
                text: self.to_data_text,
            },
            to_view: FilterRuleSet {
                elements: self.to_view.into_rules(),
                text: self.to_view_text,
            },
        }
    }
}

fn chain_text(parent: Option<TextFilterRule>, child: Option<TextFilterRule>) -> Option<TextFilterRule> {
    match (parent, child) {
        (Some(parent), Some(child)) => Some(chain_text_rules(parent, child)),
        (parent, child) => child.or(parent),
    }
}

/// Compile `custom` layered over `default` into `to_data` and `to_view`
/// rule sets
pub fn parse_rule_set_configurations(
    custom: Option<&FilterRuleSetConfiguration>,
    default: Option<&FilterRuleSetConfiguration>,
) -> ParsedFilterRuleSet {
    let mut compiler = Compiler::default();
    for config in [default, custom].into_iter().flatten() {
        compiler.add(config);
    }
    let parsed = compiler.finish();
    tracing::debug!(
        "Compiled rules: {} to_data, {} to_view element rule(s)",
        parsed.to_data.elements.len(),
        parsed.to_view.elements.len()
    );
    parsed
}
