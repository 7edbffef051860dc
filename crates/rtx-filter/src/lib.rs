//! rtx Filter - rule-driven tree rewriting
//!
//! Rewrites a [`DomTree`](rtx_dom::DomTree) in place by applying per-tag and
//! per-text rules. Rules never touch the tree directly: they work on proxies
//! that buffer renames, attribute changes, text changes and structural
//! decisions, which are persisted after each rule.
//!
//! ```ignore
//! let rules = FilterRuleSet::new().with_element("b", rename_to("strong"));
//! HtmlFilter::new(&rules).apply_to(&mut tree, body)?;
//! ```

mod class_list;
mod element_proxy;
mod error;
mod filter;
mod helpers;
mod namespaces;
mod node_proxy;
mod rule;
mod rules;
mod text_proxy;

pub use class_list::ClassList;
pub use element_proxy::{AttributeMap, ElementProxy};
pub use error::FilterError;
pub use filter::{AFTER_CHILDREN, AFTER_ELEMENT, BEFORE_ELEMENT, FilterOptions, FilterRuleSet, HtmlFilter};
pub use helpers::{remove_element, remove_if_empty, rename_to, resolve_attribute_aliases, unwrap_element};
pub use namespaces::NamespaceTable;
pub use node_proxy::{NodeProxy, NodeState, Persist, PersistResponse};
pub use rule::{
    ElementFilterParams, ElementFilterRule, ElementRuleFn, TextFilterParams, TextFilterRule, TextRuleFn,
    chain_element_rules, chain_text_rules, element_rule, sequence_element_rules, text_rule,
};
pub use rules::{
    ElementFilterRuleConfig, ElementToView, FilterRuleSetConfiguration, ParsedFilterRuleSet, RuleOrigin,
    TextFilterRuleConfig, parse_rule_set_configurations,
};
pub use text_proxy::TextProxy;
