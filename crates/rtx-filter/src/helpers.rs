//! Building blocks for rule authors

use rtx_dom::NodeType;

use crate::rule::{ElementFilterRule, element_rule};
use crate::{ElementProxy, FilterError};

/// Collapse `aliases` into the `target` attribute.
///
/// `target` is consulted first, then the aliases in order; the first value
/// found wins. Differing values of later candidates are dropped with a
/// warning. All aliases are deleted. Returns the resulting value.
pub fn resolve_attribute_aliases(
    node: &mut ElementProxy<'_>,
    target: &str,
    aliases: &[&str],
) -> Result<Option<String>, FilterError> {
    let mut resolved: Option<String> = None;
    for key in std::iter::once(target).chain(aliases.iter().copied()) {
        let Some(value) = node.attribute(key) else {
            continue;
        };
        let Some(first) = resolved.as_deref() else {
            resolved = Some(value.to_string());
            continue;
        };
        if first != value {
            tracing::warn!(
                "Ambiguous values for attribute {} on <{}>: keeping {:?}, dropping {}={:?}",
                target,
                node.name(),
                first,
                key,
                value
            );
        }
    }

    for alias in aliases {
        if *alias != target {
            node.delete_attribute(alias)?;
        }
    }
    if let Some(value) = &resolved {
        node.set_attribute(target, value.clone())?;
    }
    Ok(resolved)
}

/// Rule renaming every matched element to `name`
pub fn rename_to(name: impl Into<String>) -> ElementFilterRule {
    let name = name.into();
    element_rule(move |params| params.node.set_name(&name))
}

/// Rule removing every matched element with its subtree
pub fn remove_element() -> ElementFilterRule {
    element_rule(|params| params.node.set_remove(true))
}

/// Rule replacing every matched element by its children
pub fn unwrap_element() -> ElementFilterRule {
    element_rule(|params| params.node.set_replace_by_children(true))
}

/// Rule removing the element if it has no element children and no
/// non-whitespace text. Meant for `$$`, after children were filtered.
pub fn remove_if_empty() -> ElementFilterRule {
    element_rule(|params| {
        let empty = params.node.is_empty_by(|tree, child| match tree.node_type(child) {
            Some(NodeType::Text) => tree.text(child).is_some_and(|t| !t.trim().is_empty()),
            Some(NodeType::Element) => true,
            _ => false,
        });
        if empty {
            params.node.set_remove(true)?;
        }
        Ok(())
    })
}
