//! ClassList - token list over the `class` attribute
//!
//! Holds no tokens itself. Every call re-reads the current `class` value of
//! the proxy (pending or live), so writes through the attribute API are seen
//! immediately.

use crate::{ElementProxy, FilterError};

const CLASS: &str = "class";

/// `DOMTokenList`-like view over an element's `class` attribute
pub struct ClassList<'p, 't> {
    proxy: &'p mut ElementProxy<'t>,
}

impl<'p, 't> ClassList<'p, 't> {
    pub(crate) fn new(proxy: &'p mut ElementProxy<'t>) -> Self {
        Self { proxy }
    }

    /// Raw attribute value, not normalized
    pub fn value(&self) -> &str {
        self.proxy.attribute(CLASS).unwrap_or_default()
    }

    fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = Vec::new();
        for token in self.value().split_whitespace() {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }

    pub fn len(&self) -> usize {
        self.tokens().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Token at `index`
    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens().get(index).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens().contains(&token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens().into_iter()
    }

    /// Add tokens that are not present yet
    pub fn add(&mut self, tokens: &[&str]) -> Result<(), FilterError> {
        self.validate("add to class list", tokens)?;
        let mut current = self.owned_tokens();
        for token in tokens {
            if !current.iter().any(|t| t == token) {
                current.push(token.to_string());
            }
        }
        self.write(current)
    }

    /// Remove tokens; absent ones are ignored
    pub fn remove(&mut self, tokens: &[&str]) -> Result<(), FilterError> {
        self.validate("remove from class list", tokens)?;
        let mut current = self.owned_tokens();
        current.retain(|t| !tokens.contains(&t.as_str()));
        self.write(current)
    }

    /// Toggle a token, or force it on/off. Returns whether it is present
    /// afterwards.
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> Result<bool, FilterError> {
        self.validate("toggle class", &[token])?;
        let present = self.contains(token);
        let wanted = force.unwrap_or(!present);
        if wanted {
            self.add(&[token])?;
        } else {
            self.remove(&[token])?;
        }
        Ok(wanted)
    }

    /// Replace `token` by `new_token` at its position. Returns `false` if
    /// `token` was not present; nothing is written then.
    pub fn replace(&mut self, token: &str, new_token: &str) -> Result<bool, FilterError> {
        self.validate("replace class", &[token, new_token])?;
        let mut current = self.owned_tokens();
        let Some(index) = current.iter().position(|t| t == token) else {
            return Ok(false);
        };
        if current.iter().any(|t| t == new_token) {
            current.remove(index);
        } else {
            current[index] = new_token.to_string();
        }
        self.write(current)?;
        Ok(true)
    }

    fn owned_tokens(&self) -> Vec<String> {
        self.tokens().into_iter().map(str::to_string).collect()
    }

    /// Check mutability and every token before anything is written
    fn validate(&self, operation: &'static str, tokens: &[&str]) -> Result<(), FilterError> {
        self.proxy.require_mutable(operation)?;
        let invalid: Vec<String> = tokens
            .iter()
            .filter(|t| t.is_empty() || t.chars().any(char::is_whitespace))
            .map(|t| t.to_string())
            .collect();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(FilterError::InvalidToken { tokens: invalid })
        }
    }

    fn write(&mut self, tokens: Vec<String>) -> Result<(), FilterError> {
        if tokens.is_empty() && !self.proxy.has_attribute(CLASS) {
            return Ok(());
        }
        self.proxy.set_attribute(CLASS, tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamespaceTable;
    use rtx_dom::{DomTree, NodeId};

    fn element(class: Option<&str>) -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let el = tree.create_element_ns("", "el");
        tree.append_child(tree.root(), el).unwrap();
        if let Some(class) = class {
            tree.set_attribute(el, "class", class).unwrap();
        }
        (tree, el)
    }

    #[test]
    fn test_value_is_raw() {
        let (mut tree, el) = element(Some("  a  b a "));
        let namespaces = NamespaceTable::default();
        let mut proxy = ElementProxy::new(&mut tree, el, &namespaces);
        let list = proxy.class_list();
        assert_eq!(list.value(), "  a  b a ");
        assert_eq!(list.len(), 2);
        assert_eq!(list.item(1), Some("b"));
        assert!(list.contains("a"));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_add_normalizes_on_write() {
        let (mut tree, el) = element(Some(" a  a "));
        let namespaces = NamespaceTable::default();
        let mut proxy = ElementProxy::new(&mut tree, el, &namespaces);
        proxy.class_list().add(&["b", "a"]).unwrap();
        assert_eq!(proxy.attribute("class"), Some("a b"));
    }

    #[test]
    fn test_invalid_tokens_leave_class_untouched() {
        let (mut tree, el) = element(Some("x"));
        let namespaces = NamespaceTable::default();
        let mut proxy = ElementProxy::new(&mut tree, el, &namespaces);

        let err = proxy.class_list().add(&["ok", "a b", ""]).unwrap_err();
        assert_eq!(err, FilterError::InvalidToken { tokens: vec!["a b".into(), "".into()] });
        assert!(proxy.class_list().remove(&["x", ""]).is_err());
        assert!(proxy.class_list().toggle("a\tb", None).is_err());
        assert!(proxy.class_list().replace("x", "y z").is_err());

        assert_eq!(proxy.attribute("class"), Some("x"));
        assert!(proxy.attribute_names().contains(&"class".to_string()));
    }

    #[test]
    fn test_toggle_and_force() {
        let (mut tree, el) = element(None);
        let namespaces = NamespaceTable::default();
        let mut proxy = ElementProxy::new(&mut tree, el, &namespaces);
        let mut list = proxy.class_list();

        assert!(list.toggle("on", None).unwrap());
        assert!(!list.toggle("on", None).unwrap());
        assert!(list.toggle("forced", Some(true)).unwrap());
        assert!(list.toggle("forced", Some(true)).unwrap());
        assert!(!list.toggle("absent", Some(false)).unwrap());
        assert_eq!(list.value(), "forced");
    }

    #[test]
    fn test_replace() {
        let (mut tree, el) = element(Some("a b c"));
        let namespaces = NamespaceTable::default();
        let mut proxy = ElementProxy::new(&mut tree, el, &namespaces);
        let mut list = proxy.class_list();

        assert!(list.replace("b", "x").unwrap());
        assert_eq!(list.value(), "a x c");
        assert!(!list.replace("missing", "y").unwrap());
        assert!(list.replace("a", "c").unwrap());
        assert_eq!(list.value(), "x c");
    }

    #[test]
    fn test_remove_without_class_writes_nothing() {
        let (mut tree, el) = element(None);
        let namespaces = NamespaceTable::default();
        let mut proxy = ElementProxy::new(&mut tree, el, &namespaces);
        proxy.class_list().remove(&["a"]).unwrap();
        assert!(!proxy.has_attribute("class"));
        assert!(proxy.attribute_names().is_empty());
    }

    #[test]
    fn test_sees_attribute_writes() {
        let (mut tree, el) = element(Some("a"));
        let namespaces = NamespaceTable::default();
        let mut proxy = ElementProxy::new(&mut tree, el, &namespaces);
        proxy.set_attribute("class", "b c").unwrap();
        assert!(proxy.class_list().contains("c"));
        proxy.delete_attribute("class").unwrap();
        assert!(proxy.class_list().is_empty());
    }

    #[test]
    fn test_immutable_rejects_mutation() {
        let (tree, el) = element(Some("a"));
        let namespaces = NamespaceTable::default();
        let mut proxy = ElementProxy::immutable(&tree, el, &namespaces);
        let err = proxy.class_list().add(&["b"]).unwrap_err();
        assert!(matches!(err, FilterError::ImmutableProxy { .. }));
        assert_eq!(proxy.class_list().value(), "a");
    }
}
