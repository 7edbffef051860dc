//! Well-known namespace URIs

/// XHTML namespace (html5ever puts every HTML element here)
pub const XHTML: &str = "http://www.w3.org/1999/xhtml";

/// XLink namespace
pub const XLINK: &str = "http://www.w3.org/1999/xlink";

/// The `xml:` prefix namespace
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// The `xmlns:` prefix namespace
pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";

/// Split a qualified name into `(prefix, local)`.
///
/// Only the first colon separates; a name starting or ending with a colon has
/// no usable prefix and is returned unsplit.
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}
