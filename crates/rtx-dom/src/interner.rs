//! String Interner - Deduplicate strings to save memory
//!
//! Tag names, attribute names, prefixes and namespace URIs repeat a lot in
//! rich text documents. They are stored once and referenced by ID.

use std::collections::HashMap;

/// Interned string ID - just 4 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct InternedString(pub u32);

impl InternedString {
    /// Empty string (also used for "no namespace" and "no prefix")
    pub const EMPTY: InternedString = InternedString(0);

    /// Check if this is the empty string
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// String interner for deduplicating strings
#[derive(Debug, Clone)]
pub struct StringInterner {
    strings: Vec<Box<str>>,
    map: HashMap<Box<str>, u32>,
}

impl StringInterner {
    /// Create a new string interner with common rich text names pre-interned
    pub fn new() -> Self {
        let mut interner = Self {
            strings: Vec::with_capacity(128),
            map: HashMap::with_capacity(128),
        };

        // Pre-intern empty string at index 0
        interner.intern("");

        const COMMON: &[&str] = &[
            "html", "head", "body", "div", "span", "p", "a", "img", "br",
            "ul", "ol", "li", "table", "tbody", "tr", "td", "th",
            "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote",
            "strong", "em", "b", "i", "u", "s", "sub", "sup",
            "class", "id", "href", "src", "alt", "title", "lang", "dir",
            "xmlns", "xlink", "xml",
            crate::ns::XHTML, crate::ns::XLINK, crate::ns::XML, crate::ns::XMLNS,
        ];

        for s in COMMON {
            interner.intern(s);
        }

        interner
    }

    /// Intern a string, returning its ID
    /// If the string is already interned, returns the existing ID
    pub fn intern(&mut self, s: &str) -> InternedString {
        if let Some(&idx) = self.map.get(s) {
            return InternedString(idx);
        }

        let idx = self.strings.len() as u32;
        self.strings.push(s.into());
        self.map.insert(s.into(), idx);
        InternedString(idx)
    }

    /// Look up a string without interning it
    pub fn lookup(&self, s: &str) -> Option<InternedString> {
        self.map.get(s).map(|&idx| InternedString(idx))
    }

    /// Get the string for an interned ID
    #[inline]
    pub fn get(&self, id: InternedString) -> &str {
        self.strings.get(id.0 as usize).map(|s| &**s).unwrap_or("")
    }

    /// Number of interned strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
