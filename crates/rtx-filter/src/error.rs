//! Filter errors

use rtx_dom::DomError;

/// Errors raised by proxies, rules and filter passes.
///
/// Any error returned by a rule aborts the whole pass; the tree is left as
/// far as mutation had progressed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// A mutating operation was called on a read-only proxy
    #[error("Cannot {operation}: node proxy is immutable")]
    ImmutableProxy { operation: &'static str },

    /// A class token was empty or contained whitespace
    #[error("Invalid class token(s): {}", format_tokens(.tokens))]
    InvalidToken { tokens: Vec<String> },

    /// Persisting buffered changes failed
    #[error("DOM error while persisting: {0}")]
    Dom(#[from] DomError),

    /// A rule gave up on its own account
    #[error("Rule failed: {0}")]
    Rule(String),
}

impl FilterError {
    /// Convenience constructor for rule authors
    pub fn rule(message: impl Into<String>) -> Self {
        Self::Rule(message.into())
    }
}

fn format_tokens(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| format!("{t:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}
