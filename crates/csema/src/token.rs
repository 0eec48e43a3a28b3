//! Identifier tokens handed over by the lexer

use std::fmt;

use crate::common::Span;

/// An identifier as it appeared in the source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    name: String,
    span: Span,
}

impl Token {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Token for a name that has no place in the source, such as an
    /// implicitly declared function
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self::new(name, Span::default())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
