//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{Buffer, ColorChoice, StandardStream};
use thiserror::Error;

use super::Span;
use crate::token::Token;
use crate::types::{StorageClass, TagKind};

/// Why two types describing the same entity could not be folded together
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("conflicting storage classes '{existing}' and '{new}'")]
    StorageClass {
        existing: StorageClass,
        new: StorageClass,
    },

    #[error("'{existing}' is incompatible with '{new}'")]
    Incompatible { existing: String, new: String },

    #[error("cannot combine '{existing}' with '{new}' in declaration specifiers")]
    Specifier { existing: String, new: String },

    #[error("conflicting or repeated signedness specifiers")]
    Sign,

    #[error("'{existing}' tag used as '{new}'")]
    TagKind { existing: TagKind, new: TagKind },

    #[error("redefinition of a complete {tag}")]
    TagRedefinition { tag: TagKind },
}

/// Declaration-semantic error with source location
///
/// None of these stop an analysis run; the symbol tables stay usable
/// after any of them is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemaError {
    #[error("incompatible redeclaration of '{name}': {cause}")]
    Redeclaration {
        name: String,
        span: Span,
        previous: Span,
        #[source]
        cause: MergeError,
    },

    #[error("redefinition of tag '{name}'")]
    DuplicateTag {
        name: String,
        span: Span,
        previous: Span,
    },

    #[error("duplicate member '{name}'")]
    DuplicateMember {
        name: String,
        span: Span,
        previous: Span,
    },

    #[error("duplicate label '{name}'")]
    DuplicateLabel {
        name: String,
        span: Span,
        previous: Span,
    },

    #[error("label '{name}' used but not defined")]
    UndefinedLabel { name: String, span: Span },

    #[error("'{name}' undeclared")]
    Undeclared { name: String, span: Span },

    #[error("no type specifier in declaration of '{name}'")]
    UnresolvedAbstract { name: String, span: Span },

    #[error("cannot declare a {found}")]
    NotDeclarable { found: String },

    #[error("cannot leave block {depth}: linkage and compilation unit scopes are permanent")]
    ScopeUnderflow { depth: usize },

    #[error("no block at level {level} (current block is {current})")]
    InvalidFrame { level: usize, current: usize },
}

impl SemaError {
    /// Error for a redeclaration that failed to merge with `previous`
    pub fn redeclaration(token: &Token, previous: &Token, cause: MergeError) -> Self {
        Self::Redeclaration {
            name: token.name().to_string(),
            span: token.span(),
            previous: previous.span(),
            cause,
        }
    }

    /// The same error raised in the tag namespace, where a second complete
    /// body is a tag redefinition
    pub fn in_tag_namespace(self) -> Self {
        match self {
            Self::Redeclaration {
                name,
                span,
                previous,
                cause: MergeError::TagRedefinition { .. },
            } => Self::DuplicateTag { name, span, previous },
            other => other,
        }
    }

    pub fn undeclared(token: &Token) -> Self {
        Self::Undeclared {
            name: token.name().to_string(),
            span: token.span(),
        }
    }

    /// Location the error points at, if it has one
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Redeclaration { span, .. }
            | Self::DuplicateTag { span, .. }
            | Self::DuplicateMember { span, .. }
            | Self::DuplicateLabel { span, .. }
            | Self::UndefinedLabel { span, .. }
            | Self::Undeclared { span, .. }
            | Self::UnresolvedAbstract { span, .. } => Some(*span),
            Self::NotDeclarable { .. } | Self::ScopeUnderflow { .. } | Self::InvalidFrame { .. } => None,
        }
    }

    /// Location of the earlier declaration this error conflicts with
    pub fn previous(&self) -> Option<Span> {
        match self {
            Self::Redeclaration { previous, .. }
            | Self::DuplicateTag { previous, .. }
            | Self::DuplicateMember { previous, .. }
            | Self::DuplicateLabel { previous, .. } => Some(*previous),
            _ => None,
        }
    }
}

pub type SemaResult<T> = Result<T, SemaError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    fn diagnostic(file_id: usize, error: &SemaError) -> Diagnostic<usize> {
        let title = match error {
            SemaError::Redeclaration { .. } => "incompatible redeclaration",
            SemaError::DuplicateTag { .. } => "tag redefinition",
            SemaError::DuplicateMember { .. } => "duplicate member",
            SemaError::DuplicateLabel { .. } => "duplicate label",
            SemaError::UndefinedLabel { .. } => "undefined label",
            SemaError::Undeclared { .. } => "undeclared identifier",
            SemaError::UnresolvedAbstract { .. } => "missing type specifier",
            SemaError::NotDeclarable { .. }
            | SemaError::ScopeUnderflow { .. }
            | SemaError::InvalidFrame { .. } => {
                return Diagnostic::error().with_message(error.to_string());
            }
        };

        let mut labels = Vec::new();
        if let Some(span) = error.span() {
            labels.push(Label::primary(file_id, span.range()).with_message(error.to_string()));
        }
        if let Some(previous) = error.previous() {
            labels.push(Label::secondary(file_id, previous.range()).with_message("previous declaration here"));
        }

        Diagnostic::error().with_message(title).with_labels(labels)
    }

    pub fn report_error(&self, file_id: usize, error: &SemaError) {
        let diagnostic = Self::diagnostic(file_id, error);
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, &diagnostic);
    }

    /// Render an error without colors, as it would appear on the terminal
    pub fn render(&self, file_id: usize, error: &SemaError) -> String {
        let diagnostic = Self::diagnostic(file_id, error);
        let mut buffer = Buffer::no_color();
        if term::emit(&mut buffer, &self.config, &self.files, &diagnostic).is_err() {
            return error.to_string();
        }
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
