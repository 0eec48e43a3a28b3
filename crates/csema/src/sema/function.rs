//! Function-wide label namespace
//!
//! Labels are visible throughout the function body that declares them,
//! regardless of block nesting, and `goto` may refer to a label before its
//! definition.

use std::collections::BTreeSet;

use log::debug;

use super::{Id, Stab};
use crate::common::{SemaError, SemaResult};
use crate::token::Token;
use crate::types::Type;

#[derive(Debug, Clone, Default)]
pub struct FunctionScope {
    labels: Stab,
    defined: BTreeSet<String>,
}

impl FunctionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new function body
    pub fn enter(&mut self) {
        self.clear();
    }

    /// Finish a function body, returning every label that was jumped to
    /// but never defined
    pub fn exit(&mut self) -> Vec<SemaError> {
        let undefined = self.undefined().collect();
        self.clear();
        undefined
    }

    fn clear(&mut self) {
        if !self.labels.is_empty() {
            debug!("clearing {} label(s)", self.labels.len());
        }
        self.labels.clear();
        self.defined.clear();
    }

    /// `name:` in the function body
    pub fn label_define(&mut self, token: &Token) -> SemaResult<()> {
        if self.defined.contains(token.name()) {
            let previous = self.labels.lookup(token.name()).map_or(token.span(), |id| id.token().span());
            return Err(SemaError::DuplicateLabel {
                name: token.name().to_string(),
                span: token.span(),
                previous,
            });
        }
        debug!("label {token} defined");
        self.defined.insert(token.name().to_string());
        // The entry points at the definition even if a goto came first
        self.labels.insert(Id::new(token.clone(), Type::label()));
        Ok(())
    }

    /// `goto name;` in the function body
    pub fn label_use(&mut self, token: &Token) -> Type {
        if let Some(id) = self.labels.lookup(token.name()) {
            return id.ty();
        }
        debug!("label {token} referenced before definition");
        let ty = Type::label();
        self.labels.insert(Id::new(token.clone(), ty.clone()));
        ty
    }

    pub fn lookup(&self, name: &str) -> Option<&Id> {
        self.labels.lookup(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    /// Every label mentioned in the current function
    pub fn labels(&self) -> &Stab {
        &self.labels
    }

    fn undefined(&self) -> impl Iterator<Item = SemaError> + '_ {
        self.labels
            .iter()
            .filter(|(name, _)| !self.defined.contains(*name))
            .map(|(name, id)| SemaError::UndefinedLabel {
                name: name.to_string(),
                span: id.token().span(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_forward_goto_then_definition() {
        let mut scope = FunctionScope::new();
        scope.enter();
        let used = scope.label_use(&Token::new("done", Span::new(10, 14)));
        assert!(used.is_label());
        assert!(!scope.is_defined("done"));

        scope.label_define(&Token::new("done", Span::new(40, 44))).unwrap();
        assert_eq!(scope.lookup("done").unwrap().token().span(), Span::new(40, 44));
        assert!(scope.exit().is_empty());
    }

    #[test]
    fn test_duplicate_label() {
        let mut scope = FunctionScope::new();
        scope.label_define(&Token::new("again", Span::new(0, 5))).unwrap();
        let err = scope.label_define(&Token::new("again", Span::new(20, 25))).unwrap_err();
        assert_eq!(
            err,
            SemaError::DuplicateLabel {
                name: "again".to_string(),
                span: Span::new(20, 25),
                previous: Span::new(0, 5),
            }
        );
    }

    #[test]
    fn test_undefined_label_reported_on_exit() {
        let mut scope = FunctionScope::new();
        scope.enter();
        scope.label_use(&Token::new("nowhere", Span::new(3, 10)));
        scope.label_use(&Token::new("nowhere", Span::new(30, 37)));
        assert_eq!(
            scope.exit(),
            vec![SemaError::UndefinedLabel {
                name: "nowhere".to_string(),
                span: Span::new(3, 10),
            }]
        );
        assert!(scope.labels().is_empty());
    }

    #[test]
    fn test_labels_do_not_leak_between_functions() {
        let mut scope = FunctionScope::new();
        scope.enter();
        scope.label_define(&Token::synthetic("done")).unwrap();
        assert!(scope.exit().is_empty());

        scope.enter();
        assert!(scope.lookup("done").is_none());
        scope.label_define(&Token::synthetic("done")).unwrap();
    }
}
