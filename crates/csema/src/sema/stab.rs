//! Symbol tables
//!
//! A [`Stab`] maps names to [`Id`]s within one namespace of one scope.
//! Redefinitions are not rejected outright: C allows an entity to be
//! declared many times as long as the declarations agree, so a second
//! definition is merged into the first.

use std::collections::BTreeMap;

use log::{debug, trace};

use super::Id;
use crate::common::{SemaError, SemaResult};
use crate::token::Token;
use crate::types::Type;

/// A symbol table, ordered by name
#[derive(Debug, Clone, Default)]
pub struct Stab {
    entries: BTreeMap<String, Id>,
}

impl Stab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `token` as `ty`, merging with an existing entry of the same
    /// name. On conflict the table is left unchanged.
    pub fn define(&mut self, token: &Token, ty: &Type) -> SemaResult<()> {
        match self.entries.get_mut(token.name()) {
            Some(existing) => {
                let merged = existing
                    .ty()
                    .merge_with(ty)
                    .map_err(|cause| SemaError::redeclaration(token, existing.token(), cause))?;
                debug!("redeclared {}: {}", token, merged);
                existing.set_ty(merged);
            }
            None => {
                debug!("defined {}: {}", token, ty);
                self.insert(Id::new(token.clone(), ty.clone()));
            }
        }
        Ok(())
    }

    /// Exact lookup in this table only
    pub fn lookup(&self, name: &str) -> Option<&Id> {
        let found = self.entries.get(name);
        trace!("lookup {} -> {}", name, if found.is_some() { "found" } else { "absent" });
        found
    }

    /// Fold every entry of `other` into this table. Names defined in both
    /// are merged as declarations from separate units; each conflict is
    /// returned and the entry already here is kept.
    pub fn merge_with(&mut self, other: &Stab) -> Vec<SemaError> {
        let mut conflicts = Vec::new();
        for (name, id) in &other.entries {
            let Some(existing) = self.entries.get_mut(name) else {
                self.entries.insert(name.clone(), id.clone());
                continue;
            };
            match existing.ty().merge_linked(&id.ty()) {
                Ok(merged) => existing.set_ty(merged),
                Err(cause) => conflicts.push(SemaError::redeclaration(id.token(), existing.token(), cause)),
            }
        }
        debug!("merged {} name(s), {} conflict(s)", other.len(), conflicts.len());
        conflicts
    }

    /// Insert or replace without merging
    pub(crate) fn insert(&mut self, id: Id) {
        self.entries.insert(id.name().to_string(), id);
    }

    pub fn remove(&mut self, name: &str) -> Option<Id> {
        self.entries.remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Id)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), id))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Stab {
    type Item = (&'a str, &'a Id);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Id)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
