//! Folding several partial descriptions of one entity into a single type
//!
//! Two different folds exist. Specifier folding combines the pieces of one
//! declaration's specifier list (`static` + `unsigned` + `long`).
//! Declaration merging combines two declarations of the same name
//! (`extern int x;` followed by `int x = 0;`). Neither ever mutates a
//! handle that might be shared; the only in-place update is the unification
//! of tag bodies, which are shared on purpose.

use log::debug;

use super::aggregate::same_members;
use super::kinds::{Sign, StorageClass};
use super::node::{Type, TypeNode};
use crate::common::MergeError;

impl Type {
    /// Fold a later declaration of the same entity into this one.
    ///
    /// Returns the canonical type: `self` when nothing changes, otherwise a
    /// new handle. A side that is still an abstract specifier is folded as
    /// a specifier.
    pub fn merge_with(&self, other: &Type) -> Result<Type, MergeError> {
        self.merge_declaration(other, false)
    }

    /// Like [`Type::merge_with`], for declarations coming from different
    /// compilation units: complete aggregates with the same tag and member
    /// names are the same type there.
    pub(crate) fn merge_linked(&self, other: &Type) -> Result<Type, MergeError> {
        self.merge_declaration(other, true)
    }

    fn merge_declaration(&self, other: &Type, linking: bool) -> Result<Type, MergeError> {
        if !self.is_valid() {
            return Ok(other.clone());
        }
        if !other.is_valid() {
            return Ok(self.clone());
        }
        if self.is_abstract() || other.is_abstract() {
            return self.merge_specifier(other);
        }

        let existing = self.storage_class();
        let new = other.storage_class();
        let storage = existing
            .merge_declarations(new, self.is_function())
            .ok_or(MergeError::StorageClass { existing, new })?;

        self.check_compatible(other, linking, true)?;

        if self.is_aggregate() && other.is_aggregate() {
            self.unify_bodies(other);
        }

        if storage == existing {
            return Ok(self.clone());
        }
        debug!("storage class of {self} resolved to {storage}");
        let merged = self.deep_clone();
        merged.set_storage_class(storage);
        Ok(merged)
    }

    /// Structural compatibility of two declarations. `top` is false below
    /// pointers, arrays and functions, where two different complete tags
    /// are merely incompatible rather than a redefinition.
    fn check_compatible(&self, other: &Type, linking: bool, top: bool) -> Result<(), MergeError> {
        let incompatible = || MergeError::Incompatible {
            existing: self.to_string(),
            new: other.to_string(),
        };

        match (&*self.node(), &*other.node()) {
            (TypeNode::Undeclared | TypeNode::Abstract { .. }, _)
            | (_, TypeNode::Undeclared | TypeNode::Abstract { .. })
            | (TypeNode::Label, TypeNode::Label) => Ok(()),

            (
                TypeNode::Basic { kind: k1, sign: s1, .. },
                TypeNode::Basic { kind: k2, sign: s2, .. },
            ) => {
                if k1 == k2 && s1.effective(*k1) == s2.effective(*k2) {
                    Ok(())
                } else {
                    Err(incompatible())
                }
            }

            (TypeNode::Pointer(a), TypeNode::Pointer(b))
            | (TypeNode::Array(a), TypeNode::Array(b))
            | (TypeNode::Function(a), TypeNode::Function(b)) => {
                a.check_compatible(b, linking, false).map_err(|_| incompatible())
            }

            (
                TypeNode::Aggregate { tag: t1, body: b1, .. },
                TypeNode::Aggregate { tag: t2, body: b2, .. },
            ) => {
                if t1 != t2 {
                    return Err(MergeError::TagKind {
                        existing: *t1,
                        new: *t2,
                    });
                }
                if std::ptr::eq(b1.as_ptr(), b2.as_ptr()) {
                    return Ok(());
                }
                let (n1, n2) = (b1.name(), b2.name());
                if let (Some(a), Some(b)) = (&n1, &n2) {
                    if a != b {
                        return Err(incompatible());
                    }
                }
                if !b1.is_complete() || !b2.is_complete() {
                    return Ok(());
                }
                if linking && n1.is_some() && n1 == n2 && same_members(b1, b2) {
                    return Ok(());
                }
                if top {
                    Err(MergeError::TagRedefinition { tag: *t1 })
                } else {
                    Err(incompatible())
                }
            }

            (TypeNode::Identifier { of: a, .. }, TypeNode::Identifier { of: b, .. }) => {
                a.check_compatible(b, linking, top)
            }

            _ => Err(incompatible()),
        }
    }

    /// Fold another declaration specifier into this one
    pub fn merge_specifier(&self, other: &Type) -> Result<Type, MergeError> {
        let invalid = || MergeError::Specifier {
            existing: self.to_string(),
            new: other.to_string(),
        };

        match (&*self.node(), &*other.node()) {
            (
                TypeNode::Abstract { sign: s1, storage: c1 },
                TypeNode::Abstract { sign: s2, storage: c2 },
            ) => {
                let sign = s1.combine(*s2).ok_or(MergeError::Sign)?;
                let storage = c1.combine_specifier(*c2).ok_or(MergeError::StorageClass {
                    existing: *c1,
                    new: *c2,
                })?;
                Ok(Type::abstract_with(sign, storage))
            }
            (TypeNode::Abstract { sign, storage }, _) => other.with_specifier(*sign, *storage),
            (_, TypeNode::Abstract { sign, storage }) => self.with_specifier(*sign, *storage),
            (
                TypeNode::Basic { kind: k1, sign: s1, storage: c1 },
                TypeNode::Basic { kind: k2, sign: s2, storage: c2 },
            ) => {
                let kind = k1.combine(*k2).ok_or_else(invalid)?;
                let sign = s1.combine(*s2).ok_or(MergeError::Sign)?;
                let storage = c1.combine_specifier(*c2).ok_or(MergeError::StorageClass {
                    existing: *c1,
                    new: *c2,
                })?;
                if sign != Sign::None && !kind.accepts_sign() {
                    return Err(invalid());
                }
                Ok(Type::basic(kind, sign, storage))
            }
            _ => Err(invalid()),
        }
    }

    /// Independent copy of this specifier with a sign and storage class
    /// folded in
    fn with_specifier(&self, sign: Sign, storage: StorageClass) -> Result<Type, MergeError> {
        let existing = self.storage_class();
        let folded = existing
            .combine_specifier(storage)
            .ok_or(MergeError::StorageClass { existing, new: storage })?;

        let invalid_sign = || MergeError::Specifier {
            existing: self.to_string(),
            new: sign.keyword().unwrap_or_default().to_string(),
        };

        match &*self.node() {
            TypeNode::Basic { kind, sign: own, .. } => {
                let sign = own.combine(sign).ok_or(MergeError::Sign)?;
                if sign != Sign::None && !kind.accepts_sign() {
                    return Err(invalid_sign());
                }
                Ok(Type::basic(*kind, sign, folded))
            }
            _ if sign != Sign::None => Err(invalid_sign()),
            _ => {
                let spec = self.deep_clone();
                spec.set_storage_class(folded);
                Ok(spec)
            }
        }
    }
}
