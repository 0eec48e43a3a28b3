//! Struct, union and enum bodies
//!
//! Members are stored in the body shared by every node naming the tag.
//! A member type that leads back (through strong links) to the body it is
//! added to would form a reference cycle, so such links are stored weakly.
//! Separate declarations of one tag are unified into a single body.

use std::collections::HashSet;
use std::rc::Rc;

use log::debug;

use super::node::{BodyRc, BodyRef, Type, TypeNode};
use crate::common::{SemaError, SemaResult};
use crate::sema::Id;
use crate::token::Token;

impl Type {
    /// Append a member to a struct or union body
    pub fn add_member(&self, token: &Token, ty: &Type) -> SemaResult<()> {
        let Some(body) = self.body() else {
            return Err(SemaError::NotDeclarable {
                found: format!("member of {self}"),
            });
        };

        if let Some(previous) = body.borrow().members.lookup(token.name()) {
            return Err(SemaError::DuplicateMember {
                name: token.name().to_string(),
                span: token.span(),
                previous: previous.token().span(),
            });
        }

        let member = ty.deep_clone();
        member.relink(&body);
        debug!("member {} of {}: {}", token, self, member);
        body.borrow_mut().members.insert(Id::new(token.clone(), member));
        Ok(())
    }

    /// Make two declarations of one tag share a single body.
    ///
    /// This body stays canonical: if it is still a forward declaration it
    /// first takes over the members of `other`'s complete body. `other`'s
    /// body is then emptied and forwarded here, so handles built from
    /// either declaration name the same type. Two distinct complete bodies
    /// are left alone.
    pub(crate) fn unify_bodies(&self, other: &Type) {
        let (Some(target), Some(source)) = (self.body(), other.body()) else {
            return;
        };
        if Rc::ptr_eq(&target, &source) {
            return;
        }
        let (target_complete, source_complete) = (target.borrow().complete, source.borrow().complete);
        match (target_complete, source_complete) {
            (true, true) => return,
            (false, true) => adopt_members(&target, &source),
            _ => {}
        }

        let name = source.borrow().name.clone();
        if let Some(name) = name {
            self.set_tag_name(&name);
        }
        {
            let mut retired = source.borrow_mut();
            retired.members.clear();
            retired.forward = Some(Rc::clone(&target));
        }

        // Links into the retired body now resolve here and may close cycles
        let members: Vec<Type> = target.borrow().members.iter().map(|(_, id)| id.ty()).collect();
        for member in &members {
            member.relink(&target);
        }
        debug!("{} unified with {} member(s)", self, members.len());
    }

    /// Resolve the aggregate link at the end of this type and weaken it if
    /// it would close a strong cycle through `target`
    pub(crate) fn relink(&self, target: &BodyRc) {
        if let Some(inner) = self.inner() {
            inner.relink(target);
            return;
        }

        let current = match &*self.node() {
            TypeNode::Aggregate { body, .. } => body.clone(),
            _ => return,
        };
        let Some(rc) = current.get() else {
            return;
        };
        let relinked = if current.is_strong() && !reaches(&rc, target) {
            BodyRef::Strong(rc)
        } else {
            BodyRef::Weak(Rc::downgrade(&rc))
        };

        if let TypeNode::Aggregate { body, .. } = &mut *self.node.borrow_mut() {
            *body = relinked;
        }
    }

    /// Bodies this type holds strong links to, without entering members
    fn strong_bodies(&self, out: &mut Vec<BodyRc>) {
        if let Some(inner) = self.inner() {
            inner.strong_bodies(out);
            return;
        }
        if let TypeNode::Aggregate { body: BodyRef::Strong(rc), .. } = &*self.node() {
            out.push(Rc::clone(rc));
        }
    }
}

/// Copy a complete body's members into a forward declaration
fn adopt_members(target: &BodyRc, source: &BodyRc) {
    let adopted: Vec<Id> = source
        .borrow()
        .members
        .iter()
        .map(|(_, id)| Id::new(id.token().clone(), id.ty().deep_clone()))
        .collect();
    let mut body = target.borrow_mut();
    for id in adopted {
        body.members.insert(id);
    }
    body.complete = true;
}

/// Whether `target` can be reached from `from` over strong links
fn reaches(from: &BodyRc, target: &BodyRc) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![Rc::clone(from)];
    while let Some(body) = stack.pop() {
        if Rc::ptr_eq(&body, target) {
            return true;
        }
        if !visited.insert(Rc::as_ptr(&body)) {
            continue;
        }
        let forward = body.borrow().forward.clone();
        stack.extend(forward);
        for (_, id) in body.borrow().members.iter() {
            id.ty().strong_bodies(&mut stack);
        }
    }
    false
}

/// Whether two bodies list the same member names
pub(crate) fn same_members(a: &BodyRef, b: &BodyRef) -> bool {
    match (a.get(), b.get()) {
        (Some(a), Some(b)) => a.borrow().members.names().eq(b.borrow().members.names()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Weak;

    use super::*;
    use crate::common::Span;
    use crate::types::node::AggregateBody;
    use crate::types::{BasicKind, TagKind};
    use pretty_assertions::assert_eq;

    fn int() -> Type {
        Type::from(BasicKind::Int)
    }

    fn body_weak(t: &Type) -> Weak<RefCell<AggregateBody>> {
        Rc::downgrade(&t.body().expect("aggregate body"))
    }

    #[test]
    fn test_duplicate_member() {
        let s = Type::aggregate(&Type::struct_tag());
        s.add_member(&Token::new("a", Span::new(10, 11)), &int()).unwrap();
        let err = s.add_member(&Token::new("a", Span::new(20, 21)), &int()).unwrap_err();
        assert_eq!(
            err,
            SemaError::DuplicateMember {
                name: "a".to_string(),
                span: Span::new(20, 21),
                previous: Span::new(10, 11),
            }
        );
    }

    #[test]
    fn test_add_member_to_non_aggregate() {
        let err = int().add_member(&Token::synthetic("a"), &int()).unwrap_err();
        assert!(matches!(err, SemaError::NotDeclarable { .. }));
    }

    #[test]
    fn test_self_reference_is_weak() {
        let s = Type::aggregate(&Type::struct_tag());
        s.set_tag_name("node");
        s.add_member(&Token::synthetic("next"), &Type::pointer_to(s.clone())).unwrap();

        let next = s.member("next").unwrap().ty();
        assert_eq!(next.to_string(), "pointer to struct node");
        // Walking the link still reaches the live body
        assert!(next.deref().member("next").is_some());

        let weak = body_weak(&s);
        drop(next);
        drop(s);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_mutual_reference_is_freed() {
        let a = Type::aggregate(&Type::struct_tag());
        let b = Type::aggregate(&Type::struct_tag());
        a.add_member(&Token::synthetic("b"), &Type::pointer_to(b.clone())).unwrap();
        b.add_member(&Token::synthetic("a"), &Type::pointer_to(a.clone())).unwrap();

        let (weak_a, weak_b) = (body_weak(&a), body_weak(&b));
        drop(a);
        drop(b);
        assert!(weak_a.upgrade().is_none());
        assert!(weak_b.upgrade().is_none());
    }

    #[test]
    fn test_adopt_redirects_self_references() {
        // struct list; struct list { struct list *next; int v; };
        let forward = Type::struct_tag();
        forward.set_tag_name("list");
        let full = Type::struct_union(&Token::synthetic("next"), &Type::pointer_to(forward.clone()), &Type::struct_tag());
        full.add_member(&Token::synthetic("v"), &int()).unwrap();

        forward.unify_bodies(&full);
        assert!(forward.is_complete());
        assert_eq!(forward.tag_kind(), Some(TagKind::Struct));
        assert_eq!(forward.member("v").map(|id| id.ty()), Some(int()));

        let next = forward.member("next").unwrap().ty();
        assert_eq!(next.deref().body().map(|b| Rc::as_ptr(&b)), forward.body().map(|b| Rc::as_ptr(&b)));

        let weak = body_weak(&forward);
        drop(full);
        drop(next);
        drop(forward);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_definition_handle_follows_unified_body() {
        let forward = Type::struct_tag();
        let full = Type::struct_union(&Token::synthetic("a"), &int(), &Type::struct_tag());
        forward.unify_bodies(&full);

        // The definition's own handle names the canonical body
        assert_eq!(full, forward);
        assert_eq!(full.member("a").map(|id| id.ty()), Some(int()));
        assert_eq!(full.members().len(), 1);

        // So does a later forward declaration
        let again = Type::struct_tag();
        forward.unify_bodies(&again);
        assert_eq!(again, forward);
        assert!(again.is_complete());
    }

    #[test]
    fn test_complete_bodies_stay_distinct() {
        let a = Type::struct_union(&Token::synthetic("x"), &int(), &Type::struct_tag());
        let b = Type::struct_union(&Token::synthetic("x"), &int(), &Type::struct_tag());
        a.unify_bodies(&b);
        assert!(a != b);
    }

    #[test]
    fn test_same_members() {
        let a = Type::struct_union(&Token::synthetic("x"), &int(), &Type::struct_tag());
        let b = Type::struct_union(&Token::synthetic("x"), &int(), &Type::struct_tag());
        let c = Type::struct_union(&Token::synthetic("y"), &int(), &Type::struct_tag());
        let body = |t: &Type| match &*t.node() {
            TypeNode::Aggregate { body, .. } => body.clone(),
            _ => unreachable!(),
        };
        assert!(same_members(&body(&a), &body(&b)));
        assert!(!same_members(&body(&a), &body(&c)));
    }
}
