//! Type nodes and the shared handle that owns them
//!
//! A [`Type`] is a reference-counted handle to one [`TypeNode`]. Copying a
//! handle is O(1) and shares the node; [`Type::deep_clone`] produces an
//! independent node chain. Declarators are built by nesting derived nodes
//! around an `Abstract` placeholder that is later replaced by the
//! declaration specifier ([`Type::set_abstract`]).

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use super::kinds::{BasicKind, Sign, StorageClass, TagKind};
use crate::sema::{Id, Stab};
use crate::token::Token;

/// The part of a struct, union or enum shared by every mention of its tag
#[derive(Debug)]
pub(crate) struct AggregateBody {
    pub(crate) name: Option<String>,
    pub(crate) members: Stab,
    pub(crate) complete: bool,
    /// Set once this body has been unified with another declaration of
    /// the same tag; every link to it then resolves to that body
    pub(crate) forward: Option<BodyRc>,
}

pub(crate) type BodyRc = Rc<RefCell<AggregateBody>>;

/// Link from an aggregate node to its body. Members that lead back to the
/// aggregate they belong to hold it weakly.
#[derive(Debug, Clone)]
pub(crate) enum BodyRef {
    Strong(BodyRc),
    Weak(Weak<RefCell<AggregateBody>>),
}

impl BodyRef {
    /// The live body this link resolves to, following forwarding
    pub(crate) fn get(&self) -> Option<BodyRc> {
        let mut body = match self {
            BodyRef::Strong(rc) => Rc::clone(rc),
            BodyRef::Weak(weak) => weak.upgrade()?,
        };
        loop {
            let next = body.borrow().forward.clone();
            match next {
                Some(next) => body = next,
                None => return Some(body),
            }
        }
    }

    /// Identity of the resolved body
    pub(crate) fn as_ptr(&self) -> *const RefCell<AggregateBody> {
        match (self.get(), self) {
            (Some(rc), _) => Rc::as_ptr(&rc),
            (None, BodyRef::Strong(rc)) => Rc::as_ptr(rc),
            (None, BodyRef::Weak(weak)) => weak.as_ptr(),
        }
    }

    pub(crate) fn is_strong(&self) -> bool {
        matches!(self, BodyRef::Strong(_))
    }

    pub(crate) fn name(&self) -> Option<String> {
        self.get()?.borrow().name.clone()
    }

    pub(crate) fn is_complete(&self) -> bool {
        match self.get() {
            Some(body) => body.borrow().complete,
            None => false,
        }
    }

    /// Same body, held strongly if it is still alive
    fn strengthened(&self) -> BodyRef {
        match self.get() {
            Some(rc) => BodyRef::Strong(rc),
            None => self.clone(),
        }
    }
}

/// One type shape
#[derive(Debug, Clone)]
pub(crate) enum TypeNode {
    /// Declarator target still waiting for its specifier
    Abstract { sign: Sign, storage: StorageClass },
    /// Invalid-type sentinel
    Undeclared,
    Basic {
        kind: BasicKind,
        sign: Sign,
        storage: StorageClass,
    },
    Pointer(Type),
    Array(Type),
    /// Function returning the wrapped type
    Function(Type),
    Aggregate {
        tag: TagKind,
        body: BodyRef,
        storage: StorageClass,
    },
    Identifier { token: Token, of: Type },
    Label,
}

/// Shared handle to a type node
#[derive(Clone)]
pub struct Type {
    pub(crate) node: Rc<RefCell<TypeNode>>,
}

impl Type {
    pub(crate) fn from_node(node: TypeNode) -> Self {
        Self {
            node: Rc::new(RefCell::new(node)),
        }
    }

    pub(crate) fn node(&self) -> Ref<'_, TypeNode> {
        self.node.borrow()
    }

    /// Type wrapped by a derived node or named by an identifier
    pub(crate) fn inner(&self) -> Option<Type> {
        match &*self.node() {
            TypeNode::Pointer(t) | TypeNode::Array(t) | TypeNode::Function(t) => Some(t.clone()),
            TypeNode::Identifier { of, .. } => Some(of.clone()),
            _ => None,
        }
    }

    // ==================== Factories ====================

    pub fn basic(kind: BasicKind, sign: Sign, storage: StorageClass) -> Self {
        Self::from_node(TypeNode::Basic { kind, sign, storage })
    }

    /// Placeholder for the base type of a declarator under construction
    pub fn abstract_type() -> Self {
        Self::abstract_with(Sign::None, StorageClass::Unspecified)
    }

    /// Specifier carrying only a sign and/or storage class, as in
    /// `static x;` or `unsigned y;`
    pub fn abstract_with(sign: Sign, storage: StorageClass) -> Self {
        Self::from_node(TypeNode::Abstract { sign, storage })
    }

    pub fn undeclared() -> Self {
        Self::from_node(TypeNode::Undeclared)
    }

    pub fn array_of(t: Type) -> Self {
        Self::from_node(TypeNode::Array(t))
    }

    pub fn pointer_to(t: Type) -> Self {
        Self::from_node(TypeNode::Pointer(t))
    }

    pub fn function_returning(t: Type) -> Self {
        Self::from_node(TypeNode::Function(t))
    }

    /// `extern int ()`: what a call to an undeclared function implies
    pub fn implicit_function() -> Self {
        Self::function_returning(Self::basic(BasicKind::Int, Sign::None, StorageClass::Extern))
    }

    fn tag(tag: TagKind, complete: bool, storage: StorageClass) -> Self {
        let body = AggregateBody {
            name: None,
            members: Stab::new(),
            complete,
            forward: None,
        };
        Self::from_node(TypeNode::Aggregate {
            tag,
            body: BodyRef::Strong(Rc::new(RefCell::new(body))),
            storage,
        })
    }

    /// Forward `struct` tag with no member list yet
    pub fn struct_tag() -> Self {
        Self::tag(TagKind::Struct, false, StorageClass::Unspecified)
    }

    pub fn union_tag() -> Self {
        Self::tag(TagKind::Union, false, StorageClass::Unspecified)
    }

    pub fn enum_tag() -> Self {
        Self::tag(TagKind::Enum, false, StorageClass::Unspecified)
    }

    /// Complete aggregate of `spec`'s kind with no members yet.
    /// Returns the undeclared sentinel when `spec` is not a tag.
    pub fn aggregate(spec: &Type) -> Self {
        match &*spec.node() {
            TypeNode::Aggregate { tag, storage, .. } => Self::tag(*tag, true, *storage),
            _ => Self::undeclared(),
        }
    }

    /// Complete aggregate of `spec`'s kind whose first member is
    /// `token` of type `member`
    pub fn struct_union(token: &Token, member: &Type, spec: &Type) -> Self {
        let su = Self::aggregate(spec);
        if su.is_valid() && su.add_member(token, member).is_err() {
            return Self::undeclared();
        }
        su
    }

    /// Identifier whose type is still to be derived
    pub fn identifier(token: Token) -> Self {
        Self::from_node(TypeNode::Identifier {
            token,
            of: Self::abstract_type(),
        })
    }

    pub fn label() -> Self {
        Self::from_node(TypeNode::Label)
    }

    // ==================== Derivation ====================

    /// Element type of an array or pointer
    pub fn subscript(&self) -> Type {
        match &*self.node() {
            TypeNode::Array(t) | TypeNode::Pointer(t) => t.clone(),
            _ => Self::undeclared(),
        }
    }

    /// Result of applying unary `*`
    pub fn deref(&self) -> Type {
        match &*self.node() {
            TypeNode::Array(t) | TypeNode::Pointer(t) => t.clone(),
            // A function designator decays and dereferences to itself
            TypeNode::Function(_) => self.clone(),
            _ => Self::undeclared(),
        }
    }

    /// Return type when calling a function or a pointer to function
    pub fn call(&self) -> Type {
        match &*self.node() {
            TypeNode::Function(ret) => ret.clone(),
            TypeNode::Pointer(target) => match &*target.node() {
                TypeNode::Function(ret) => ret.clone(),
                _ => Self::undeclared(),
            },
            _ => Self::undeclared(),
        }
    }

    /// Type named by an identifier
    pub fn ty(&self) -> Type {
        match &*self.node() {
            TypeNode::Identifier { of, .. } => of.clone(),
            _ => Self::undeclared(),
        }
    }

    /// Struct or union member; `None` when absent, when the aggregate is
    /// still incomplete, or when this is not a struct or union
    pub fn member(&self, name: &str) -> Option<Id> {
        let body = match &*self.node() {
            TypeNode::Aggregate { tag: TagKind::Struct | TagKind::Union, body, .. } => body.get()?,
            _ => return None,
        };
        let body = body.borrow();
        if !body.complete {
            return None;
        }
        body.members.lookup(name).cloned()
    }

    /// Snapshot of an aggregate's member table
    pub fn members(&self) -> Stab {
        match self.body() {
            Some(body) => body.borrow().members.clone(),
            None => Stab::new(),
        }
    }

    pub(crate) fn body(&self) -> Option<BodyRc> {
        match &*self.node() {
            TypeNode::Aggregate { body, .. } => body.get(),
            _ => None,
        }
    }

    pub fn tag_kind(&self) -> Option<TagKind> {
        match &*self.node() {
            TypeNode::Aggregate { tag, .. } => Some(*tag),
            _ => None,
        }
    }

    pub fn tag_name(&self) -> Option<String> {
        match &*self.node() {
            TypeNode::Aggregate { body, .. } => body.name(),
            _ => None,
        }
    }

    /// Name a tag's body after the tag it was first defined as
    pub(crate) fn set_tag_name(&self, name: &str) {
        if let Some(body) = self.body() {
            let mut body = body.borrow_mut();
            if body.name.is_none() {
                body.name = Some(name.to_string());
            }
        }
    }

    pub fn token(&self) -> Option<Token> {
        match &*self.node() {
            TypeNode::Identifier { token, .. } => Some(token.clone()),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<String> {
        self.token().map(|t| t.name().to_string())
    }

    // ==================== Abstract resolution ====================

    /// Replace the abstract placeholder at the end of this declarator chain
    /// with an independent copy of `t`
    pub fn set_abstract(&self, t: &Type) {
        if self.is_abstract() {
            let resolved = t.deep_clone().node().clone();
            *self.node.borrow_mut() = resolved;
            return;
        }
        if let Some(inner) = self.inner() {
            inner.set_abstract(t);
        }
    }

    /// Innermost abstract placeholder of a declarator chain
    pub(crate) fn abstract_leaf(&self) -> Option<Type> {
        if self.is_abstract() {
            return Some(self.clone());
        }
        self.inner().and_then(|inner| inner.abstract_leaf())
    }

    /// The implicit `int` of a declaration written without a type
    /// specifier; anything but an abstract specifier is returned as is
    pub fn get_default_specifier(&self) -> Type {
        match &*self.node() {
            TypeNode::Abstract { sign, storage } => Self::basic(BasicKind::Int, *sign, *storage),
            _ => self.clone(),
        }
    }

    // ==================== Copying ====================

    /// Copy the node chain so that the result shares no mutable state with
    /// `self`. Aggregate bodies are the identity of their tag and stay
    /// shared.
    pub fn deep_clone(&self) -> Type {
        let node = match &*self.node() {
            TypeNode::Pointer(t) => TypeNode::Pointer(t.deep_clone()),
            TypeNode::Array(t) => TypeNode::Array(t.deep_clone()),
            TypeNode::Function(t) => TypeNode::Function(t.deep_clone()),
            TypeNode::Identifier { token, of } => TypeNode::Identifier {
                token: token.clone(),
                of: of.deep_clone(),
            },
            TypeNode::Aggregate { tag, body, storage } => TypeNode::Aggregate {
                tag: *tag,
                body: body.strengthened(),
                storage: *storage,
            },
            other => other.clone(),
        };
        Self::from_node(node)
    }

    /// Number of handles sharing this node
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.node)
    }

    /// Whether both handles share one node
    pub fn same_node(&self, other: &Type) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    // ==================== Storage class ====================

    /// Storage class of the declaration. Derived types report the class
    /// of the specifier at the end of their chain.
    pub fn storage_class(&self) -> StorageClass {
        if let Some(inner) = self.inner() {
            return inner.storage_class();
        }
        match &*self.node() {
            TypeNode::Abstract { storage, .. }
            | TypeNode::Basic { storage, .. }
            | TypeNode::Aggregate { storage, .. } => *storage,
            _ => StorageClass::Unspecified,
        }
    }

    pub fn set_storage_class(&self, sc: StorageClass) {
        if let Some(inner) = self.inner() {
            inner.set_storage_class(sc);
            return;
        }
        match &mut *self.node.borrow_mut() {
            TypeNode::Abstract { storage, .. }
            | TypeNode::Basic { storage, .. }
            | TypeNode::Aggregate { storage, .. } => *storage = sc,
            _ => {}
        }
    }

    pub fn is_typedef(&self) -> bool {
        self.storage_class() == StorageClass::Typedef
    }

    /// Independent copy of a typedef name's type for use as the specifier
    /// of a new declaration; the undeclared sentinel for non-typedefs
    pub fn typedef_specifier(&self) -> Type {
        if !self.is_typedef() {
            return Self::undeclared();
        }
        let spec = self.deep_clone();
        spec.set_storage_class(StorageClass::Unspecified);
        spec
    }

    // ==================== Queries ====================

    pub fn is_valid(&self) -> bool {
        !matches!(*self.node(), TypeNode::Undeclared)
    }

    pub fn is_abstract(&self) -> bool {
        matches!(*self.node(), TypeNode::Abstract { .. })
    }

    pub fn is_basic(&self) -> bool {
        matches!(*self.node(), TypeNode::Basic { .. })
    }

    /// True for types that take part in pointer arithmetic
    pub fn is_ptr(&self) -> bool {
        matches!(*self.node(), TypeNode::Pointer(_) | TypeNode::Array(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(*self.node(), TypeNode::Function(_))
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(*self.node(), TypeNode::Aggregate { .. })
    }

    pub fn is_label(&self) -> bool {
        matches!(*self.node(), TypeNode::Label)
    }

    pub fn is_identifier(&self) -> bool {
        matches!(*self.node(), TypeNode::Identifier { .. })
    }

    /// False only for a struct, union or enum whose body has not been seen
    pub fn is_complete(&self) -> bool {
        match &*self.node() {
            TypeNode::Aggregate { body, .. } => body.is_complete(),
            _ => true,
        }
    }

    pub fn basic_kind(&self) -> Option<BasicKind> {
        match &*self.node() {
            TypeNode::Basic { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn sign(&self) -> Sign {
        match &*self.node() {
            TypeNode::Basic { sign, .. } | TypeNode::Abstract { sign, .. } => *sign,
            _ => Sign::None,
        }
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::undeclared()
    }
}

impl From<BasicKind> for Type {
    fn from(kind: BasicKind) -> Self {
        Self::basic(kind, Sign::None, StorageClass::Unspecified)
    }
}

/// Structural equality; aggregates are equal when they share a body
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        if self.same_node(other) {
            return true;
        }
        match (&*self.node(), &*other.node()) {
            (TypeNode::Undeclared, TypeNode::Undeclared) | (TypeNode::Label, TypeNode::Label) => true,
            (
                TypeNode::Abstract { sign: s1, storage: c1 },
                TypeNode::Abstract { sign: s2, storage: c2 },
            ) => s1 == s2 && c1 == c2,
            (
                TypeNode::Basic { kind: k1, sign: s1, storage: c1 },
                TypeNode::Basic { kind: k2, sign: s2, storage: c2 },
            ) => k1 == k2 && s1 == s2 && c1 == c2,
            (TypeNode::Pointer(a), TypeNode::Pointer(b))
            | (TypeNode::Array(a), TypeNode::Array(b))
            | (TypeNode::Function(a), TypeNode::Function(b)) => a == b,
            (
                TypeNode::Aggregate { tag: t1, body: b1, storage: c1 },
                TypeNode::Aggregate { tag: t2, body: b2, storage: c2 },
            ) => t1 == t2 && c1 == c2 && std::ptr::eq(b1.as_ptr(), b2.as_ptr()),
            (
                TypeNode::Identifier { token: t1, of: o1 },
                TypeNode::Identifier { token: t2, of: o2 },
            ) => t1 == t2 && o1 == o2,
            _ => false,
        }
    }
}
