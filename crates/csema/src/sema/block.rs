//! Block scope stack
//!
//! Frame 0 holds names with external linkage across every compilation
//! unit; frame 1 holds the file scope of the current compilation unit.
//! Each block entered in a function body pushes one more frame. Every
//! frame has two namespaces: ordinary identifiers and tags.

use log::{debug, trace};

use super::{Id, Stab};
use crate::common::{SemaError, SemaResult};
use crate::token::Token;
use crate::types::Type;

/// Linkage-unit frame
pub const LU_BLOCK: usize = 0;
/// Compilation-unit frame
pub const CU_BLOCK: usize = 1;

/// The names declared in one block
#[derive(Debug, Clone, Default)]
pub struct Frame {
    obj: Stab,
    tag: Stab,
}

impl Frame {
    /// Ordinary identifiers: objects, functions, typedef names
    pub fn obj(&self) -> &Stab {
        &self.obj
    }

    /// Struct, union and enum tags
    pub fn tag(&self) -> &Stab {
        &self.tag
    }

    pub(crate) fn take_tags(&mut self) -> Stab {
        std::mem::take(&mut self.tag)
    }
}

/// Stack of nested scopes
#[derive(Debug, Clone)]
pub struct Block {
    frames: Vec<Frame>,
}

impl Block {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default(), Frame::default()],
        }
    }

    /// Level of the innermost frame
    pub fn current_block(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn frame(&self, level: usize) -> Option<&Frame> {
        self.frames.get(level)
    }

    fn frame_mut(&mut self, level: usize) -> SemaResult<&mut Frame> {
        let current = self.current_block();
        self.frames
            .get_mut(level)
            .ok_or(SemaError::InvalidFrame { level, current })
    }

    /// Close every block of the current compilation unit and hand back its
    /// file-scope frame, leaving an empty one in its place
    pub(crate) fn take_compilation_unit(&mut self) -> Frame {
        self.frames.truncate(CU_BLOCK + 1);
        std::mem::take(&mut self.frames[CU_BLOCK])
    }

    /// Merge `names` into the ordinary namespace of frame `level`,
    /// returning the conflicts
    pub(crate) fn merge_into(&mut self, level: usize, names: &Stab) -> Vec<SemaError> {
        match self.frame_mut(level) {
            Ok(frame) => frame.obj.merge_with(names),
            Err(err) => vec![err],
        }
    }

    fn innermost(&mut self) -> &mut Frame {
        let level = self.current_block();
        &mut self.frames[level]
    }

    pub fn enter(&mut self) {
        self.frames.push(Frame::default());
        debug!("entered block {}", self.current_block());
    }

    /// Drop the innermost frame and everything declared in it. The linkage
    /// and compilation-unit frames cannot be left.
    pub fn exit(&mut self) -> SemaResult<()> {
        let depth = self.current_block();
        if depth <= CU_BLOCK {
            return Err(SemaError::ScopeUnderflow { depth });
        }
        self.frames.pop();
        debug!("left block {depth}");
        Ok(())
    }

    /// Copy the innermost binding of `name` into frame `target`, merging
    /// with a binding already there. Used for block-scope `extern`
    /// declarations, which refer to an entity with linkage.
    pub fn propagate(&mut self, name: &str, target: usize) -> SemaResult<()> {
        let current = self.current_block();
        let Some(id) = self.innermost().obj.lookup(name).cloned() else {
            return Err(SemaError::undeclared(&Token::synthetic(name)));
        };
        if target >= current {
            return Err(SemaError::InvalidFrame { level: target, current });
        }
        debug!("propagating {} to block {target}", id);
        self.frames[target].obj.define(id.token(), &id.ty())
    }

    pub fn obj_define(&mut self, token: &Token, ty: &Type) -> SemaResult<()> {
        self.innermost().obj.define(token, ty)
    }

    /// Define an ordinary identifier in a specific frame
    pub fn obj_define_at(&mut self, level: usize, token: &Token, ty: &Type) -> SemaResult<()> {
        self.frame_mut(level)?.obj.define(token, ty)
    }

    /// Define a tag in the innermost frame. An unnamed aggregate body takes
    /// the tag's name.
    pub fn tag_define(&mut self, token: &Token, ty: &Type) -> SemaResult<()> {
        ty.set_tag_name(token.name());
        self.innermost()
            .tag
            .define(token, ty)
            .map_err(SemaError::in_tag_namespace)
    }

    /// Innermost visible ordinary identifier
    pub fn obj_lookup(&self, name: &str) -> Option<&Id> {
        let found = self.frames.iter().rev().find_map(|frame| frame.obj.lookup(name));
        trace!("obj {} {}", name, if found.is_some() { "visible" } else { "not visible" });
        found
    }

    /// Innermost visible tag
    pub fn tag_lookup(&self, name: &str) -> Option<&Id> {
        self.frames.iter().rev().find_map(|frame| frame.tag.lookup(name))
    }

    /// Type bound to a visible ordinary identifier, or the undeclared
    /// sentinel
    pub fn obj_type(&self, name: &str) -> Type {
        self.obj_lookup(name).map(Id::ty).unwrap_or_default()
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BasicKind, Sign, StorageClass};
    use pretty_assertions::assert_eq;

    fn tok(name: &str) -> Token {
        Token::synthetic(name)
    }

    #[test]
    fn test_new_has_permanent_frames() {
        let mut block = Block::new();
        assert_eq!(block.current_block(), CU_BLOCK);
        assert!(block.frame(LU_BLOCK).is_some());
        assert_eq!(block.exit(), Err(SemaError::ScopeUnderflow { depth: CU_BLOCK }));
        assert_eq!(block.current_block(), CU_BLOCK);
    }

    #[test]
    fn test_shadowing_and_restore() {
        let mut block = Block::new();
        block.obj_define(&tok("x"), &Type::from(BasicKind::Int)).unwrap();

        block.enter();
        block.obj_define(&tok("x"), &Type::from(BasicKind::Char)).unwrap();
        block.enter();
        block.obj_define(&tok("x"), &Type::from(BasicKind::Double)).unwrap();
        assert_eq!(block.current_block(), 3);
        assert_eq!(block.obj_type("x").basic_kind(), Some(BasicKind::Double));

        block.exit().unwrap();
        assert_eq!(block.obj_type("x").basic_kind(), Some(BasicKind::Char));
        block.exit().unwrap();
        assert_eq!(block.obj_type("x").basic_kind(), Some(BasicKind::Int));
    }

    #[test]
    fn test_exit_discards_inner_names() {
        let mut block = Block::new();
        block.enter();
        block.obj_define(&tok("tmp"), &Type::from(BasicKind::Int)).unwrap();
        block.exit().unwrap();
        assert!(block.obj_lookup("tmp").is_none());
        assert!(!block.obj_type("tmp").is_valid());
    }

    #[test]
    fn test_tag_and_object_namespaces() {
        let mut block = Block::new();
        let point = Type::struct_union(&tok("x"), &Type::from(BasicKind::Int), &Type::struct_tag());
        block.tag_define(&tok("point"), &point).unwrap();
        block.obj_define(&tok("point"), &Type::from(BasicKind::Double)).unwrap();

        assert_eq!(block.tag_lookup("point").unwrap().ty().tag_name().as_deref(), Some("point"));
        assert_eq!(block.obj_type("point"), Type::from(BasicKind::Double));
        assert_eq!(block.frame(CU_BLOCK).map(|f| f.tag().len()), Some(1));
    }

    #[test]
    fn test_redefinition_errors_name_their_namespace() {
        let mut block = Block::new();
        let s = || Type::struct_union(&tok("a"), &Type::from(BasicKind::Int), &Type::struct_tag());
        block.tag_define(&tok("S"), &s()).unwrap();
        let err = block.tag_define(&tok("S"), &s()).unwrap_err();
        assert!(matches!(err, SemaError::DuplicateTag { ref name, .. } if name == "S"));

        // Two objects of different anonymous struct types clash as objects
        block.obj_define(&tok("v"), &s()).unwrap();
        let err = block.obj_define(&tok("v"), &s()).unwrap_err();
        assert!(matches!(err, SemaError::Redeclaration { ref name, .. } if name == "v"));
    }

    #[test]
    fn test_propagate_block_extern() {
        let mut block = Block::new();
        block.enter();
        let ext = Type::basic(BasicKind::Int, Sign::None, StorageClass::Extern);
        block.obj_define(&tok("counter"), &ext).unwrap();
        block.propagate("counter", LU_BLOCK).unwrap();
        block.exit().unwrap();

        let lu = block.frame(LU_BLOCK).unwrap();
        assert_eq!(lu.obj().lookup("counter").map(Id::ty), Some(ext));
        assert!(block.propagate("missing", LU_BLOCK).is_err());
    }

    #[test]
    fn test_define_at_invalid_level() {
        let mut block = Block::new();
        let err = block.obj_define_at(7, &tok("x"), &Type::from(BasicKind::Int)).unwrap_err();
        assert_eq!(err, SemaError::InvalidFrame { level: 7, current: 1 });
        block.obj_define_at(LU_BLOCK, &tok("x"), &Type::from(BasicKind::Int)).unwrap();
        assert!(block.obj_lookup("x").is_some());
    }
}
