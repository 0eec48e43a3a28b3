//! Analysis context
//!
//! An [`Analysis`] owns every piece of mutable scope state for one run:
//! the block stack, the label namespace of the function being parsed and
//! the errors kept so far. Independent runs use independent values.
//!
//! The tag tables of linked compilation units are kept until the next
//! [`Analysis::reset`]: linked objects may refer to those aggregates, and
//! links between mutually recursive aggregates are partly weak.

use log::debug;

use super::block::{CU_BLOCK, LU_BLOCK};
use super::{AnalysisConfig, Block, FunctionScope, Id, Stab};
use crate::common::{SemaError, SemaResult};
use crate::token::Token;
use crate::types::{StorageClass, Type};

#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
    block: Block,
    function: FunctionScope,
    linked_tags: Vec<Stab>,
    diagnostics: Vec<SemaError>,
}

impl Analysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            block: Block::new(),
            function: FunctionScope::new(),
            linked_tags: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn block_mut(&mut self) -> &mut Block {
        &mut self.block
    }

    pub fn function(&self) -> &FunctionScope {
        &self.function
    }

    // ==================== Blocks ====================

    pub fn enter_block(&mut self) {
        self.block.enter();
    }

    pub fn exit_block(&mut self) -> SemaResult<()> {
        self.block.exit()
    }

    pub fn obj_define(&mut self, token: &Token, ty: &Type) -> SemaResult<()> {
        self.block.obj_define(token, ty)
    }

    pub fn obj_lookup(&self, name: &str) -> Option<&Id> {
        self.block.obj_lookup(name)
    }

    pub fn tag_define(&mut self, token: &Token, ty: &Type) -> SemaResult<()> {
        self.block.tag_define(token, ty)
    }

    pub fn tag_lookup(&self, name: &str) -> Option<&Id> {
        self.block.tag_lookup(name)
    }

    // ==================== Functions ====================

    /// Start a function body: fresh labels and a block for the parameters
    pub fn enter_function(&mut self) {
        self.function.enter();
        self.block.enter();
    }

    /// Leave a function body. Returns the labels that were used but never
    /// defined, when label checking is enabled.
    pub fn exit_function(&mut self) -> Vec<SemaError> {
        let mut errors = self.function.exit();
        if !self.config.check_labels {
            errors.clear();
        }
        if let Err(err) = self.block.exit() {
            errors.push(err);
        }
        errors
    }

    pub fn label_define(&mut self, token: &Token) -> SemaResult<()> {
        self.function.label_define(token)
    }

    pub fn label_use(&mut self, token: &Token) -> Type {
        self.function.label_use(token)
    }

    // ==================== Linking ====================

    /// Fold the file-scope names of the finished compilation unit that
    /// have external linkage into the linkage-unit frame, then start an
    /// empty compilation unit. Returns the cross-unit conflicts.
    pub fn link_compilation_unit(&mut self) -> Vec<SemaError> {
        let mut unit = self.block.take_compilation_unit();
        self.linked_tags.push(unit.take_tags());
        let mut external = Stab::new();
        for (_, id) in unit.obj() {
            let storage = id.ty().storage_class();
            if !matches!(storage, StorageClass::Static | StorageClass::Typedef) {
                external.insert(id.clone());
            }
        }
        debug!(
            "linking {} of {} file-scope name(s)",
            external.len(),
            unit.obj().len()
        );
        self.block.merge_into(LU_BLOCK, &external)
    }

    /// Tag tables of the compilation units linked so far, oldest first
    pub fn linked_tags(&self) -> &[Stab] {
        &self.linked_tags
    }

    /// Forget everything, as if newly created with the same configuration
    pub fn reset(&mut self) {
        debug!("analysis state reset");
        *self = Self::new(self.config);
    }

    // ==================== Diagnostics ====================

    /// Keep `err` for later inspection (or only log it, depending on the
    /// configuration). Analysis continues either way.
    pub fn report(&mut self, err: SemaError) {
        debug!("reported: {err}");
        if self.config.record_diagnostics {
            self.diagnostics.push(err);
        }
    }

    pub fn diagnostics(&self) -> &[SemaError] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<SemaError> {
        std::mem::take(&mut self.diagnostics)
    }
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Type {
    /// Define the identifier this declarator names in the innermost scope.
    ///
    /// A declarator still ending in an abstract placeholder (`static x;`)
    /// gets the implicit `int`, unless that is disabled.
    pub fn declare(&self, analysis: &mut Analysis) -> SemaResult<()> {
        let Some(token) = self.token() else {
            return Err(SemaError::NotDeclarable {
                found: self.to_string(),
            });
        };

        if let Some(leaf) = self.abstract_leaf() {
            if !analysis.config.implicit_int {
                return Err(SemaError::UnresolvedAbstract {
                    name: token.name().to_string(),
                    span: token.span(),
                });
            }
            leaf.set_abstract(&leaf.get_default_specifier());
        }

        let level = analysis.block.current_block();
        debug!("declaring {self} in block {level}{}", if level == CU_BLOCK { " (file scope)" } else { "" });
        analysis.obj_define(&token, &self.ty())
    }
}
