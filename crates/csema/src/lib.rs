//! csema - symbol tables and type model for C source analysis
//!
//! This library keeps track of the declarations of a C program while it is
//! parsed, so that refactoring tools can ask what every identifier refers
//! to and what its type is.
//!
//! ## Architecture
//!
//! The library is organized into:
//! - **Types** (`types/`): Type handles, declarator building, derivation
//!   and the merging of repeated declarations
//! - **Sema** (`sema/`): Symbol tables, the block scope stack, function
//!   labels and the per-run analysis context
//! - **Common** (`common/`): Shared infrastructure (errors, spans,
//!   diagnostics)

pub mod common;
pub mod sema;
pub mod token;
pub mod types;

// Re-exports for convenience
pub use common::{DiagnosticReporter, MergeError, SemaError, SemaResult, Span};
pub use sema::{Analysis, AnalysisConfig, Block, FunctionScope, Id, Stab};
pub use token::Token;
pub use types::{BasicKind, Sign, StorageClass, TagKind, Type};
