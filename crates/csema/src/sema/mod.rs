//! Scopes and symbol tables
//!
//! This module keeps track of which names are visible where: per-scope
//! symbol tables, the block stack with its linkage-unit and
//! compilation-unit frames, and the label namespace of a function body.

mod analysis;
mod block;
mod config;
mod function;
mod id;
mod stab;

pub use analysis::Analysis;
pub use block::{Block, Frame, CU_BLOCK, LU_BLOCK};
pub use config::AnalysisConfig;
pub use function::FunctionScope;
pub use id::Id;
pub use stab::Stab;
