//! C type model
//!
//! Types are built bottom-up by the parser from declaration specifiers and
//! declarators, folded together when a name is declared more than once,
//! and queried by expression analysis (`subscript`, `deref`, `call`,
//! `member`).

mod aggregate;
mod display;
mod kinds;
mod merge;
mod node;

pub use kinds::{BasicKind, Sign, StorageClass, TagKind};
pub use node::Type;
