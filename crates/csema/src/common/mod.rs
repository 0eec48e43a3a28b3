//! Common infrastructure shared by the type model and the symbol tables

mod error;
mod span;

pub use error::{DiagnosticReporter, MergeError, SemaError, SemaResult};
pub use span::Span;
