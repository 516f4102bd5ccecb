//! Static type checker for Source (§4): constraint-based Hindley-Milner
//! inference with an addable-kind overload mechanism and automatic
//! pair/list folding.

pub mod diagnostics;
pub mod env;
pub mod errors;
pub mod infer;
pub mod store;
pub mod subst;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use infer::type_check;
