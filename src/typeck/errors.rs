//! Internal error regime (§7): raised by the constraint store and
//! substitution walker, caught at every call site in the inferencer, and
//! converted into a [`crate::typeck::diagnostics::Diagnostic`]. These
//! types never cross the inferencer's output boundary.

use crate::typeck::types::Term;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum UnifyError {
    Mismatch { expected: Term, found: Term },
    NotAddable { found: Term },
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnifyError::Mismatch { expected, found } => {
                write!(f, "cannot unify `{expected}` with `{found}`")
            }
            UnifyError::NotAddable { found } => {
                write!(f, "`{found}` does not support addable operators")
            }
        }
    }
}

impl std::error::Error for UnifyError {}

#[derive(Debug, Clone, PartialEq)]
pub struct CyclicError {
    pub var: Term,
    pub in_term: Term,
}

impl fmt::Display for CyclicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cyclic type: `{}` occurs in `{}`", self.var, self.in_term)
    }
}

impl std::error::Error for CyclicError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ArityError {
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for ArityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {} argument(s), found {}", self.expected, self.found)
    }
}

impl std::error::Error for ArityError {}

/// The escape hatch: a unification failure the inferencer could not map
/// onto one of the closed diagnostic kinds (e.g. a genuinely malformed
/// AST invariant violation). Distinct from a user type error.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalTypeError {
    pub message: String,
}

impl fmt::Display for InternalTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal type error: {}", self.message)
    }
}

impl std::error::Error for InternalTypeError {}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Unify(UnifyError),
    Cyclic(CyclicError),
    Arity(ArityError),
    Internal(InternalTypeError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unify(e) => write!(f, "{e}"),
            StoreError::Cyclic(e) => write!(f, "{e}"),
            StoreError::Arity(e) => write!(f, "{e}"),
            StoreError::Internal(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<UnifyError> for StoreError {
    fn from(e: UnifyError) -> Self {
        StoreError::Unify(e)
    }
}
impl From<CyclicError> for StoreError {
    fn from(e: CyclicError) -> Self {
        StoreError::Cyclic(e)
    }
}
impl From<ArityError> for StoreError {
    fn from(e: ArityError) -> Self {
        StoreError::Arity(e)
    }
}
impl From<InternalTypeError> for StoreError {
    fn from(e: InternalTypeError) -> Self {
        StoreError::Internal(e)
    }
}
