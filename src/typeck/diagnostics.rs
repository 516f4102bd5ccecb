//! The closed diagnostic kind set (§6 downstream interface).
//!
//! Every diagnostic is tagged `severity = warning`, `kind_tag = type` —
//! the core never raises a hard error to its caller for a user type
//! error, only these accumulated, ordered diagnostics.

use crate::span::Span;
use crate::typeck::types::Term;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        Self { kind, severity: Severity::Warning, span }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            DiagnosticKind::InvalidArgumentTypes { expected, received, .. } => format!(
                "expected argument(s) of type {}, got {}",
                display_terms(expected),
                display_terms(received)
            ),
            DiagnosticKind::DifferentNumberArguments { expected, received } => format!(
                "expected {expected} argument(s), but got {received}"
            ),
            DiagnosticKind::InvalidTestCondition { received } => {
                format!("expected condition of type boolean, got {received}")
            }
            DiagnosticKind::ConsequentAlternateMismatch { consequent, alternate } => format!(
                "consequent has type {consequent}, but alternate has type {alternate}"
            ),
            DiagnosticKind::CyclicReference { name } => {
                format!("cyclic type reference in declaration of `{name}`")
            }
            DiagnosticKind::ReassignConst { name } => {
                format!("cannot assign new value to constant `{name}`")
            }
            DiagnosticKind::DifferentAssignment { name, expected, received } => format!(
                "cannot assign type {received} to `{name}` of type {expected}"
            ),
            DiagnosticKind::ArrayAssignment { expected, received } => format!(
                "cannot assign type {received} to array of type {expected}"
            ),
            DiagnosticKind::InvalidArrayIndexType { received } => {
                format!("expected array index of type number, got {received}")
            }
            DiagnosticKind::UndefinedIdentifier { name } => {
                format!("undefined identifier `{name}`")
            }
            DiagnosticKind::InternalTypeError { message } => {
                format!("internal type error: {message}")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum DiagnosticKind {
    InvalidArgumentTypes {
        #[serde(skip)]
        expected: Vec<Term>,
        #[serde(skip)]
        received: Vec<Term>,
        argument_spans: Vec<Span>,
    },
    DifferentNumberArguments {
        expected: usize,
        received: usize,
    },
    InvalidTestCondition {
        #[serde(skip)]
        received: Term,
    },
    ConsequentAlternateMismatch {
        #[serde(skip)]
        consequent: Term,
        #[serde(skip)]
        alternate: Term,
    },
    CyclicReference {
        name: String,
    },
    ReassignConst {
        name: String,
    },
    DifferentAssignment {
        name: String,
        #[serde(skip)]
        expected: Term,
        #[serde(skip)]
        received: Term,
    },
    ArrayAssignment {
        #[serde(skip)]
        expected: Term,
        #[serde(skip)]
        received: Term,
    },
    InvalidArrayIndexType {
        #[serde(skip)]
        received: Term,
    },
    UndefinedIdentifier {
        name: String,
    },
    InternalTypeError {
        message: String,
    },
}

fn display_terms(terms: &[Term]) -> String {
    terms.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_formats_undefined_identifier() {
        let d = Diagnostic::new(
            DiagnosticKind::UndefinedIdentifier { name: "foo".to_string() },
            Span::dummy(),
        );
        assert_eq!(d.message(), "undefined identifier `foo`");
    }

    #[test]
    fn severity_is_always_warning() {
        let d = Diagnostic::new(DiagnosticKind::ReassignConst { name: "x".into() }, Span::dummy());
        assert_eq!(d.severity, Severity::Warning);
    }
}
