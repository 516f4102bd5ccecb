//! Driver module: the boundary between the library crate's pipeline and
//! the command-line binary, grounded on the teacher's `driver::mod`
//! top-level `compile()` function and result/error/timing types.

pub mod options;
pub mod session;

pub use options::CliOptions;
pub use session::CompilerSession;

use crate::lexer::LexError;
use crate::parser::{ast::Program, ParseError};
use crate::typeck::Diagnostic;

/// Runs the full pipeline over `source` with `options` controlling
/// output format and verbosity.
pub fn compile(source: &str, options: CliOptions) -> Result<CompileResult, CompileError> {
    let mut session = CompilerSession::new(options);
    session.compile(source)
}

#[derive(Debug)]
pub struct CompileResult {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
    pub timing: CompileTiming,
}

#[derive(Debug)]
pub enum CompileError {
    Lex(LexError),
    Parse(Vec<ParseError>),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "lex error at {:?}: unexpected `{}`", e.span, e.lexeme),
            CompileError::Parse(errors) => {
                write!(f, "{} parse error(s)", errors.len())?;
                for e in errors {
                    write!(f, "\n  - {} at {:?}", e.message, e.span)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug, Default, Clone, Copy)]
pub struct CompileTiming {
    pub lexing_us: u64,
    pub parsing_us: u64,
    pub type_checking_us: u64,
    pub total_us: u64,
}
