//! Compiler session: the timed lex -> parse -> type-check pipeline,
//! grounded on the teacher's `driver::session::CompilerSession::compile`
//! stage-by-stage structure (with the unimplemented MIR/codegen stages
//! dropped, since this crate's output is diagnostics, not a binary).

use crate::driver::{CompileError, CompileResult, CompileTiming};
use crate::driver::options::CliOptions;
use std::time::Instant;

pub struct CompilerSession {
    options: CliOptions,
    timing: CompileTiming,
}

impl CompilerSession {
    pub fn new(options: CliOptions) -> Self {
        Self { options, timing: CompileTiming::default() }
    }

    pub fn compile(&mut self, source: &str) -> Result<CompileResult, CompileError> {
        let start = Instant::now();

        let lexing_start = Instant::now();
        let tokens = crate::lexer::tokenize(source).map_err(|e| CompileError::Lex(e))?;
        self.timing.lexing_us = lexing_start.elapsed().as_micros() as u64;

        let parsing_start = Instant::now();
        let mut parser = crate::parser::Parser::new(tokens);
        let mut program = parser.parse_program();
        let parse_errors = parser.into_errors();
        self.timing.parsing_us = parsing_start.elapsed().as_micros() as u64;
        if !parse_errors.is_empty() {
            return Err(CompileError::Parse(parse_errors));
        }

        let typeck_start = Instant::now();
        let diagnostics = crate::typeck::type_check(&mut program);
        self.timing.type_checking_us = typeck_start.elapsed().as_micros() as u64;

        self.timing.total_us = start.elapsed().as_micros() as u64;

        if self.options.verbose {
            eprintln!(
                "lexing: {}us, parsing: {}us, type checking: {}us, total: {}us",
                self.timing.lexing_us,
                self.timing.parsing_us,
                self.timing.type_checking_us,
                self.timing.total_us
            );
        }

        Ok(CompileResult { program, diagnostics, timing: std::mem::take(&mut self.timing) })
    }
}
