//! Entry point: reads a Source file from disk, runs the pipeline, and
//! reports diagnostics — human-readable by default, JSON with `--json`.

use clap::Parser;
use source_typeck::driver::{self, CliOptions, CompileError};
use source_typeck::report;

fn main() {
    tracing_subscriber::fmt::init();

    let options = CliOptions::parse();
    let path = options.input.clone();
    let json = options.json;
    let no_color = options.no_color;

    let source = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("failed to read {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    match driver::compile(&source, options) {
        Ok(result) => {
            if json {
                println!("{}", report::render_json(&result.diagnostics));
            } else {
                report::render_human(&path.display().to_string(), &source, &result.diagnostics, no_color);
            }
            if result.diagnostics.is_empty() {
                tracing::info!("no type errors found");
            }
            std::process::exit(0);
        }
        Err(CompileError::Lex(e)) => {
            tracing::error!("lex error: unexpected `{}` at {:?}", e.lexeme, e.span);
            std::process::exit(1);
        }
        Err(CompileError::Parse(errors)) => {
            for e in &errors {
                tracing::error!("parse error: {} at {:?}", e.message, e.span);
            }
            std::process::exit(1);
        }
    }
}
