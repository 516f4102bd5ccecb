//! Command-line options (§8 downstream interface), parsed with `clap`'s
//! derive API the way the teacher's own (unused) `CompilerOptions`
//! intended to be driven — but actually wired up, matching `main.rs`'s
//! `CompilerOptions::parse()` call.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "source-typeck", version, about = "Static type checker for the Source pedagogical language")]
pub struct CliOptions {
    /// Source file to type-check.
    pub input: PathBuf,

    /// Emit diagnostics as a JSON array instead of human-readable text.
    #[arg(long)]
    pub json: bool,

    /// Disable ANSI colour in human-readable diagnostic output.
    #[arg(long)]
    pub no_color: bool,

    /// Print per-phase timing to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}
