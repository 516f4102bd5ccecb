//! Diagnostic rendering: human-readable `ariadne` reports or a `serde_json`
//! array, matching the downstream interface described in §6/§8. The
//! teacher's own `diagnostics::emitter` hand-rolls ANSI escapes despite
//! declaring both `ariadne` and `serde_json` as dependencies; this crate
//! actually uses them (see DESIGN.md).

use crate::typeck::Diagnostic;
use ariadne::{Color, Label, Report, ReportKind, Source};

pub fn render_json(diagnostics: &[Diagnostic]) -> String {
    serde_json::to_string_pretty(diagnostics).unwrap_or_else(|_| "[]".to_string())
}

/// Writes one `ariadne` report per diagnostic to stderr.
pub fn render_human(path: &str, source: &str, diagnostics: &[Diagnostic], no_color: bool) {
    for diag in diagnostics {
        let color = if no_color { Color::Unset } else { Color::Yellow };
        let range = diag.span.to_range();
        let range = if range.start == range.end { range.start..range.start + 1 } else { range };
        let report = Report::build(ReportKind::Warning, path, range.start)
            .with_message(diag.message())
            .with_label(
                Label::new((path, range))
                    .with_message(diag.message())
                    .with_color(color),
            )
            .finish();
        let _ = report.eprint((path, Source::from(source)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use crate::typeck::DiagnosticKind;

    #[test]
    fn json_output_is_an_array() {
        let diags = vec![Diagnostic::new(
            DiagnosticKind::UndefinedIdentifier { name: "x".to_string() },
            Span::dummy(),
        )];
        let json = render_json(&diags);
        assert!(json.trim_start().starts_with('['));
    }
}
