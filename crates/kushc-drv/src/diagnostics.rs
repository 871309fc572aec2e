//! Renders [`Diagnostic`]s in the driver's user-visible format
//! (spec.md §7: `[level] <file>:<startLine>[-<stopLine>]:<startCol>-<stopCol>: <message>`).
//!
//! [`kushc_util::span::Span`] only records a single `line`/`column`
//! pair (the span's start), not an independent stop line/column, so
//! the stop position here is approximated from `Span::len()` on the
//! assumption the span doesn't cross a line boundary — true for every
//! diagnostic this compiler currently emits (single tokens, single
//! identifiers, single expressions reported at their head). See
//! DESIGN.md's Open Questions for the full reasoning.

use kushc_util::Diagnostic;
use kushc_util::span::SourceMap;

pub fn format_diagnostic(diag: &Diagnostic, sources: &SourceMap) -> String {
    let file_name = sources
        .get(diag.span.file_id)
        .map(|file| file.name().to_string())
        .unwrap_or_else(|| "<unknown>".to_string());

    let start_col = diag.span.column;
    let stop_col = start_col + diag.span.len().max(1) as u32 - 1;

    let mut out = format!(
        "[{}] {}:{}:{}-{}: {}",
        diag.level.name(),
        file_name,
        diag.span.line,
        start_col,
        stop_col,
        diag.message
    );

    for note in &diag.notes {
        out.push_str(&format!("\n    note: {note}"));
    }
    for help in &diag.helps {
        out.push_str(&format!("\n    help: {help}"));
    }

    out
}

pub fn emit_all(diagnostics: &[Diagnostic], sources: &SourceMap) {
    for diag in diagnostics {
        eprintln!("{}", format_diagnostic(diag, sources));
    }
}
