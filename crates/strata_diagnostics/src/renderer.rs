//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use strata_source::SourceDb;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// error[E101]: unterminated continuation
///   --> src/physics.f90:10:1
///    |
/// 10 | use atmos_mod, &
///    | ^
///    = note: statement continues past end of file
/// ```
pub struct TerminalRenderer;

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "{}[{}]: {}\n",
            diag.severity, diag.code, diag.message
        ));

        if !diag.primary_span.is_dummy() {
            let resolved = source_db.resolve_span(diag.primary_span);
            out.push_str(&format!("  --> {resolved}\n"));

            let file = source_db.get_file(diag.primary_span.file);
            let (line, col) = file.line_col(diag.primary_span.start);
            let line_num = format!("{line}");
            let padding = " ".repeat(line_num.len());
            let line_content = source_line(&file.content, diag.primary_span.start);

            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {line_content}\n"));

            let span_len = (diag.primary_span.end - diag.primary_span.start).max(1) as usize;
            let carets = "^".repeat(span_len);
            let col_padding = " ".repeat((col as usize).saturating_sub(1));
            out.push_str(&format!("{padding} | {col_padding}{carets}\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

/// Extracts the line of source text containing the given byte offset.
fn source_line(content: &str, byte_offset: u32) -> &str {
    let offset = byte_offset as usize;
    let start = content[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |pos| offset + pos);
    &content[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;
    use strata_source::Span;

    #[test]
    fn render_error_with_span() {
        let mut source_db = SourceDb::new();
        let file_id = source_db.add_source("test.f90", "use broken_mod &\n".to_string());

        let span = Span::new(file_id, 4, 14);
        let diag = Diagnostic::error(DiagnosticCode::EXTRACTION, "unterminated continuation", span);

        let output = TerminalRenderer::new().render(&diag, &source_db);
        assert!(output.contains("error[E101]: unterminated continuation"));
        assert!(output.contains("--> test.f90:1:5"));
        assert!(output.contains("use broken_mod &"));
        assert!(output.contains("^^^^^^^^^^"));
    }

    #[test]
    fn render_dummy_span_no_location() {
        let source_db = SourceDb::new();
        let diag = Diagnostic::error(DiagnosticCode::TOOL_FAILURE, "link failed", Span::DUMMY)
            .with_note("undefined reference to `solver_mod`");

        let output = TerminalRenderer::new().render(&diag, &source_db);
        assert!(output.contains("error[E401]: link failed"));
        assert!(!output.contains("-->"));
        assert!(output.contains("= note: undefined reference"));
    }
}
