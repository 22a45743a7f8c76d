use crate::{Diagnostic, SourceFile, Span};

/// `name:line: message`, the line holding `span`, and a caret run under the span, each line
/// newline-terminated.
pub fn render_at(source: &SourceFile, span: Span, message: &str) -> String {
    let loc = source.location(span);
    let mut out = format!("{}:{}: {}\n{}\n", loc.name, loc.line, message, loc.source_line);
    out.extend(std::iter::repeat_n(' ', loc.start_col as usize));
    out.extend(std::iter::repeat_n(
        '^',
        loc.end_col.saturating_sub(loc.start_col) as usize,
    ));
    out.push('\n');
    out
}

/// One diagnostic, without a trailing newline.
pub fn render_diagnostic(source: &SourceFile, diag: &Diagnostic) -> String {
    match diag.span {
        Some(span) => {
            let mut out = render_at(source, span, &diag.message);
            out.pop();
            out
        }
        None => format!("{}: {}", source.name, diag.message),
    }
}
