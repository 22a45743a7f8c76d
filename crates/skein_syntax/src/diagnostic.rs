use crate::Span;
use crate::loc::{DiagnosticKind, DiagnosticsFormatter};

/// A syntax error found by the lexer or parser. The first one stops compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn error_kind(kind: DiagnosticKind, span: Option<Span>) -> Self {
        Self::error(DiagnosticsFormatter::format(&kind), span)
    }
}
