/// Syntax errors, worded as the shell reports them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    // Lexer
    UnterminatedBlockComment,
    UnmatchedDelimiter(char),
    UnterminatedString,
    UnexpectedChar(char),
    UnclosedDelimiter(char),
    MalformedNumber,

    // Parser
    UnexpectedToken(String),
    InvalidAssignmentTarget,
    KeywordAsIdentifier(String),
    IllegalBreak,
    IllegalContinue,
    IllegalReturn,
    MissingInitializer(String),
    MissingCatchOrFinally,

    // Custom
    Raw(String),
}

pub struct DiagnosticsFormatter;

impl DiagnosticsFormatter {
    pub fn format(kind: &DiagnosticKind) -> String {
        match kind {
            DiagnosticKind::UnterminatedBlockComment => "Unterminated block comment".into(),
            DiagnosticKind::UnmatchedDelimiter(c) => format!("Unexpected token '{}'", c),
            DiagnosticKind::UnterminatedString => "Invalid or unexpected token".into(),
            DiagnosticKind::UnexpectedChar(c) => format!("Invalid or unexpected token '{}'", c),
            DiagnosticKind::UnclosedDelimiter(_) => "Unexpected end of input".into(),
            DiagnosticKind::MalformedNumber => "Invalid or unexpected token".into(),

            DiagnosticKind::UnexpectedToken(s) => format!("Unexpected token '{}'", s),
            DiagnosticKind::InvalidAssignmentTarget => {
                "Invalid left-hand side in assignment".into()
            }
            DiagnosticKind::KeywordAsIdentifier(kw) => format!("Unexpected token '{}'", kw),
            DiagnosticKind::IllegalBreak => "Illegal break statement".into(),
            DiagnosticKind::IllegalContinue => {
                "Illegal continue statement: no surrounding iteration statement".into()
            }
            DiagnosticKind::IllegalReturn => "Illegal return statement".into(),
            DiagnosticKind::MissingInitializer(name) => {
                format!("Missing initializer in const declaration '{}'", name)
            }
            DiagnosticKind::MissingCatchOrFinally => "Missing catch or finally after try".into(),

            DiagnosticKind::Raw(s) => s.clone(),
        }
    }
}
