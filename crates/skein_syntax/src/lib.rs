//! Source text, spans, tokens and diagnostics shared by the front end and the shell.

mod diagnostic;
mod loc;
mod render;
mod source;
mod span;
mod str_util;
mod token;
mod util;

pub use diagnostic::Diagnostic;
pub use loc::DiagnosticKind;
pub use render::{render_at, render_diagnostic};
pub use source::{Location, SourceFile, SourceId, SourceText};
pub use span::{ByteIndex, Span};
pub use str_util::unquote;
pub use token::{Token, TokenKind};
pub use util::{is_ident_continue, is_ident_start};
