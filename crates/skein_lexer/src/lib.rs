//! skein_lexer: lexer crate.
//!
//! Tokenizes script text and collects diagnostics.
//! Entry point: `Lexer::new(input).lex()`.
mod keywords;
mod lexer;

pub use lexer::{LexResult, Lexer};
