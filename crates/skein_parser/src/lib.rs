//!
//!
//!
//!
mod expr;
mod parser;
mod stmt;

pub use parser::{ParseResult, Parser, parse_source};
pub use skein_ir::*;
