//! Parser.
//!
//! Converts lexer tokens into a syntax tree (Program/Stmt/Expr) and collects diagnostics.
//! The implementation uses a recursive-descent statement parser plus Pratt parsing for
//! expressions. `var` names and function declarations are collected per function body so the
//! runtime can hoist them.
use std::rc::Rc;

use skein_lexer::Lexer;
use skein_syntax::{Diagnostic, DiagnosticKind, Span, Token, TokenKind};

use crate::{BinaryOp, FunctionNode, Name, Program, ScopeInfo, Stmt};

/// Parse result.
pub struct ParseResult {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Default)]
pub(crate) struct ScopeBuilder {
    vars: Vec<Name>,
    functions: Vec<Rc<FunctionNode>>,
    pub(crate) loop_depth: u32,
    pub(crate) in_function: bool,
}

impl ScopeBuilder {
    fn finish(self) -> ScopeInfo {
        ScopeInfo {
            vars: self.vars.into_boxed_slice(),
            functions: self.functions.into_boxed_slice(),
        }
    }
}

/// Script parser.
pub struct Parser<'a> {
    pub input: &'a str,
    pub tokens: &'a [Token],
    pub i: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub(crate) scopes: Vec<ScopeBuilder>,
    /// Set while parsing a `for (...)` head, where `in` ends the expression.
    pub(crate) no_in: bool,
    depth: u32,
}

/// Nesting beyond this is reported instead of overflowing the native stack.
const MAX_NESTING: u32 = 256;

/// Lexes and parses in one go; lexer diagnostics come first.
pub fn parse_source(input: &str) -> ParseResult {
    let lex = Lexer::new(input).lex();
    let mut result = Parser::new(input, &lex.tokens).parse();
    if !lex.diagnostics.is_empty() {
        let mut diagnostics = lex.diagnostics;
        diagnostics.append(&mut result.diagnostics);
        result.diagnostics = diagnostics;
    }
    result
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    pub fn new(input: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            input,
            tokens,
            i: 0,
            diagnostics: Vec::with_capacity(8),
            scopes: vec![ScopeBuilder::default()],
            no_in: false,
            depth: 0,
        }
    }

    /// Parse the full input and return a program plus diagnostics.
    pub fn parse(mut self) -> ParseResult {
        let mut stmts: Vec<Stmt> = Vec::with_capacity(8);
        loop {
            self.skip_trivia();
            if self.at(TokenKind::Eof) {
                break;
            }
            let before = self.i;
            let stmt = match self.parse_stmt() {
                Some(stmt) => stmt,
                None => self.recover_stmt(),
            };
            stmts.push(stmt);
            if self.i == before {
                self.bump();
            }
        }
        let scope = self.scopes.pop().unwrap_or_default().finish();

        ParseResult {
            program: Program {
                body: stmts.into_boxed_slice(),
                scope,
            },
            diagnostics: self.diagnostics,
        }
    }

    pub(crate) fn enter_function(&mut self) {
        self.scopes.push(ScopeBuilder {
            in_function: true,
            ..ScopeBuilder::default()
        });
    }

    pub(crate) fn exit_function(&mut self) -> ScopeInfo {
        self.scopes.pop().unwrap_or_default().finish()
    }

    pub(crate) fn scope(&mut self) -> &mut ScopeBuilder {
        if self.scopes.is_empty() {
            self.scopes.push(ScopeBuilder::default());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub(crate) fn declare_var(&mut self, name: &Name) {
        let scope = self.scope();
        if !scope.vars.iter().any(|v| v == name) {
            scope.vars.push(name.clone());
        }
    }

    pub(crate) fn declare_function(&mut self, func: Rc<FunctionNode>) {
        self.scope().functions.push(func);
    }

    /// Guards recursion depth; returns false (with a diagnostic) when nesting is too deep.
    pub(crate) fn descend(&mut self) -> bool {
        if self.depth >= MAX_NESTING {
            let span = self.cur_span();
            self.diagnostics
                .push(Diagnostic::error("Maximum nesting depth exceeded", Some(span)));
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn recover_stmt(&mut self) -> Stmt {
        let start_span = self.cur_span();
        let mut brace_depth = 0;
        while !self.at(TokenKind::Eof) {
            if self.at(TokenKind::LBrace) {
                brace_depth += 1;
                self.bump();
                continue;
            }
            if self.at(TokenKind::RBrace) {
                if brace_depth > 0 {
                    brace_depth -= 1;
                    self.bump();
                    continue;
                }
                // Leave unmatched `}` to the enclosing block.
                break;
            }
            if brace_depth == 0 && (self.at(TokenKind::StmtEnd) || self.at(TokenKind::Newline)) {
                break;
            }
            self.bump();
        }
        if self.at(TokenKind::StmtEnd) || self.at(TokenKind::Newline) {
            self.bump();
        }
        Stmt::Error(Span::new(start_span.start.0, self.cur_span().end.0))
    }

    pub fn expect_ident(&mut self) -> Option<(Name, Span)> {
        self.skip_trivia();
        if self.peek_kind().is_keyword() {
            let t = self.bumped();
            let kw = self.token_text(&t).to_string();
            self.diagnostics.push(Diagnostic::error_kind(
                DiagnosticKind::KeywordAsIdentifier(kw),
                Some(t.span),
            ));
            return None;
        }
        let t = self.expect(TokenKind::Ident)?;
        Some((Name::from(self.token_text(&t)), t.span))
    }

    pub fn expect_stmt_terminator(&mut self) -> Option<()> {
        if self.at(TokenKind::StmtEnd) || self.at(TokenKind::Newline) {
            self.bump();
            return Some(());
        }
        if self.at(TokenKind::Eof) || self.at(TokenKind::RBrace) {
            return Some(());
        }
        self.unexpected();
        None
    }

    pub fn expect(&mut self, kind: TokenKind) -> Option<Token> {
        self.skip_trivia();
        if self.at(kind) {
            return Some(self.bumped());
        }
        self.unexpected();
        None
    }

    /// Reports the current token as unexpected.
    pub fn unexpected(&mut self) {
        let span = self.cur_span();
        let kind = if self.at(TokenKind::Eof) {
            DiagnosticKind::UnclosedDelimiter(' ')
        } else {
            let text = self.input[span.start.0 as usize..span.end.0 as usize].to_string();
            match self.peek_kind() {
                TokenKind::Str => DiagnosticKind::Raw("Unexpected string".into()),
                TokenKind::Number => DiagnosticKind::Raw("Unexpected number".into()),
                TokenKind::Ident => DiagnosticKind::Raw(format!("Unexpected identifier '{text}'")),
                _ => DiagnosticKind::UnexpectedToken(text),
            }
        };
        self.diagnostics.push(Diagnostic::error_kind(kind, Some(span)));
    }

    pub fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.i)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub fn peek_kind_n(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.i + n).map(|t| t.kind)
    }

    /// Kind of the next token that is not a `Newline`.
    pub fn peek_past_newlines(&self) -> TokenKind {
        self.tokens[self.i.min(self.tokens.len())..]
            .iter()
            .map(|t| t.kind)
            .find(|k| *k != TokenKind::Newline)
            .unwrap_or(TokenKind::Eof)
    }

    pub fn bumped(&mut self) -> Token {
        match self.tokens.get(self.i) {
            Some(t) => {
                self.i += 1;
                t.clone()
            }
            None => Token {
                kind: TokenKind::Eof,
                span: self.cur_span(),
            },
        }
    }

    pub fn bump(&mut self) {
        if self.i < self.tokens.len() {
            self.i += 1;
        }
    }

    pub fn skip_trivia(&mut self) {
        while self.at(TokenKind::Newline) {
            self.i += 1;
        }
    }

    pub fn cur_span(&self) -> Span {
        self.tokens
            .get(self.i)
            .map(|t| t.span)
            .unwrap_or_else(|| Span::new(self.input.len() as u32, self.input.len() as u32))
    }

    /// End of the most recently consumed token.
    pub fn prev_end(&self) -> u32 {
        self.i
            .checked_sub(1)
            .and_then(|j| self.tokens.get(j))
            .map(|t| t.span.end.0)
            .unwrap_or(0)
    }

    pub fn token_text(&self, t: &Token) -> &'a str {
        &self.input[t.span.start.0 as usize..t.span.end.0 as usize]
    }
}

pub fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::BitOr => (5, 6),
        BinaryOp::BitXor => (7, 8),
        BinaryOp::BitAnd => (9, 10),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::StrictEq | BinaryOp::StrictNe => (11, 12),
        BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge
        | BinaryOp::In
        | BinaryOp::Instanceof => (13, 14),
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => (15, 16),
        BinaryOp::Add | BinaryOp::Sub => (17, 18),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (19, 20),
    }
}

/// `||` and `&&` sit below every binary operator.
pub const OR_BP: (u8, u8) = (1, 2);
pub const AND_BP: (u8, u8) = (3, 4);

pub fn parse_number_literal(text: &str) -> f64 {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let radix = match cleaned.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => 10,
    };
    if radix == 10 {
        return cleaned.parse::<f64>().unwrap_or(f64::NAN);
    }
    cleaned[2..]
        .chars()
        .try_fold(0f64, |acc, c| c.to_digit(radix).map(|d| acc * radix as f64 + d as f64))
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::parse_number_literal;

    #[test]
    fn number_literals() {
        assert_eq!(parse_number_literal("0x1F"), 31.0);
        assert_eq!(parse_number_literal("0o17"), 15.0);
        assert_eq!(parse_number_literal("0b101"), 5.0);
        assert_eq!(parse_number_literal("1_000"), 1000.0);
        assert_eq!(parse_number_literal(".5"), 0.5);
        assert_eq!(parse_number_literal("1e3"), 1000.0);
        assert_eq!(parse_number_literal("0xFFFFFFFFFFFFFFFFFF"), 4722366482869645213696.0);
    }
}
