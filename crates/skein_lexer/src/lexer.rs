//! Lexer implementation.
//!
//! Scans script text into tokens (keywords/idents/literals/punctuators), emits `Newline` tokens
//! where a line break may end a statement, and collects diagnostics.
//!
//! Design: single linear pass with a delimiter stack; newlines inside `(`/`[` or after a token
//! that cannot end an expression are dropped so the parser only sees the ones that matter.
use crate::keywords::KEYWORDS;
use skein_syntax::{
    Diagnostic, DiagnosticKind, Span, Token, TokenKind, is_ident_continue, is_ident_start,
};

/// Lexing result.
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Longest spellings first so a prefix never shadows a longer operator.
const PUNCTUATORS: &[(&str, TokenKind)] = &[
    (">>>=", TokenKind::UShrEq),
    ("===", TokenKind::EqEqEq),
    ("!==", TokenKind::NeEq),
    (">>>", TokenKind::UShr),
    ("<<=", TokenKind::ShlEq),
    (">>=", TokenKind::ShrEq),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::Ne),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("!", TokenKind::Bang),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("=", TokenKind::Eq),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    (",", TokenKind::Comma),
    (";", TokenKind::StmtEnd),
    (".", TokenKind::Dot),
];

/// Script lexer.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    i: usize,
    diagnostics: Vec<Diagnostic>,
    tokens: Vec<Token>,
    delim_stack: Vec<char>,
    last_kind: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            i: 0,
            diagnostics: Vec::new(),
            tokens: Vec::new(),
            delim_stack: Vec::new(),
            last_kind: None,
        }
    }

    /// Run the lexer and return tokens + diagnostics.
    pub fn lex(mut self) -> LexResult {
        let approx = self.bytes.len().saturating_div(4).max(32);
        self.tokens.reserve(approx);
        if self.peek_str("#!") {
            self.skip_line();
        }
        while self.i < self.bytes.len() {
            let start = self.i;
            let Some(c) = self.peek_char() else {
                break;
            };

            match c {
                '\n' | '\u{2028}' | '\u{2029}' => {
                    self.i += c.len_utf8();
                    self.line_break(start);
                }
                '\r' => {
                    self.i += 1;
                    if self.peek_char() == Some('\n') {
                        self.i += 1;
                    }
                    self.line_break(start);
                }
                c if c.is_whitespace() || c == '\u{feff}' => {
                    self.i += c.len_utf8();
                }
                '/' if self.peek_str("//") => {
                    self.skip_line();
                }
                '/' if self.peek_str("/*") => {
                    self.lex_block_comment();
                }
                '(' | '[' | '{' => {
                    self.i += 1;
                    self.delim_stack.push(c);
                    let kind = match c {
                        '(' => TokenKind::LParen,
                        '[' => TokenKind::LBracket,
                        _ => TokenKind::LBrace,
                    };
                    self.push(kind, start, self.i);
                }
                ')' | ']' | '}' => {
                    self.i += 1;
                    let open = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    if self.delim_stack.last() == Some(&open) {
                        self.delim_stack.pop();
                    } else {
                        self.diagnostics.push(Diagnostic::error_kind(
                            DiagnosticKind::UnmatchedDelimiter(c),
                            Some(Span::new(start as u32, self.i as u32)),
                        ));
                    }
                    let kind = match c {
                        ')' => TokenKind::RParen,
                        ']' => TokenKind::RBracket,
                        _ => TokenKind::RBrace,
                    };
                    self.push(kind, start, self.i);
                }
                '"' | '\'' => {
                    self.lex_string(c);
                }
                '.' if self.bytes.get(self.i + 1).is_some_and(|b| b.is_ascii_digit()) => {
                    self.lex_number();
                }
                ch if ch.is_ascii_digit() => {
                    self.lex_number();
                }
                ch if is_ident_start(ch) || ch == '\\' => {
                    self.lex_ident_or_keyword();
                }
                other => {
                    if let Some((text, kind)) =
                        PUNCTUATORS.iter().find(|(text, _)| self.peek_str(text))
                    {
                        self.i += text.len();
                        self.push(*kind, start, self.i);
                    } else {
                        self.i += other.len_utf8();
                        self.diagnostics.push(Diagnostic::error_kind(
                            DiagnosticKind::UnexpectedChar(other),
                            Some(Span::new(start as u32, self.i as u32)),
                        ));
                    }
                }
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.i as u32, self.i as u32),
        });
        for ch in self.delim_stack.iter().rev() {
            self.diagnostics.push(Diagnostic::error_kind(
                DiagnosticKind::UnclosedDelimiter(*ch),
                Some(Span::new(self.i as u32, self.i as u32)),
            ));
        }

        LexResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start as u32, end as u32),
        });
        self.last_kind = Some(kind);
    }

    fn line_break(&mut self, start: usize) {
        if self.should_emit_newline() {
            self.push(TokenKind::Newline, start, self.i);
        }
    }

    fn should_emit_newline(&self) -> bool {
        if matches!(self.delim_stack.last(), Some('(' | '[')) {
            return false;
        }
        match self.last_kind {
            None | Some(TokenKind::Newline) => return false,
            Some(k) if k.continues_expression() => return false,
            _ => {}
        }

        let Some(rest) = self.next_line_significant() else {
            return true;
        };
        if rest.starts_with("++") || rest.starts_with("--") {
            return true;
        }
        if rest.starts_with("!") && !rest.starts_with("!=") {
            return true;
        }
        if rest.starts_with("instanceof") || (rest.starts_with("in") && !starts_ident(&rest[2..])) {
            return false;
        }
        !matches!(
            rest.chars().next(),
            Some(
                '.' | ',' | '?' | ':' | '+' | '-' | '*' | '/' | '%' | '=' | '>' | '<' | '&'
                    | '|' | '^' | '!' | ')' | ']'
            )
        )
    }

    /// Text of the next line starting at its first significant character.
    fn next_line_significant(&self) -> Option<&'a str> {
        let mut j = self.i;
        while j < self.input.len() {
            let rest = &self.input[j..];
            let ch = rest.chars().next()?;
            if matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
                return None;
            }
            if ch.is_whitespace() {
                j += ch.len_utf8();
                continue;
            }
            if rest.starts_with("//") {
                return None;
            }
            if rest.starts_with("/*") {
                let end = rest[2..].find("*/")?;
                if rest[2..2 + end].contains('\n') {
                    return None;
                }
                j += 2 + end + 2;
                continue;
            }
            return Some(rest);
        }
        None
    }

    fn skip_line(&mut self) {
        while let Some(ch) = self.peek_char() {
            if matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
                break;
            }
            self.i += ch.len_utf8();
        }
    }

    fn lex_block_comment(&mut self) {
        let start = self.i;
        self.i += 2;
        let mut saw_newline = false;
        loop {
            if self.i >= self.bytes.len() {
                self.diagnostics.push(Diagnostic::error_kind(
                    DiagnosticKind::UnterminatedBlockComment,
                    Some(Span::new(start as u32, self.i as u32)),
                ));
                return;
            }
            if self.peek_str("*/") {
                self.i += 2;
                break;
            }
            let Some(ch) = self.peek_char() else {
                break;
            };
            saw_newline |= matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}');
            self.i += ch.len_utf8();
        }
        if saw_newline && self.should_emit_newline() {
            self.push(TokenKind::Newline, start, self.i);
        }
    }

    fn lex_string(&mut self, quote: char) {
        let start = self.i;
        self.i += 1;
        while let Some(ch) = self.peek_char() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            if ch == quote {
                self.i += 1;
                self.push(TokenKind::Str, start, self.i);
                return;
            }
            if ch == '\\' {
                self.i += 1;
                if self.peek_str("\r\n") {
                    self.i += 2;
                } else if let Some(esc) = self.peek_char() {
                    self.i += esc.len_utf8();
                }
                continue;
            }
            self.i += ch.len_utf8();
        }
        self.diagnostics.push(Diagnostic::error_kind(
            DiagnosticKind::UnterminatedString,
            Some(Span::new(start as u32, self.i as u32)),
        ));
        self.push(TokenKind::Str, start, self.i);
    }

    ///
    ///
    fn lex_number(&mut self) {
        let start = self.i;
        let radix = match self.bytes.get(self.i..self.i + 2) {
            Some(b"0x" | b"0X") => 16,
            Some(b"0o" | b"0O") => 8,
            Some(b"0b" | b"0B") => 2,
            _ => 10,
        };
        if radix != 10 {
            self.i += 2;
            let digits = self.eat_digits(|c| c.is_digit(radix));
            if digits == 0 {
                self.malformed_number(start);
            }
        } else {
            self.eat_digits(|c| c.is_ascii_digit());
            if self.peek_char() == Some('.') {
                self.i += 1;
                self.eat_digits(|c| c.is_ascii_digit());
            }
            if matches!(self.peek_char(), Some('e' | 'E')) {
                let exp_start = self.i;
                self.i += 1;
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.i += 1;
                }
                if self.eat_digits(|c| c.is_ascii_digit()) == 0 {
                    self.i = exp_start;
                }
            }
        }
        if self.peek_char().is_some_and(is_ident_start) {
            while self.peek_char().is_some_and(is_ident_continue) {
                self.i += self.peek_char().map_or(1, char::len_utf8);
            }
            self.malformed_number(start);
        }
        self.push(TokenKind::Number, start, self.i);
    }

    fn eat_digits(&mut self, accept: impl Fn(char) -> bool) -> usize {
        let mut digits = 0usize;
        while let Some(ch) = self.peek_char() {
            if accept(ch) {
                digits += 1;
            } else if ch != '_' || digits == 0 {
                break;
            }
            self.i += 1;
        }
        digits
    }

    fn malformed_number(&mut self, start: usize) {
        self.diagnostics.push(Diagnostic::error_kind(
            DiagnosticKind::MalformedNumber,
            Some(Span::new(start as u32, self.i as u32)),
        ));
    }

    ///
    ///
    fn lex_ident_or_keyword(&mut self) {
        let start = self.i;
        while let Some(ch) = self.peek_char() {
            if is_ident_continue(ch) {
                self.i += ch.len_utf8();
            } else if ch == '\\' && self.peek_str("\\u") {
                // Unicode escapes in identifiers are kept verbatim.
                self.i += 2;
            } else {
                break;
            }
        }
        if self.i == start {
            self.i += 1;
            self.diagnostics.push(Diagnostic::error_kind(
                DiagnosticKind::UnexpectedChar('\\'),
                Some(Span::new(start as u32, self.i as u32)),
            ));
            return;
        }

        let s = &self.input[start..self.i];
        let kind = KEYWORDS.get(s).copied().unwrap_or(TokenKind::Ident);
        self.push(kind, start, self.i);
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.i..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.i..].starts_with(s)
    }
}

fn starts_ident(rest: &str) -> bool {
    rest.chars().next().is_some_and(is_ident_continue)
}
