use skein_lexer::Lexer;
use skein_syntax::TokenKind;

fn kinds(src: &str) -> Vec<TokenKind> {
    let result = Lexer::new(src).lex();
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    result.tokens.into_iter().map(|t| t.kind).collect()
}

#[test]
fn lex_smoke_statement() {
    use TokenKind::*;
    assert_eq!(
        kinds("var a = new Uint8Array([1, 2]);"),
        vec![
            KwVar, Ident, Eq, KwNew, Ident, LParen, LBracket, Number, Comma, Number, RBracket,
            RParen, StmtEnd, Eof
        ]
    );
}

#[test]
fn longest_operator_wins() {
    use TokenKind::*;
    assert_eq!(
        kinds("a >>>= b !== c >> d"),
        vec![Ident, UShrEq, Ident, NeEq, Ident, Shr, Ident, Eof]
    );
}

#[test]
fn numbers_in_all_radixes() {
    let src = "0x1F 0o17 0b101 1.5e3 .25 1_000";
    let result = Lexer::new(src).lex();
    assert!(result.diagnostics.is_empty());
    let texts: Vec<&str> = result
        .tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Number)
        .map(|t| &src[t.span.start.0 as usize..t.span.end.0 as usize])
        .collect();
    assert_eq!(texts, vec!["0x1F", "0o17", "0b101", "1.5e3", ".25", "1_000"]);
}

#[test]
fn strings_with_both_quotes_and_escapes() {
    let src = r#"'it\'s' "a\"b""#;
    let result = Lexer::new(src).lex();
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.tokens.len(), 3);
    assert!(result.tokens[..2].iter().all(|t| t.kind == TokenKind::Str));
}

#[test]
fn unterminated_string_is_reported() {
    let result = Lexer::new("var s = 'abc\n").lex();
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn identifier_glued_to_number_is_malformed() {
    let result = Lexer::new("3in").lex();
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn keywords_are_recognized() {
    use TokenKind::*;
    assert_eq!(
        kinds("typeof x instanceof Object"),
        vec![KwTypeof, Ident, KwInstanceof, Ident, Eof]
    );
}

#[test]
fn shebang_line_is_skipped() {
    use TokenKind::*;
    assert_eq!(kinds("#!/usr/bin/env skein\nx"), vec![Ident, Eof]);
}

#[test]
fn unclosed_delimiter_is_reported() {
    let result = Lexer::new("f(1, 2").lex();
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
}
