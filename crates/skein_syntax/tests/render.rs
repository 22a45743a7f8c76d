use skein_syntax::{Diagnostic, SourceFile, SourceId, Span, render_at, render_diagnostic};

#[test]
fn renders_name_line_source_and_carets() {
    let src = SourceFile::new(SourceId(0), "t.js", "var a = 1;\nvar b = ;\n".to_string());
    let d = Diagnostic::error("SyntaxError: Unexpected token ';'", Some(Span::new(19, 20)));
    let out = render_diagnostic(&src, &d);
    assert_eq!(
        out,
        "t.js:2: SyntaxError: Unexpected token ';'\nvar b = ;\n        ^"
    );
}

#[test]
fn renders_without_span() {
    let src = SourceFile::new(SourceId(0), "t.js", String::new());
    let d = Diagnostic::error("boom", None);
    assert_eq!(render_diagnostic(&src, &d), "t.js: boom");
}

#[test]
fn render_at_underlines_the_whole_span() {
    let src = SourceFile::new(SourceId(0), "u.js", "  throw 'x';".to_string());
    assert_eq!(
        render_at(&src, Span::new(2, 11), "x"),
        "u.js:1: x\n  throw 'x';\n  ^^^^^^^^^\n"
    );
}
