use skein_runtime::{Context, Exception, Runtime, RuntimeConfig};

fn setup() -> (Runtime, Context) {
    let mut rt = Runtime::new();
    let ctx = rt.create_context(&[]);
    (rt, ctx)
}

fn throws(rt: &mut Runtime, ctx: &Context, src: &str) -> Exception {
    let script = rt.compile(src, "t.js").unwrap_or_else(|e| panic!("{e}"));
    match rt.run_in(ctx, &script) {
        Ok(_) => panic!("expected `{src}` to throw"),
        Err(ex) => ex,
    }
}

fn message_of(src: &str) -> String {
    let (mut rt, ctx) = setup();
    let ex = throws(&mut rt, &ctx, src);
    rt.enter_context(&ctx);
    let text = rt.to_string(&ex.value).map(|s| s.to_string());
    rt.exit_context();
    text.unwrap_or_default()
}

#[test]
fn compile_errors_carry_message_and_position() {
    let mut rt = Runtime::new();
    let err = match rt.compile("var x = ;", "bad.js") {
        Err(e) => e,
        Ok(_) => panic!("expected a syntax error"),
    };
    assert!(err.to_string().starts_with("SyntaxError: "), "{err}");
    assert_eq!(err.source.name, "bad.js");
    assert!(err.span.is_some());
}

#[test]
fn runtime_error_messages() {
    assert_eq!(message_of("missing"), "ReferenceError: missing is not defined");
    assert_eq!(
        message_of("var o = {}; o.nope()"),
        "TypeError: o.nope is not a function"
    );
    assert_eq!(
        message_of("var u; u.field"),
        "TypeError: Cannot read properties of undefined (reading 'field')"
    );
    assert_eq!(
        message_of("null.x = 1"),
        "TypeError: Cannot set properties of null (setting 'x')"
    );
    assert_eq!(
        message_of("const k = 1; k = 2"),
        "TypeError: Assignment to constant variable."
    );
    assert_eq!(message_of("var n = 3; new n()"), "TypeError: n is not a constructor");
    assert_eq!(
        message_of("1 instanceof 2"),
        "TypeError: Right-hand side of 'instanceof' is not callable"
    );
    assert_eq!(
        message_of("'k' in 5"),
        "TypeError: Cannot use 'in' operator to search for 'k' in 5"
    );
    assert_eq!(message_of("throw new RangeError('r')"), "RangeError: r");
    assert_eq!(message_of("throw 'plain'"), "plain");
}

#[test]
fn exception_location_points_at_innermost_expression() {
    let (mut rt, ctx) = setup();
    let ex = throws(&mut rt, &ctx, "var a;\nvar b = a.b.c;");
    let (source, span) = ex.location.unwrap_or_else(|| panic!("no location"));
    let loc = source.location(span);
    assert_eq!(loc.name, "t.js");
    assert_eq!(loc.line, 2);
    assert_eq!(loc.start_col, 8);
    assert_eq!(loc.end_col, 11);
    assert_eq!(loc.source_line, "var b = a.b.c;");
}

#[test]
fn throw_statement_location_is_the_statement() {
    let (mut rt, ctx) = setup();
    let ex = throws(&mut rt, &ctx, "\n  throw 42;");
    let (source, span) = ex.location.unwrap_or_else(|| panic!("no location"));
    let loc = source.location(span);
    assert_eq!((loc.line, loc.start_col), (2, 2));
}

#[test]
fn error_objects_capture_a_stack() {
    let (mut rt, ctx) = setup();
    let src = "function f() { throw new Error('boom'); }\nf();";
    let ex = throws(&mut rt, &ctx, src);
    let trace = rt.exception_trace(&ex).unwrap_or_default();
    assert_eq!(trace, "Error: boom\n    at f (t.js:1:22)\n    at t.js:2:1");
}

#[test]
fn caught_errors_expose_name_and_message() {
    let (mut rt, ctx) = setup();
    let script = rt
        .compile(
            "var r; try { undefinedFn(); } catch (e) { r = e.name + '|' + e.message; } r",
            "t.js",
        )
        .unwrap_or_else(|e| panic!("{e}"));
    let v = rt.run_in(&ctx, &script).unwrap_or_else(|_| panic!("threw"));
    rt.enter_context(&ctx);
    let s = rt.to_string(&v).map(|s| s.to_string()).unwrap_or_default();
    rt.exit_context();
    assert_eq!(s, "ReferenceError|undefinedFn is not defined");
}

#[test]
fn unbounded_recursion_raises_range_error() {
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| message_of("function r() { return r(); } r()"))
        .unwrap_or_else(|e| panic!("spawn: {e}"));
    let msg = handle.join().unwrap_or_else(|_| panic!("thread panicked"));
    assert_eq!(msg, "RangeError: Maximum call stack size exceeded");
}

#[test]
fn call_depth_is_configurable() {
    let mut rt = Runtime::with_config(RuntimeConfig { max_call_depth: 5 });
    let ctx = rt.create_context(&[]);
    let ok = rt
        .compile("function d(n) { return n ? d(n - 1) : 0; } d(3)", "t.js")
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(rt.run_in(&ctx, &ok).is_ok());
    let deep = rt.compile("d(10)", "u.js").unwrap_or_else(|e| panic!("{e}"));
    assert!(rt.run_in(&ctx, &deep).is_err());
}

#[test]
fn top_level_lexical_redeclaration_is_rejected() {
    let (mut rt, ctx) = setup();
    let first = rt.compile("let once = 1;", "a.js").unwrap_or_else(|e| panic!("{e}"));
    assert!(rt.run_in(&ctx, &first).is_ok());
    let ex = throws(&mut rt, &ctx, "let once = 2;");
    rt.enter_context(&ctx);
    let text = rt.to_string(&ex.value).map(|s| s.to_string()).unwrap_or_default();
    rt.exit_context();
    assert_eq!(text, "SyntaxError: Identifier 'once' has already been declared");
}
