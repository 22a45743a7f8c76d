use skein_parser::parse_source;

fn first_error(src: &str) -> String {
    let result = parse_source(src);
    match result.diagnostics.first() {
        Some(d) => d.message.clone(),
        None => panic!("expected a diagnostic for {src:?}"),
    }
}

#[test]
fn unexpected_end_of_input() {
    assert_eq!(first_error("foo("), "Unexpected end of input");
    assert_eq!(first_error("function f() {"), "Unexpected end of input");
}

#[test]
fn unexpected_tokens_are_named() {
    assert_eq!(first_error("1 +* 2"), "Unexpected token '*'");
    assert_eq!(first_error("a b"), "Unexpected identifier 'b'");
    assert_eq!(first_error("a 'b'"), "Unexpected string");
}

#[test]
fn illegal_control_flow() {
    assert_eq!(first_error("return 1"), "Illegal return statement");
    assert_eq!(first_error("break"), "Illegal break statement");
    assert!(first_error("continue").starts_with("Illegal continue statement"));
}

#[test]
fn invalid_assignment_target() {
    assert_eq!(first_error("1 = 2"), "Invalid left-hand side in assignment");
}

#[test]
fn const_requires_initializer() {
    assert!(first_error("const x;").starts_with("Missing initializer in const declaration"));
}

#[test]
fn try_without_handler() {
    assert_eq!(first_error("try {}"), "Missing catch or finally after try");
}

#[test]
fn recovers_and_keeps_parsing() {
    let result = parse_source("var a = ;\nvar b = 2\n");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.program.scope.vars.len(), 1);
}

#[test]
fn deep_nesting_is_reported_not_overflowed() {
    let handle = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(|| {
            let src = format!("{}1{}", "(".repeat(2000), ")".repeat(2000));
            parse_source(&src)
                .diagnostics
                .iter()
                .any(|d| d.message == "Maximum nesting depth exceeded")
        })
        .unwrap();
    assert!(handle.join().unwrap());
}
