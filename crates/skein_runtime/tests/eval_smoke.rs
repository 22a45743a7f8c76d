use skein_runtime::{Context, Runtime, Value, inspect};

fn setup() -> (Runtime, Context) {
    let mut rt = Runtime::new();
    let ctx = rt.create_context(&[]);
    (rt, ctx)
}

fn eval_in(rt: &mut Runtime, ctx: &Context, src: &str) -> Value {
    let script = rt.compile(src, "test.js").unwrap_or_else(|e| panic!("{e}"));
    match rt.run_in(ctx, &script) {
        Ok(v) => v,
        Err(ex) => panic!("uncaught {:?}", rt.exception_trace(&ex).unwrap_or_default()),
    }
}

/// Completion value of `src`, converted with plain string conversion.
fn eval(src: &str) -> String {
    let (mut rt, ctx) = setup();
    let v = eval_in(&mut rt, &ctx, src);
    rt.enter_context(&ctx);
    let s = rt.to_string(&v).map(|s| s.to_string());
    rt.exit_context();
    s.unwrap_or_else(|_| panic!("result not convertible"))
}

#[test]
fn arithmetic_and_strings() {
    assert_eq!(eval("1 + 2 * 3"), "7");
    assert_eq!(eval("'a' + 1 + 2"), "a12");
    assert_eq!(eval("1 + 2 + 'a'"), "3a");
    assert_eq!(eval("7 % 3"), "1");
    assert_eq!(eval("-7 % 3"), "-1");
    assert_eq!(eval("1 / 0"), "Infinity");
    assert_eq!(eval("0.1 + 0.2"), "0.30000000000000004");
    assert_eq!(eval("'5' * '2'"), "10");
}

#[test]
fn bitwise_and_shifts() {
    assert_eq!(eval("5 & 3"), "1");
    assert_eq!(eval("5 | 3"), "7");
    assert_eq!(eval("5 ^ 3"), "6");
    assert_eq!(eval("~5"), "-6");
    assert_eq!(eval("1 << 31"), "-2147483648");
    assert_eq!(eval("-8 >> 1"), "-4");
    assert_eq!(eval("-1 >>> 0"), "4294967295");
    assert_eq!(eval("1 << 33"), "2");
}

#[test]
fn comparisons_and_equality() {
    assert_eq!(eval("1 < 2"), "true");
    assert_eq!(eval("'b' > 'a'"), "true");
    assert_eq!(eval("'10' < '9'"), "true");
    assert_eq!(eval("'10' < 9"), "false");
    assert_eq!(eval("NaN <= NaN"), "false");
    assert_eq!(eval("null == undefined"), "true");
    assert_eq!(eval("null === undefined"), "false");
    assert_eq!(eval("'1' == 1"), "true");
    assert_eq!(eval("true == 1"), "true");
    assert_eq!(eval("var o = {}; o == o"), "true");
    assert_eq!(eval("({}) == ({})"), "false");
}

#[test]
fn variables_and_scopes() {
    assert_eq!(eval("var x = 1; { let x = 2; } x"), "1");
    assert_eq!(eval("let y = 1; { y = 5; } y"), "5");
    assert_eq!(eval("function f() { var a = 3; return a; } f()"), "3");
    assert_eq!(eval("implicitGlobal = 4; implicitGlobal"), "4");
    assert_eq!(eval("typeof notDeclared"), "undefined");
    assert_eq!(eval("f(); function f() { return 'hoisted'; }"), "hoisted");
}

#[test]
fn closures_capture_their_scope() {
    let src = "
        function counter() {
            var n = 0;
            return function () { n = n + 1; return n; };
        }
        var c = counter();
        c(); c();
        c()";
    assert_eq!(eval(src), "3");
    assert_eq!(eval("var fact = function f(n) { return n <= 1 ? 1 : n * f(n - 1); }; fact(5)"), "120");
}

#[test]
fn control_flow() {
    let src = "
        var out = [];
        for (var i = 0; i < 10; i++) {
            if (i % 2) continue;
            if (i > 6) break;
            out.push(i);
        }
        out.join('-')";
    assert_eq!(eval(src), "0-2-4-6");
    assert_eq!(eval("var n = 0; do { n++; } while (n < 5); n"), "5");
    assert_eq!(eval("var s = 0; var k = 10; while (k) { s += k--; } s"), "55");
}

#[test]
fn for_in_visits_own_then_inherited_keys() {
    let src = "
        function P() { this.own = 1; }
        P.prototype.inherited = 2;
        var o = new P();
        o.b = 3;
        var keys = [];
        for (var k in o) keys.push(k);
        keys.join(',')";
    assert_eq!(eval(src), "own,b,inherited");
    assert_eq!(eval("var ks = []; for (var i in [7, 8, 9]) ks.push(i); ks.join('')"), "012");
}

#[test]
fn try_catch_finally() {
    assert_eq!(eval("var r; try { throw 1; } catch (e) { r = e + 1; } r"), "2");
    assert_eq!(
        eval("var log = []; try { log.push('t'); } finally { log.push('f'); } log.join('')"),
        "tf"
    );
    assert_eq!(
        eval("function g() { try { return 'try'; } finally { seen = true; } } var seen = false; g() + seen"),
        "trytrue"
    );
    assert_eq!(eval("var m; try { null.x; } catch (e) { m = e instanceof TypeError; } m"), "true");
}

#[test]
fn objects_and_prototypes() {
    let src = "
        function Point(x, y) { this.x = x; this.y = y; }
        Point.prototype.sum = function () { return this.x + this.y; };
        var p = new Point(2, 3);
        p.sum() + (p instanceof Point ? 100 : 0)";
    assert_eq!(eval(src), "105");
    assert_eq!(eval("var o = {a: 1}; delete o.a; 'a' in o"), "false");
    assert_eq!(eval("var o = {a: 1}; o.hasOwnProperty('a')"), "true");
    assert_eq!(eval("Object.keys({b: 1, a: 2}).join()"), "b,a");
    assert_eq!(eval("String({})"), "[object Object]");
    assert_eq!(eval("var o = {valueOf: function () { return 41; }}; o + 1"), "42");
}

#[test]
fn arrays() {
    assert_eq!(eval("var a = [1, 2]; a.push(3); a.length"), "3");
    assert_eq!(eval("var a = [1, 2, 3]; a.pop() + a.length"), "5");
    assert_eq!(eval("[1, 2, 3].indexOf(2)"), "1");
    assert_eq!(eval("[1, 2, 3, 4].slice(1, -1).join()"), "2,3");
    assert_eq!(eval("var a = []; a[3] = 1; a.length"), "4");
    assert_eq!(eval("var a = [1, 2, 3]; a.length = 1; a.join()"), "1");
    assert_eq!(eval("Array.isArray([]) && !Array.isArray({})"), "true");
    assert_eq!(eval("new Array(3).length"), "3");
    assert_eq!(eval("String([1, [2, 3]])"), "1,2,3");
}

#[test]
fn strings() {
    assert_eq!(eval("'hello'.length"), "5");
    assert_eq!(eval("'abc'.charCodeAt(1)"), "98");
    assert_eq!(eval("'abc'.charAt(2)"), "c");
    assert_eq!(eval("'abc'[0]"), "a");
    assert_eq!(eval("'hello'.indexOf('l')"), "2");
    assert_eq!(eval("'hello'.slice(-3)"), "llo");
    assert_eq!(eval("'hello'.substring(3, 1)"), "el");
    assert_eq!(eval("'a,b,c'.split(',').length"), "3");
    assert_eq!(eval("String.fromCharCode(104, 105)"), "hi");
}

#[test]
fn numbers_and_math() {
    assert_eq!(eval("parseInt('42px')"), "42");
    assert_eq!(eval("parseInt('ff', 16)"), "255");
    assert_eq!(eval("parseFloat('3.5e2x')"), "350");
    assert_eq!(eval("isNaN('abc')"), "true");
    assert_eq!(eval("Math.floor(-1.5) + Math.ceil(1.2)"), "0");
    assert_eq!(eval("Math.round(2.5) + Math.round(-2.5)"), "1");
    assert_eq!(eval("Math.max(1, 5, 3) - Math.min(4, 2)"), "3");
    assert_eq!(eval("Math.pow(2, 10)"), "1024");
    assert_eq!(eval("(255).toString(16)"), "ff");
    assert_eq!(eval("Number('  12  ') + Number(true)"), "13");
}

#[test]
fn call_and_apply_bind_this() {
    assert_eq!(eval("function f(a, b) { return this.k + a + b; } f.call({k: 1}, 2, 3)"), "6");
    assert_eq!(eval("function f(a, b) { return this.k + a + b; } f.apply({k: 1}, [2, 3])"), "6");
}

#[test]
fn typeof_reports_value_types() {
    assert_eq!(eval("typeof 1 + typeof 'a' + typeof null"), "numberstringobject");
    assert_eq!(eval("typeof function () {} + typeof undefined"), "functionundefined");
}

#[test]
fn inspector_renders_nested_values() {
    let (mut rt, ctx) = setup();
    let v = eval_in(&mut rt, &ctx, "({a: 1, b: 'two', c: [1, 'x'], d: {e: {f: 1}}})");
    rt.enter_context(&ctx);
    let shown = inspect(&mut rt, &v).unwrap_or_else(|_| panic!("inspect failed"));
    rt.exit_context();
    assert_eq!(shown, r#"{a: 1, b: "two", c: [1, "x"], d: {e: {...}}}"#);
}

#[test]
fn inspector_marks_cycles() {
    let (mut rt, ctx) = setup();
    let v = eval_in(&mut rt, &ctx, "var a = [1]; a.push(a); a");
    rt.enter_context(&ctx);
    let shown = inspect(&mut rt, &v).unwrap_or_else(|_| panic!("inspect failed"));
    rt.exit_context();
    assert_eq!(shown, "[1, [Circular]]");
}

#[test]
fn completion_value_comes_from_last_expression() {
    assert_eq!(eval("1; 2; var x = 3;"), "2");
    assert_eq!(eval("if (true) { 'then'; } else { 'else'; }"), "then");
}
