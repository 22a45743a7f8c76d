use skein_runtime::{
    BuiltinProvider, BuiltinRegistry, CallArgs, ClassSpec, Context, JsResult, Runtime, Value,
};

fn run(rt: &mut Runtime, ctx: &Context, src: &str) -> Value {
    let script = rt.compile(src, "ctx.js").unwrap_or_else(|e| panic!("{e}"));
    rt.run_in(ctx, &script).unwrap_or_else(|_| panic!("`{src}` threw"))
}

fn text(rt: &mut Runtime, ctx: &Context, v: &Value) -> String {
    rt.enter_context(ctx);
    let s = rt.to_string(v).map(|s| s.to_string()).unwrap_or_default();
    rt.exit_context();
    s
}

#[test]
fn contexts_have_separate_globals() {
    let mut rt = Runtime::new();
    let a = rt.create_context(&[]);
    let b = rt.create_context(&[]);
    run(&mut rt, &a, "var shared = 'a'; let lexical = 1;");
    let v = run(&mut rt, &b, "typeof shared + typeof lexical");
    assert_eq!(text(&mut rt, &b, &v), "undefinedundefined");
    let v = run(&mut rt, &a, "shared + lexical");
    assert_eq!(text(&mut rt, &a, &v), "a1");
}

#[test]
fn objects_remember_their_creation_context() {
    let mut rt = Runtime::new();
    let a = rt.create_context(&[]);
    let b = rt.create_context(&[]);
    let obj = run(&mut rt, &b, "({})");
    let owner = obj.as_object().map(|o| o.context());
    assert_eq!(owner, Some(b.id()));
    assert_ne!(owner, Some(a.id()));
}

#[test]
fn functions_resolve_free_names_in_their_home_context() {
    let mut rt = Runtime::new();
    let a = rt.create_context(&[]);
    let b = rt.create_context(&[]);
    let f = run(&mut rt, &a, "var where = 'home'; (function () { return where; })");
    b.global().define("f", skein_runtime::Property::data(f));
    let v = run(&mut rt, &b, "var where = 'away'; f()");
    assert_eq!(text(&mut rt, &b, &v), "home");
}

#[test]
fn disposed_context_loses_its_bindings() {
    let mut rt = Runtime::new();
    let ctx = rt.create_context(&[]);
    run(&mut rt, &ctx, "var x = 1;");
    let global = ctx.global();
    assert!(global.own("x").is_some());
    rt.dispose_context(&ctx);
    assert!(ctx.is_disposed());
    assert!(global.own("x").is_none());
    assert!(global.proto().is_none());
}

fn answer(_rt: &mut Runtime, _args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Number(42.0))
}

fn make_thing(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let proto = rt.get_named(&Value::Object(args.callee.clone()), "prototype")?;
    let obj = rt.new_object_with_proto(proto.as_object().cloned(), skein_runtime::ObjectKind::Ordinary);
    Ok(Value::Object(obj))
}

fn counter_get(_rt: &mut Runtime, _args: &CallArgs) -> JsResult<Value> {
    Ok(Value::str("from getter"))
}

struct TestProvider;

impl BuiltinProvider for TestProvider {
    fn install(&self, registry: &mut BuiltinRegistry) {
        registry.register("answer", answer, 0);
        registry.register_accessor("computed", Some(counter_get), None);
        registry.register_class(
            ClassSpec::new("Thing", make_thing, 0)
                .method("answer", answer, 0)
                .constant("KIND", Value::Number(7.0)),
        );
        let mut ns = BuiltinRegistry::new();
        ns.register("answer", answer, 0);
        registry.register_namespace("Tools", ns);
    }
}

#[test]
fn providers_install_globals() {
    let mut rt = Runtime::new();
    let ctx = rt.create_context(&[&TestProvider]);
    let v = run(
        &mut rt,
        &ctx,
        "[answer(), computed, new Thing().answer(), Thing.KIND, Thing().KIND, Tools.answer()].join()",
    );
    assert_eq!(text(&mut rt, &ctx, &v), "42,from getter,42,7,7,42");
    let names = {
        let mut r = BuiltinRegistry::new();
        TestProvider.install(&mut r);
        r.names()
    };
    assert_eq!(names, ["answer", "computed", "Thing", "Tools"]);
}

#[test]
fn idle_notification_runs_hooks() {
    use std::cell::Cell;
    use std::rc::Rc;

    let mut rt = Runtime::new();
    let hits = Rc::new(Cell::new(0));
    let seen = hits.clone();
    rt.on_idle(Box::new(move || seen.set(seen.get() + 1)));
    rt.idle_notification();
    rt.idle_notification();
    assert_eq!(hits.get(), 2);
}

#[test]
fn closure_cycles_are_collected_and_reachable_ones_kept() {
    let mut rt = Runtime::new();
    let ctx = rt.create_context(&[]);
    let baseline = rt.heap_live_count();
    run(&mut rt, &ctx, "function g() { var o = {}; o.f = function () { return o; }; return 1; } g();");
    run(&mut rt, &ctx, "var kept = (function () { var k = { n: 4 }; k.self = k; return k; })();");
    assert!(rt.heap_live_count() > baseline);

    assert!(rt.collect_garbage() > 0);
    let v = run(&mut rt, &ctx, "kept.self.self.n");
    assert_eq!(text(&mut rt, &ctx, &v), "4");
    assert_eq!(rt.collect_garbage(), 0);
}

#[test]
fn idle_notification_collects() {
    let mut rt = Runtime::new();
    let ctx = rt.create_context(&[]);
    run(&mut rt, &ctx, "(function () { var a = []; a.push(a); })();");
    let before = rt.heap_live_count();
    rt.idle_notification();
    assert!(rt.heap_live_count() < before);
}
