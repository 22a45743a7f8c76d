use crate::core::{FunctionKind, ObjRef, Property, Value};
use crate::runtime::{Args, CallArgs, Intrinsics, JsResult, Runtime};

pub(super) fn install(rt: &mut Runtime, global: &ObjRef, intrinsics: &Intrinsics) {
    let proto = &intrinsics.function_proto;
    rt.define_method(proto, "call", call, 1);
    rt.define_method(proto, "apply", apply, 2);
    rt.define_method(proto, "toString", to_string, 0);

    let ctor = rt.new_constructor("Function", construct, 1, proto);
    global.define("Function", Property::hidden(Value::Object(ctor)));
}

fn construct(rt: &mut Runtime, _args: &CallArgs) -> JsResult<Value> {
    Err(rt.error(
        crate::runtime::ErrorKind::Error,
        "Code generation from strings disallowed for this context",
    ))
}

fn call(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let rest: Args = args.args.iter().skip(1).cloned().collect();
    rt.call(&args.this, args.get(0), rest)
}

fn apply(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let list = match args.get(1) {
        Value::Undefined | Value::Null => Args::new(),
        Value::Object(o) => {
            let len = rt.get_named(&Value::Object(o.clone()), "length")?;
            let len = rt.to_uint32(&len)?;
            let mut out = Args::with_capacity(len as usize);
            for i in 0..len {
                out.push(rt.get(&Value::Object(o.clone()), &crate::core::PropertyKey::Index(i))?);
            }
            out
        }
        _ => return Err(rt.type_error("CreateListFromArrayLike called on non-object")),
    };
    rt.call(&args.this, args.get(0), list)
}

fn to_string(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let Some(f) = args.this.as_object() else {
        return Err(rt.type_error("Function.prototype.toString requires that 'this' be a Function"));
    };
    Ok(match f.as_function() {
        Some(FunctionKind::Script(c)) => Value::str(c.source.text.slice(c.node.span)),
        Some(FunctionKind::Native(n)) => Value::from(format!("function {}() {{ [native code] }}", n.name)),
        None => return Err(rt.type_error("Function.prototype.toString requires that 'this' be a Function")),
    })
}
