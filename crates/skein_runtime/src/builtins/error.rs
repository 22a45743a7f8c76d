use crate::core::{NativeFn, ObjRef, Property, Value};
use crate::runtime::{CallArgs, ErrorKind, Intrinsics, JsResult, Runtime};

pub(super) fn install(rt: &mut Runtime, global: &ObjRef, intrinsics: &Intrinsics) {
    let base = intrinsics.error_proto(ErrorKind::Error);
    base.define("message", Property::hidden(Value::str("")));
    rt.define_method(base, "toString", to_string, 0);

    for kind in ErrorKind::ALL {
        let proto = intrinsics.error_proto(kind);
        proto.define("name", Property::hidden(Value::str(kind.name())));
        let ctor: NativeFn = match kind {
            ErrorKind::Error => error,
            ErrorKind::TypeError => type_error,
            ErrorKind::RangeError => range_error,
            ErrorKind::SyntaxError => syntax_error,
            ErrorKind::ReferenceError => reference_error,
        };
        let ctor = rt.new_constructor(kind.name(), ctor, 1, proto);
        global.define(kind.name(), Property::hidden(Value::Object(ctor)));
    }
}

fn construct(rt: &mut Runtime, args: &CallArgs, kind: ErrorKind) -> JsResult<Value> {
    let message = match args.get(0) {
        Value::Undefined => "".into(),
        v => rt.to_string(&v)?,
    };
    let err = rt.make_error(kind, &message);
    if let Some(Value::Object(proto)) = args.callee.own_value("prototype") {
        err.set_proto(Some(proto));
    }
    Ok(Value::Object(err))
}

fn error(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    construct(rt, args, ErrorKind::Error)
}

fn type_error(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    construct(rt, args, ErrorKind::TypeError)
}

fn range_error(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    construct(rt, args, ErrorKind::RangeError)
}

fn syntax_error(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    construct(rt, args, ErrorKind::SyntaxError)
}

fn reference_error(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    construct(rt, args, ErrorKind::ReferenceError)
}

fn to_string(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    if !matches!(args.this, Value::Object(_)) {
        return Err(rt.type_error("Error.prototype.toString requires that 'this' be an Object"));
    }
    let name = match rt.get_named(&args.this, "name")? {
        Value::Undefined => "Error".into(),
        v => rt.to_string(&v)?,
    };
    let message = match rt.get_named(&args.this, "message")? {
        Value::Undefined => "".into(),
        v => rt.to_string(&v)?,
    };
    Ok(Value::from(match (name.is_empty(), message.is_empty()) {
        (_, true) => name.to_string(),
        (true, false) => message.to_string(),
        (false, false) => format!("{name}: {message}"),
    }))
}
