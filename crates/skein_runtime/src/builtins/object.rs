use crate::core::{ObjRef, Property, Value};
use crate::runtime::{CallArgs, Intrinsics, JsResult, Runtime};

pub(super) fn install(rt: &mut Runtime, global: &ObjRef, intrinsics: &Intrinsics) {
    let proto = &intrinsics.object_proto;
    rt.define_method(proto, "hasOwnProperty", has_own_property, 1);
    rt.define_method(proto, "toString", to_string, 0);
    rt.define_method(proto, "valueOf", value_of, 0);

    let ctor = rt.new_constructor("Object", construct, 1, proto);
    rt.define_method(&ctor, "keys", keys, 1);
    rt.define_method(&ctor, "getPrototypeOf", get_prototype_of, 1);
    global.define("Object", Property::hidden(Value::Object(ctor)));
}

fn construct(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    match args.get(0) {
        v @ Value::Object(_) => Ok(v),
        _ => Ok(Value::Object(rt.new_object())),
    }
}

fn keys(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let keys = match args.get(0) {
        Value::Object(o) => rt.own_keys(&o),
        Value::Undefined | Value::Null => {
            return Err(rt.type_error("Cannot convert undefined or null to object"));
        }
        _ => Vec::new(),
    };
    let items = keys.into_iter().map(Value::String).collect();
    Ok(Value::Object(rt.new_array(items)))
}

fn get_prototype_of(_rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(match args.get(0).as_object().and_then(|o| o.proto()) {
        Some(p) => Value::Object(p),
        None => Value::Null,
    })
}

fn has_own_property(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let key = rt.to_property_key(&args.get(0))?;
    Ok(Value::Bool(match &args.this {
        Value::Object(o) => rt.has_own_property(o, &key),
        _ => false,
    }))
}

fn to_string(_rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let tag = match &args.this {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Object(o) => o.class_name(),
    };
    Ok(Value::from(format!("[object {tag}]")))
}

fn value_of(_rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(args.this.clone())
}
