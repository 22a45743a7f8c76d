use crate::core::number::to_integer;
use crate::core::{ObjRef, Property, PropertyKey, Value};
use crate::runtime::{CallArgs, Intrinsics, JsResult, Runtime};

pub(super) fn install(rt: &mut Runtime, global: &ObjRef, intrinsics: &Intrinsics) {
    let proto = &intrinsics.array_proto;
    rt.define_method(proto, "push", push, 1);
    rt.define_method(proto, "pop", pop, 0);
    rt.define_method(proto, "join", join, 1);
    rt.define_method(proto, "indexOf", index_of, 1);
    rt.define_method(proto, "slice", slice, 2);
    rt.define_method(proto, "toString", to_string, 0);

    let ctor = rt.new_constructor("Array", construct, 1, proto);
    rt.define_method(&ctor, "isArray", is_array, 1);
    global.define("Array", Property::hidden(Value::Object(ctor)));
}

fn construct(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    if let [Value::Number(n)] = args.args.as_slice() {
        let n = *n;
        if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
            return Err(rt.range_error("Invalid array length"));
        }
        let arr = rt.new_array(Vec::new());
        rt.set_property(&arr, PropertyKey::from("length"), Value::Number(n))?;
        return Ok(Value::Object(arr));
    }
    Ok(Value::Object(rt.new_array(args.args.to_vec())))
}

fn is_array(_rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Bool(args.get(0).as_object().is_some_and(|o| o.is_array())))
}

/// Elements of an array-like `this`, read through `length` and indices.
fn elements(rt: &mut Runtime, this: &Value) -> JsResult<Vec<Value>> {
    if let Some(items) = this.as_object().and_then(|o| o.as_array()) {
        return Ok(items.borrow().clone());
    }
    let len = rt.get_named(this, "length")?;
    let len = rt.to_uint32(&len)?;
    let mut out = Vec::with_capacity(len as usize);
    for i in 0..len {
        out.push(rt.get(this, &PropertyKey::Index(i))?);
    }
    Ok(out)
}

fn push(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    if let Some(items) = args.this.as_object().and_then(|o| o.as_array()) {
        let mut items = items.borrow_mut();
        items.extend(args.args.iter().cloned());
        return Ok(Value::Number(items.len() as f64));
    }
    let len = rt.get_named(&args.this, "length")?;
    let mut len = rt.to_uint32(&len)?;
    for v in args.args.iter() {
        rt.put(&args.this, PropertyKey::Index(len), v.clone())?;
        len += 1;
    }
    rt.put(&args.this, PropertyKey::from("length"), Value::Number(len as f64))?;
    Ok(Value::Number(len as f64))
}

fn pop(_rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    match args.this.as_object().and_then(|o| o.as_array()) {
        Some(items) => Ok(items.borrow_mut().pop().unwrap_or_default()),
        None => Ok(Value::Undefined),
    }
}

fn join(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let sep = match args.get(0) {
        Value::Undefined => ",".into(),
        v => rt.to_string(&v)?,
    };
    let items = elements(rt, &args.this)?;
    let mut out = String::new();
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(&sep);
        }
        if !v.is_nullish() {
            out.push_str(&rt.to_string(v)?);
        }
    }
    Ok(Value::from(out))
}

fn to_string(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let call = CallArgs {
        this: args.this.clone(),
        args: Default::default(),
        callee: args.callee.clone(),
        is_construct: false,
    };
    join(rt, &call)
}

fn index_of(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let needle = args.get(0);
    let items = elements(rt, &args.this)?;
    let start = relative_index(rt, &args.get(1), items.len(), 0)?;
    let found = items[start..].iter().position(|v| v.strict_equals(&needle));
    Ok(Value::Number(found.map_or(-1.0, |i| (i + start) as f64)))
}

fn slice(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let items = elements(rt, &args.this)?;
    let len = items.len();
    let start = relative_index(rt, &args.get(0), len, 0)?;
    let end = relative_index(rt, &args.get(1), len, len)?;
    let part = if start < end { items[start..end].to_vec() } else { Vec::new() };
    Ok(Value::Object(rt.new_array(part)))
}

/// Resolves a possibly negative position against `len`; `undefined` yields `default`.
pub(super) fn relative_index(rt: &mut Runtime, v: &Value, len: usize, default: usize) -> JsResult<usize> {
    if v.is_undefined() {
        return Ok(default);
    }
    let n = to_integer(rt.to_number(v)?);
    let len = len as i64;
    let i = if n < 0 { (len + n).max(0) } else { n.min(len) };
    Ok(i as usize)
}
