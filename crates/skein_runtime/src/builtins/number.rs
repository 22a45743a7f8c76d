use crate::core::number::number_to_string;
use crate::core::{ObjRef, Property, Value};
use crate::runtime::{CallArgs, Intrinsics, JsResult, Runtime};

pub(super) fn install(rt: &mut Runtime, global: &ObjRef, intrinsics: &Intrinsics) {
    let proto = &intrinsics.number_proto;
    rt.define_method(proto, "toString", number_to_str, 1);
    rt.define_method(proto, "valueOf", number_value_of, 0);
    let ctor = rt.new_constructor("Number", construct_number, 1, proto);
    global.define("Number", Property::hidden(Value::Object(ctor)));

    let proto = &intrinsics.boolean_proto;
    rt.define_method(proto, "toString", boolean_to_str, 0);
    rt.define_method(proto, "valueOf", boolean_value_of, 0);
    let ctor = rt.new_constructor("Boolean", construct_boolean, 1, proto);
    global.define("Boolean", Property::hidden(Value::Object(ctor)));
}

fn construct_number(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    if args.is_empty() {
        return Ok(Value::Number(0.0));
    }
    Ok(Value::Number(rt.to_number(&args.get(0))?))
}

fn this_number(rt: &mut Runtime, args: &CallArgs) -> JsResult<f64> {
    match args.this {
        Value::Number(n) => Ok(n),
        _ => Err(rt.type_error("Number.prototype.valueOf requires that 'this' be a Number")),
    }
}

fn number_value_of(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Number(this_number(rt, args)?))
}

fn number_to_str(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let n = this_number(rt, args)?;
    let radix = match args.get(0) {
        Value::Undefined => 10,
        v => rt.to_int32(&v)?,
    };
    if !(2..=36).contains(&radix) {
        return Err(rt.range_error("toString() radix must be between 2 and 36"));
    }
    if radix == 10 || !n.is_finite() || n.fract() != 0.0 {
        return Ok(Value::from(number_to_string(n)));
    }
    Ok(Value::from(integer_in_radix(n, radix as u32)))
}

fn integer_in_radix(n: f64, radix: u32) -> String {
    let mut digits = Vec::new();
    let mut rest = n.abs();
    while rest >= 1.0 {
        let d = (rest % radix as f64) as u32;
        digits.push(char::from_digit(d, radix).unwrap_or('0'));
        rest = (rest / radix as f64).floor();
    }
    if digits.is_empty() {
        digits.push('0');
    }
    if n < 0.0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn construct_boolean(_rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Bool(args.get(0).truthy()))
}

fn this_boolean(rt: &mut Runtime, args: &CallArgs) -> JsResult<bool> {
    match args.this {
        Value::Bool(b) => Ok(b),
        _ => Err(rt.type_error("Boolean.prototype.valueOf requires that 'this' be a Boolean")),
    }
}

fn boolean_value_of(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Bool(this_boolean(rt, args)?))
}

fn boolean_to_str(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::str(if this_boolean(rt, args)? { "true" } else { "false" }))
}
