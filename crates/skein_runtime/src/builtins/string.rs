//! String methods. Positions count UTF-16 code units.

use std::rc::Rc;

use super::array::relative_index;
use crate::core::number::to_integer;
use crate::core::{ObjRef, Property, Value};
use crate::runtime::{CallArgs, Intrinsics, JsResult, Runtime};

pub(super) fn install(rt: &mut Runtime, global: &ObjRef, intrinsics: &Intrinsics) {
    let proto = &intrinsics.string_proto;
    rt.define_method(proto, "charCodeAt", char_code_at, 1);
    rt.define_method(proto, "charAt", char_at, 1);
    rt.define_method(proto, "indexOf", index_of, 1);
    rt.define_method(proto, "slice", slice, 2);
    rt.define_method(proto, "substring", substring, 2);
    rt.define_method(proto, "split", split, 2);
    rt.define_method(proto, "toString", to_string, 0);
    rt.define_method(proto, "valueOf", to_string, 0);

    let ctor = rt.new_constructor("String", construct, 1, proto);
    rt.define_method(&ctor, "fromCharCode", from_char_code, 1);
    global.define("String", Property::hidden(Value::Object(ctor)));
}

fn units(rt: &mut Runtime, this: &Value) -> JsResult<Vec<u16>> {
    if this.is_nullish() {
        return Err(rt.type_error("String.prototype method called on null or undefined"));
    }
    Ok(rt.to_string(this)?.encode_utf16().collect())
}

fn from_units(units: &[u16]) -> Value {
    Value::from(String::from_utf16_lossy(units))
}

fn construct(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    if args.is_empty() {
        return Ok(Value::str(""));
    }
    Ok(Value::String(rt.to_string(&args.get(0))?))
}

fn from_char_code(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let mut out = Vec::with_capacity(args.len());
    for v in args.args.iter() {
        out.push(rt.to_uint32(v)? as u16);
    }
    Ok(from_units(&out))
}

fn position(rt: &mut Runtime, v: &Value) -> JsResult<i64> {
    Ok(to_integer(rt.to_number(v)?))
}

fn char_code_at(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let s = units(rt, &args.this)?;
    let i = position(rt, &args.get(0))?;
    Ok(Value::Number(
        usize::try_from(i)
            .ok()
            .and_then(|i| s.get(i))
            .map_or(f64::NAN, |u| *u as f64),
    ))
}

fn char_at(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let s = units(rt, &args.this)?;
    let i = position(rt, &args.get(0))?;
    Ok(match usize::try_from(i).ok().and_then(|i| s.get(i)) {
        Some(u) => from_units(&[*u]),
        None => Value::str(""),
    })
}

fn index_of(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let s = units(rt, &args.this)?;
    let needle: Vec<u16> = rt.to_string(&args.get(0))?.encode_utf16().collect();
    let start = position(rt, &args.get(1))?.clamp(0, s.len() as i64) as usize;
    let found = find(&s, &needle, start);
    Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

fn find(hay: &[u16], needle: &[u16], start: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(start.min(hay.len()));
    }
    (start..=hay.len().checked_sub(needle.len())?).find(|&i| hay[i..].starts_with(needle))
}

fn slice(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let s = units(rt, &args.this)?;
    let start = relative_index(rt, &args.get(0), s.len(), 0)?;
    let end = relative_index(rt, &args.get(1), s.len(), s.len())?;
    Ok(if start < end { from_units(&s[start..end]) } else { Value::str("") })
}

fn substring(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let s = units(rt, &args.this)?;
    let len = s.len() as i64;
    let a = position(rt, &args.get(0))?.clamp(0, len) as usize;
    let b = match args.get(1) {
        Value::Undefined => s.len(),
        v => position(rt, &v)?.clamp(0, len) as usize,
    };
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    Ok(from_units(&s[lo..hi]))
}

fn split(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let s = units(rt, &args.this)?;
    let limit = match args.get(1) {
        Value::Undefined => u32::MAX,
        v => rt.to_uint32(&v)?,
    } as usize;
    let parts: Vec<Value> = match args.get(0) {
        Value::Undefined => vec![from_units(&s)],
        sep => {
            let sep: Vec<u16> = rt.to_string(&sep)?.encode_utf16().collect();
            if sep.is_empty() {
                s.iter().map(|u| from_units(&[*u])).collect()
            } else {
                let mut out = Vec::new();
                let mut from = 0;
                while let Some(i) = find(&s, &sep, from) {
                    out.push(from_units(&s[from..i]));
                    from = i + sep.len();
                }
                out.push(from_units(&s[from..]));
                out
            }
        }
    };
    let parts = parts.into_iter().take(limit).collect();
    Ok(Value::Object(rt.new_array(parts)))
}

fn to_string(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    match &args.this {
        Value::String(s) => Ok(Value::String(Rc::clone(s))),
        _ => Err(rt.type_error("String.prototype.toString requires that 'this' be a String")),
    }
}
