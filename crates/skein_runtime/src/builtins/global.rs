use crate::core::Value;
use crate::core::number;
use crate::runtime::{CallArgs, JsResult, Runtime};

pub(crate) fn parse_int(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let s = rt.to_string(&args.get(0))?;
    let radix = rt.to_int32(&args.get(1))?;
    Ok(Value::Number(number::parse_int(&s, radix)))
}

pub(crate) fn parse_float(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let s = rt.to_string(&args.get(0))?;
    Ok(Value::Number(number::parse_float(&s)))
}

pub(crate) fn is_nan(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Bool(rt.to_number(&args.get(0))?.is_nan()))
}

pub(crate) fn is_finite(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Bool(rt.to_number(&args.get(0))?.is_finite()))
}
