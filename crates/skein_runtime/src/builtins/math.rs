use crate::core::Value;
use crate::runtime::{CallArgs, JsResult, Runtime};

fn arg(rt: &mut Runtime, args: &CallArgs, i: usize) -> JsResult<f64> {
    rt.to_number(&args.get(i))
}

pub(crate) fn floor(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Number(arg(rt, args, 0)?.floor()))
}

pub(crate) fn ceil(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Number(arg(rt, args, 0)?.ceil()))
}

/// Halves round towards +Infinity.
pub(crate) fn round(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let x = arg(rt, args, 0)?;
    if !x.is_finite() || x.fract() == 0.0 {
        return Ok(Value::Number(x));
    }
    let r = (x + 0.5).floor();
    // -0.5 <= x < 0 rounds to -0.
    Ok(Value::Number(if r == 0.0 && x < 0.0 { -0.0 } else { r }))
}

pub(crate) fn abs(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Number(arg(rt, args, 0)?.abs()))
}

pub(crate) fn sqrt(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    Ok(Value::Number(arg(rt, args, 0)?.sqrt()))
}

pub(crate) fn pow(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let base = arg(rt, args, 0)?;
    let exp = arg(rt, args, 1)?;
    if exp.is_nan() || (base.abs() == 1.0 && exp.is_infinite()) {
        return Ok(Value::Number(f64::NAN));
    }
    Ok(Value::Number(base.powf(exp)))
}

pub(crate) fn min(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    fold(rt, args, f64::INFINITY, |a, b| if b < a || (b == 0.0 && a == 0.0 && b.is_sign_negative()) { b } else { a })
}

pub(crate) fn max(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    fold(rt, args, f64::NEG_INFINITY, |a, b| if b > a || (b == 0.0 && a == 0.0 && b.is_sign_positive()) { b } else { a })
}

fn fold(rt: &mut Runtime, args: &CallArgs, init: f64, pick: fn(f64, f64) -> f64) -> JsResult<Value> {
    let mut acc = init;
    let mut nan = false;
    for v in args.args.iter() {
        let n = rt.to_number(v)?;
        if n.is_nan() {
            nan = true;
        } else {
            acc = pick(acc, n);
        }
    }
    Ok(Value::Number(if nan { f64::NAN } else { acc }))
}
