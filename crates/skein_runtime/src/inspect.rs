//! Human-readable rendering of values for interactive result printing.

use std::fmt::Write;

use crate::core::{FunctionKind, ObjRef, ObjectKind, PropertyKey, Value};
use crate::runtime::{JsResult, Runtime};

/// Nesting below this many levels renders as an ellipsis.
const DEFAULT_DEPTH: usize = 2;

/// Strings quoted, arrays as `[a, b]`, objects as `{k: v}`; cycles print `[Circular]`.
pub fn inspect(rt: &mut Runtime, value: &Value) -> JsResult<String> {
    let mut seen = Vec::new();
    let mut out = String::new();
    render(rt, value, DEFAULT_DEPTH, &mut seen, &mut out)?;
    Ok(out)
}

fn render(
    rt: &mut Runtime,
    value: &Value,
    depth: usize,
    seen: &mut Vec<ObjRef>,
    out: &mut String,
) -> JsResult<()> {
    let obj = match value {
        Value::String(s) => {
            quote(s, out);
            return Ok(());
        }
        Value::Object(o) => o.clone(),
        _ => {
            out.push_str(&rt.to_string(value)?);
            return Ok(());
        }
    };
    if seen.iter().any(|s| ObjRef::ptr_eq(s, &obj)) {
        out.push_str("[Circular]");
        return Ok(());
    }
    match obj.kind() {
        ObjectKind::Function(FunctionKind::Script(c)) => {
            out.push_str(c.source.text.slice(c.node.span));
            return Ok(());
        }
        ObjectKind::Function(FunctionKind::Native(n)) => {
            let _ = write!(out, "function {}() {{ [native code] }}", n.name);
            return Ok(());
        }
        ObjectKind::Error => {
            out.push_str(&rt.to_string(value)?);
            return Ok(());
        }
        ObjectKind::Host(h) => {
            let _ = write!(out, "[object {}]", h.class_name());
            return Ok(());
        }
        ObjectKind::Array(_) | ObjectKind::Ordinary => {}
    }

    let is_array = obj.is_array();
    let (open, close) = if is_array { ('[', ']') } else { ('{', '}') };
    if depth == 0 {
        out.push(open);
        out.push_str("...");
        out.push(close);
        return Ok(());
    }
    seen.push(obj.clone());
    out.push(open);
    let keys = rt.own_keys(&obj);
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if !is_array {
            out.push_str(key);
            out.push_str(": ");
        }
        let v = rt.get_property(&obj, &PropertyKey::from_name(key.clone()), value)?;
        render(rt, &v, depth - 1, seen, out)?;
    }
    out.push(close);
    seen.pop();
    Ok(())
}

fn quote(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
