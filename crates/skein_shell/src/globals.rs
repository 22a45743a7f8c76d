//! Globals every realm of the shell gets.

use skein_core::{Buffer, to_uint32};
use skein_runtime::{
    BuiltinProvider, BuiltinRegistry, CallArgs, Exception, JsResult, Runtime, Value,
};
use tracing::debug;

use crate::buffers::{self, array_buffer_prototype, wrap_buffer};
use crate::driver::execute_string;
use crate::error::ShellError;
use crate::instance::shell_state;
use crate::io::{exit_process, read_bytes, read_continued_line, read_text};

pub struct ShellGlobals;

impl BuiltinProvider for ShellGlobals {
    fn install(&self, registry: &mut BuiltinRegistry) {
        registry.register("print", print, 0);
        registry.register("write", write, 0);
        registry.register("read", read, 1);
        registry.register("readbuffer", readbuffer, 1);
        registry.register("readline", readline, 0);
        registry.register("load", load, 1);
        registry.register("quit", quit, 1);
        registry.register("version", version, 0);

        let mut realm = BuiltinRegistry::new();
        realm.register("current", realm_current, 0);
        realm.register("owner", realm_owner, 1);
        realm.register("global", realm_global, 1);
        realm.register("create", realm_create, 0);
        realm.register("dispose", realm_dispose, 1);
        realm.register("switch", realm_switch, 1);
        realm.register("eval", realm_eval, 2);
        realm.register_accessor("shared", Some(realm_shared_get), Some(realm_shared_set));
        registry.register_namespace("Realm", realm);

        buffers::register(registry);
    }
}

// Output and input

fn write_args(rt: &mut Runtime, args: &CallArgs, newline: bool) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let mut text = String::new();
    for (i, arg) in args.args.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        text.push_str(&rt.to_string(arg)?);
    }
    if newline {
        text.push('\n');
    }
    state.emit(&text);
    if newline {
        state.flush();
    }
    Ok(Value::Undefined)
}

fn print(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    write_args(rt, args, true)
}

fn write(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    write_args(rt, args, false)
}

fn path_arg(rt: &mut Runtime, args: &CallArgs) -> JsResult<String> {
    match args.args.first() {
        Some(v) => Ok(rt.to_string(v)?.to_string()),
        None => Err(rt.throw_string("Error loading file")),
    }
}

fn read(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let path = path_arg(rt, args)?;
    match read_text(Some(&state.lock), &path) {
        Ok(text) => Ok(Value::str(&text)),
        Err(_) => Err(rt.throw_string("Error loading file")),
    }
}

fn readbuffer(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let path = path_arg(rt, args)?;
    let Ok(bytes) = read_bytes(Some(&state.lock), &path) else {
        return Err(rt.throw_string("Error reading file"));
    };
    let buffer =
        Buffer::from_bytes(&state.arena, bytes).map_err(|e| rt.throw_string(e.message()))?;
    let proto = array_buffer_prototype(rt)?;
    Ok(Value::Object(wrap_buffer(rt, proto, buffer)))
}

fn readline(rt: &mut Runtime, _args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let line = {
        let mut input = state.input.borrow_mut();
        read_continued_line(&mut input, &state.lock)
    };
    Ok(match line {
        Ok(Some(line)) => Value::str(&line),
        Ok(None) | Err(_) => Value::Undefined,
    })
}

/// Runs each named file in the current realm, reporting failures.
fn load(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    for arg in args.args.iter() {
        let path = rt.to_string(arg)?.to_string();
        let Ok(source) = read_text(Some(&state.lock), &path) else {
            return Err(rt.throw_string("Error loading file"));
        };
        if !execute_string(rt, &source, &path, false, true) {
            return Err(rt.throw_string("Error executing file"));
        }
    }
    Ok(Value::Undefined)
}

fn quit(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let code = rt.to_int32(&args.get(0))?;
    if let Ok(state) = shell_state(rt) {
        state.flush();
    }
    debug!(code, "quit");
    exit_process(code)
}

fn version(_rt: &mut Runtime, _args: &CallArgs) -> JsResult<Value> {
    Ok(Value::str(env!("CARGO_PKG_VERSION")))
}

// Realm

fn invalid_argument(rt: &Runtime) -> Exception {
    rt.throw_string("Invalid argument")
}

fn realm_error(rt: &Runtime, e: ShellError) -> Exception {
    rt.throw_string(&e.to_string())
}

/// The realm index in argument 0, which must be a number.
fn realm_index(rt: &Runtime, args: &CallArgs) -> JsResult<usize> {
    match args.args.first().and_then(Value::as_number) {
        Some(n) => Ok(to_uint32(n) as usize),
        None => Err(invalid_argument(rt)),
    }
}

fn index_value(index: Option<usize>) -> Value {
    index.map_or(Value::Undefined, |i| Value::Number(i as f64))
}

fn realm_current(rt: &mut Runtime, _args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let index = state.realms.borrow().current_of(rt);
    Ok(index_value(index))
}

fn realm_owner(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let Some(obj) = args.args.first().and_then(Value::as_object) else {
        return Err(invalid_argument(rt));
    };
    let index = state.realms.borrow().owner_of(obj);
    Ok(index_value(index))
}

fn realm_global(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let index = realm_index(rt, args)?;
    let global = state.realms.borrow().global(index);
    global
        .map(Value::Object)
        .map_err(|e| realm_error(rt, e))
}

fn realm_create(rt: &mut Runtime, _args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let index = state.realms.borrow_mut().create(rt, &[&ShellGlobals]);
    Ok(Value::Number(index as f64))
}

fn realm_dispose(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let index = realm_index(rt, args)?;
    let disposed = state.realms.borrow_mut().dispose(rt, index);
    disposed.map_err(|e| realm_error(rt, e))?;
    Ok(Value::Undefined)
}

fn realm_switch(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let index = realm_index(rt, args)?;
    let switched = state.realms.borrow_mut().switch_to(index);
    switched.map_err(|e| realm_error(rt, e))?;
    Ok(Value::Undefined)
}

/// Runs source in another realm and returns its completion value. Source that fails to
/// compile yields `undefined`.
fn realm_eval(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let index = realm_index(rt, args)?;
    let Some(Value::String(source)) = args.args.get(1) else {
        return Err(invalid_argument(rt));
    };
    let ctx = state.realms.borrow().context(index);
    let ctx = ctx.map_err(|e| realm_error(rt, e))?;
    let Ok(script) = rt.compile(source, "unnamed") else {
        return Ok(Value::Undefined);
    };
    rt.run_in(&ctx, &script)
}

fn realm_shared_get(rt: &mut Runtime, _args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    let shared = state.realms.borrow().shared();
    Ok(shared)
}

fn realm_shared_set(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let state = shell_state(rt)?;
    state.realms.borrow_mut().set_shared(args.get(0));
    Ok(Value::Undefined)
}
