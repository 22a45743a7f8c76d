//! Script bindings for buffers and typed views.
//!
//! An `ArrayBuffer` object carries a `BufferHost`, whose `Buffer` handle is released when the
//! object is dropped. A view object carries a `ViewHost`: its layout plus a strong reference to
//! the buffer object, so the storage outlives every view onto it.

use std::any::Any;

use skein_core::copy::{check_set_bounds, copy_between, copy_within};
use skein_core::{Buffer, ElementKind, MemoryError, ViewLayout, array_length};
use skein_runtime::{
    BuiltinRegistry, CallArgs, ClassSpec, Exception, FunctionKind, HostObject, JsResult, ObjRef,
    Property, PropertyKey, Runtime, Value,
};
use smallvec::smallvec;

use crate::instance::shell_state;

pub struct BufferHost {
    pub(crate) buffer: Buffer,
}

impl HostObject for BufferHost {
    fn class_name(&self) -> &'static str {
        "ArrayBuffer"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ViewHost {
    pub(crate) layout: ViewLayout,
    pub(crate) buffer_obj: ObjRef,
}

impl ViewHost {
    fn buffer(&self) -> Option<&Buffer> {
        self.buffer_obj.host::<BufferHost>().map(|b| &b.buffer)
    }
}

impl HostObject for ViewHost {
    fn class_name(&self) -> &'static str {
        self.layout.kind.name()
    }

    fn length(&self) -> Option<u32> {
        Some(self.layout.length as u32)
    }

    fn get_index(&self, index: u32) -> Option<Value> {
        let buffer = self.buffer()?;
        let bytes = buffer.bytes();
        self.layout.get(&bytes, index as usize).map(Value::Number)
    }

    fn set_index(&self, index: u32, value: f64) -> bool {
        let Some(buffer) = self.buffer() else {
            return false;
        };
        let mut bytes = buffer.bytes_mut();
        self.layout.set(&mut bytes, index as usize, value)
    }

    fn trace(&self, visit: &mut dyn FnMut(&ObjRef)) {
        visit(&self.buffer_obj);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Adds `ArrayBuffer` and the nine view constructors.
pub(crate) fn register(registry: &mut BuiltinRegistry) {
    registry.register_class(
        ClassSpec::new("ArrayBuffer", array_buffer, 1).method("slice", array_buffer_slice, 2),
    );
    for kind in ElementKind::ALL {
        registry.register_class(
            ClassSpec::new(kind.name(), typed_array, 1)
                .method("set", view_set, 2)
                .method("subarray", view_subarray, 2)
                .constant("BYTES_PER_ELEMENT", Value::Number(kind.size() as f64)),
        );
    }
}

fn memory_error(rt: &Runtime, e: MemoryError) -> Exception {
    rt.throw_string(e.message())
}

/// A script count checked as a length: truncated to 32 bits, then range-checked.
fn convert_to_length(rt: &mut Runtime, v: &Value) -> JsResult<usize> {
    let raw = rt.to_int32(v)?;
    array_length(raw).map_err(|e| memory_error(rt, e))
}

fn number(n: usize) -> Value {
    Value::Number(n as f64)
}

fn prototype_of(rt: &mut Runtime, ctor: &ObjRef) -> JsResult<Option<ObjRef>> {
    let proto = rt.get_named(&Value::Object(ctor.clone()), "prototype")?;
    Ok(proto.as_object().cloned())
}

/// Wraps `buffer` in a script object inheriting from `proto`.
pub(crate) fn wrap_buffer(rt: &mut Runtime, proto: Option<ObjRef>, buffer: Buffer) -> ObjRef {
    let len = buffer.byte_length();
    let obj = rt.new_host_object(proto, Box::new(BufferHost { buffer }));
    obj.define("byteLength", Property::readonly(number(len)));
    obj
}

/// `ArrayBuffer.prototype` of the current realm.
pub(crate) fn array_buffer_prototype(rt: &mut Runtime) -> JsResult<Option<ObjRef>> {
    let global = Value::Object(rt.context().global());
    match rt.get_named(&global, "ArrayBuffer")? {
        Value::Object(ctor) => prototype_of(rt, &ctor),
        _ => Ok(None),
    }
}

fn array_buffer(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    if args.is_empty() {
        return Err(rt.throw_string("ArrayBuffer constructor must have one argument"));
    }
    let length = convert_to_length(rt, &args.get(0))?;
    let state = shell_state(rt)?;
    let buffer = Buffer::allocate(&state.arena, length as i64).map_err(|e| memory_error(rt, e))?;
    let proto = prototype_of(rt, &args.callee)?;
    Ok(Value::Object(wrap_buffer(rt, proto, buffer)))
}

fn buffer_receiver(this: &Value) -> Option<ObjRef> {
    this.as_object()
        .filter(|o| o.host::<BufferHost>().is_some())
        .cloned()
}

fn view_receiver(this: &Value) -> Option<ObjRef> {
    this.as_object()
        .filter(|o| o.host::<ViewHost>().is_some())
        .cloned()
}

/// `begin` and the optional `end` of `slice` and `subarray`.
fn range_args(rt: &mut Runtime, args: &CallArgs) -> JsResult<(i32, Option<i32>)> {
    let begin = rt.to_int32(&args.get(0))?;
    let end = if args.has(1) {
        Some(rt.to_int32(&args.get(1))?)
    } else {
        None
    };
    Ok((begin, end))
}

fn array_buffer_slice(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let Some(obj) = buffer_receiver(&args.this) else {
        return Err(rt.throw_string("'slice' invoked on wrong receiver type"));
    };
    if args.is_empty() {
        return Err(rt.throw_string("'slice' must have at least one argument"));
    }
    let (begin, end) = range_args(rt, args)?;
    let sliced = match obj.host::<BufferHost>() {
        Some(host) => host.buffer.slice(begin, end),
        None => return Ok(Value::Undefined),
    };
    let sliced = sliced.map_err(|e| memory_error(rt, e))?;
    Ok(Value::Object(wrap_buffer(rt, obj.proto(), sliced)))
}

/// Element kind of a view constructor, from its name.
fn kind_of(callee: &ObjRef) -> Option<ElementKind> {
    let Some(FunctionKind::Native(f)) = callee.as_function() else {
        return None;
    };
    ElementKind::ALL.into_iter().find(|k| k.name() == &*f.name)
}

fn make_view(rt: &mut Runtime, proto: Option<ObjRef>, layout: ViewLayout, buffer_obj: ObjRef) -> ObjRef {
    let host = ViewHost {
        layout,
        buffer_obj: buffer_obj.clone(),
    };
    let view = rt.new_host_object(proto, Box::new(host));
    view.define("buffer", Property::readonly(Value::Object(buffer_obj)));
    view.define("byteOffset", Property::readonly(number(layout.byte_offset)));
    view.define("byteLength", Property::readonly(number(layout.byte_length())));
    view.define("length", Property::readonly(number(layout.length)));
    view.define(
        "BYTES_PER_ELEMENT",
        Property::readonly(number(layout.kind.size())),
    );
    view
}

/// A fresh buffer of `byte_length` bytes, made through the realm's `ArrayBuffer`.
fn new_backing_buffer(rt: &mut Runtime, byte_length: usize) -> JsResult<ObjRef> {
    let global = Value::Object(rt.context().global());
    let ctor = rt.get_named(&global, "ArrayBuffer")?;
    let made = rt.construct(&ctor, smallvec![number(byte_length)])?;
    match made.as_object() {
        Some(o) if o.host::<BufferHost>().is_some() => Ok(o.clone()),
        _ => Err(rt.throw_string("ArrayBuffer constructor did not return a buffer")),
    }
}

/// `new View(length)`, `new View(arrayLike)` or `new View(buffer, byteOffset?, length?)`.
fn typed_array(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    if args.is_empty() {
        return Err(rt.throw_string("Array constructor must have at least one argument"));
    }
    let Some(kind) = kind_of(&args.callee) else {
        return Err(rt.throw_string("Array constructor invoked on unknown element type"));
    };
    let first = args.get(0);
    let buffer_arg = first
        .as_object()
        .filter(|o| o.host::<BufferHost>().is_some())
        .cloned();

    let (layout, buffer_obj, init) = if let Some(buffer_obj) = buffer_arg {
        let buffer_len = buffer_obj
            .host::<BufferHost>()
            .map_or(0, |b| b.buffer.byte_length());
        let byte_offset = if args.has(1) {
            Some(rt.to_int32(&args.get(1))?)
        } else {
            None
        };
        let length = if args.has(2) {
            Some(rt.to_int32(&args.get(2))?)
        } else {
            None
        };
        let layout = ViewLayout::over_buffer(kind, buffer_len, byte_offset, length)
            .map_err(|e| memory_error(rt, e))?;
        (layout, buffer_obj, None)
    } else {
        let init = match first.as_object() {
            Some(o) if rt.has_property(o, &PropertyKey::from("length")) => Some(o.clone()),
            _ => None,
        };
        let length = match &init {
            Some(o) => {
                let raw = rt.get_named(&Value::Object(o.clone()), "length")?;
                convert_to_length(rt, &raw)?
            }
            None => convert_to_length(rt, &first)?,
        };
        let layout = ViewLayout::fresh(kind, length).map_err(|e| memory_error(rt, e))?;
        let buffer_obj = new_backing_buffer(rt, layout.byte_length())?;
        (layout, buffer_obj, init)
    };

    let proto = prototype_of(rt, &args.callee)?;
    let view = make_view(rt, proto, layout, buffer_obj);
    if let Some(source) = init {
        let source = Value::Object(source);
        for i in 0..layout.length as u32 {
            let v = rt.get(&source, &PropertyKey::Index(i))?;
            rt.set_property(&view, PropertyKey::Index(i), v)?;
        }
    }
    Ok(Value::Object(view))
}

fn view_subarray(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let Some(obj) = view_receiver(&args.this) else {
        return Err(rt.throw_string("'subarray' invoked on wrong receiver type"));
    };
    if args.is_empty() {
        return Err(rt.throw_string("'subarray' must have at least one argument"));
    }
    let (begin, end) = range_args(rt, args)?;
    let Some(host) = obj.host::<ViewHost>() else {
        return Ok(Value::Undefined);
    };
    let layout = host.layout.subarray(begin, end);
    let buffer_obj = host.buffer_obj.clone();
    Ok(Value::Object(make_view(rt, obj.proto(), layout, buffer_obj)))
}

fn view_set(rt: &mut Runtime, args: &CallArgs) -> JsResult<Value> {
    let Some(dst_obj) = view_receiver(&args.this) else {
        return Err(rt.throw_string("'set' invoked on wrong receiver type"));
    };
    if args.is_empty() {
        return Err(rt.throw_string("'set' must have at least one argument"));
    }
    let source = args.get(0);
    let src_obj = match source.as_object() {
        Some(o) if rt.has_property(o, &PropertyKey::from("length")) => o.clone(),
        _ => return Err(rt.throw_string("'set' invoked with non-array argument")),
    };
    let raw_len = rt.get_named(&source, "length")?;
    let source_len = convert_to_length(rt, &raw_len)?;
    let offset = if args.has(1) {
        convert_to_length(rt, &args.get(1))?
    } else {
        0
    };

    let Some(dst) = dst_obj.host::<ViewHost>() else {
        return Ok(Value::Undefined);
    };
    check_set_bounds(&dst.layout, offset, source_len).map_err(|e| memory_error(rt, e))?;

    if let Some(src) = src_obj.host::<ViewHost>() {
        copy_views(dst, offset, src);
        return Ok(Value::Undefined);
    }
    for i in 0..source_len {
        let v = rt.get(&source, &PropertyKey::Index(i as u32))?;
        rt.set_property(&dst_obj, PropertyKey::Index((offset + i) as u32), v)?;
    }
    Ok(Value::Undefined)
}

/// Copies every element of `src` into `dst` from element `offset` on, correct for any overlap
/// when both share one buffer. Views of one instance always share its arena.
fn copy_views(dst: &ViewHost, offset: usize, src: &ViewHost) {
    let (Some(dst_buf), Some(src_buf)) = (dst.buffer(), src.buffer()) else {
        return;
    };
    let mut arena = dst_buf.arena().borrow_mut();
    if dst_buf.id() == src_buf.id() {
        copy_within(arena.bytes_mut(dst_buf.id()), &dst.layout, offset, &src.layout);
    } else {
        let (src_bytes, dst_bytes) = arena.pair_mut(src_buf.id(), dst_buf.id());
        copy_between(dst_bytes, &dst.layout, offset, src_bytes, &src.layout);
    }
}
