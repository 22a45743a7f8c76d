//! Object operations shared by the evaluator, the builtins and embedders.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use super::{CallArgs, ErrorKind, Exception, Intrinsics, JsResult, Runtime};
use crate::core::number::{number_to_string, string_to_number, to_int32, to_uint32};
use crate::core::{
    ContextId, FunctionKind, HostObject, NativeFn, NativeFunction, ObjRef, Object, ObjectKind,
    Property, PropertyKey, Scope, Value, fast_map_new,
};
use crate::errors::messages;

pub type Args = SmallVec<[Value; 4]>;

/// Arrays grow densely; writes further than this past the end are stored as named properties.
const MAX_DENSE_GAP: usize = 1 << 20;

impl Runtime {
    fn creation_proto(&mut self, pick: fn(&Intrinsics) -> &ObjRef) -> (ContextId, Option<ObjRef>) {
        let ctx = self.context();
        let proto = ctx.intrinsics().map(|i| pick(i).clone());
        (ctx.id(), proto)
    }

    /// Registers a freshly built object with this runtime's heap.
    pub(crate) fn alloc(&mut self, obj: ObjRef) -> ObjRef {
        self.heap.track_object(&obj);
        obj
    }

    pub(crate) fn new_scope(&mut self, parent: Option<Rc<Scope>>) -> Rc<Scope> {
        let scope = Scope::new(parent);
        self.heap.track_scope(&scope);
        scope
    }

    pub fn new_object(&mut self) -> ObjRef {
        let (id, proto) = self.creation_proto(|i| &i.object_proto);
        self.alloc(Object::new(id, proto, ObjectKind::Ordinary))
    }

    pub fn new_object_with_proto(&mut self, proto: Option<ObjRef>, kind: ObjectKind) -> ObjRef {
        let id = self.context().id();
        self.alloc(Object::new(id, proto, kind))
    }

    pub fn new_array(&mut self, items: Vec<Value>) -> ObjRef {
        let (id, proto) = self.creation_proto(|i| &i.array_proto);
        self.alloc(Object::new(id, proto, ObjectKind::Array(RefCell::new(items))))
    }

    pub fn new_host_object(&mut self, proto: Option<ObjRef>, host: Box<dyn HostObject>) -> ObjRef {
        self.new_object_with_proto(proto, ObjectKind::Host(host))
    }

    pub fn new_native_function(&mut self, name: &str, func: NativeFn, arity: u32) -> ObjRef {
        self.native_function(name, func, arity, false)
    }

    /// A native constructor whose instances inherit from `prototype`.
    pub fn new_constructor(
        &mut self,
        name: &str,
        func: NativeFn,
        arity: u32,
        prototype: &ObjRef,
    ) -> ObjRef {
        let ctor = self.native_function(name, func, arity, true);
        ctor.define("prototype", Property::fixed(Value::Object(prototype.clone())));
        prototype.define("constructor", Property::hidden(Value::Object(ctor.clone())));
        ctor
    }

    fn native_function(&mut self, name: &str, func: NativeFn, arity: u32, constructor: bool) -> ObjRef {
        let (id, proto) = self.creation_proto(|i| &i.function_proto);
        let kind = ObjectKind::Function(FunctionKind::Native(NativeFunction {
            name: Rc::from(name),
            func,
            arity,
            constructor,
        }));
        let f = self.alloc(Object::new(id, proto, kind));
        f.define("length", Property::fixed(Value::Number(arity as f64)));
        f.define("name", Property::fixed(Value::str(name)));
        f
    }

    /// Installs a native method, skipped by enumeration.
    pub fn define_method(&mut self, target: &ObjRef, name: &str, func: NativeFn, arity: u32) {
        let f = self.new_native_function(name, func, arity);
        target.define(name, Property::hidden(Value::Object(f)));
    }

    pub fn define_accessor(
        &mut self,
        target: &ObjRef,
        name: &str,
        getter: Option<NativeFn>,
        setter: Option<NativeFn>,
    ) {
        let getter = getter.map(|g| self.new_native_function(name, g, 0));
        let setter = setter.map(|s| self.new_native_function(name, s, 1));
        target.define(name, Property::Accessor { getter, setter });
    }

    /// The `prototype` object of a script function, created on first use.
    pub(crate) fn ensure_prototype(&mut self, func: &ObjRef) -> Value {
        if let Some(prop) = func.own("prototype") {
            return match prop {
                Property::Data { value, .. } => value,
                Property::Accessor { .. } => Value::Undefined,
            };
        }
        let proto = self.new_object();
        proto.define("constructor", Property::hidden(Value::Object(func.clone())));
        let value = Value::Object(proto);
        func.define(
            "prototype",
            Property::Data {
                value: value.clone(),
                writable: true,
                enumerable: false,
            },
        );
        value
    }

    // Errors

    /// An error object of `kind` with a captured stack.
    pub fn make_error(&mut self, kind: ErrorKind, message: &str) -> ObjRef {
        let ctx = self.context();
        let proto = ctx.intrinsics().map(|i| i.error_proto(kind).clone());
        let err = self.alloc(Object::new(ctx.id(), proto, ObjectKind::Error));
        if !message.is_empty() {
            err.define("message", Property::hidden(Value::str(message)));
        }
        let header = if message.is_empty() {
            kind.name().to_string()
        } else {
            format!("{}: {message}", kind.name())
        };
        let stack = self.capture_stack(header);
        err.define("stack", Property::hidden(Value::str(&stack)));
        err
    }

    pub fn error(&mut self, kind: ErrorKind, message: impl AsRef<str>) -> Exception {
        Exception::new(Value::Object(self.make_error(kind, message.as_ref())))
    }

    pub fn type_error(&mut self, message: impl AsRef<str>) -> Exception {
        self.error(ErrorKind::TypeError, message)
    }

    pub fn range_error(&mut self, message: impl AsRef<str>) -> Exception {
        self.error(ErrorKind::RangeError, message)
    }

    pub fn reference_error(&mut self, message: impl AsRef<str>) -> Exception {
        self.error(ErrorKind::ReferenceError, message)
    }

    /// A bare string exception, as host functions throw them.
    pub fn throw_string(&self, message: &str) -> Exception {
        Exception::new(Value::str(message))
    }

    /// `header` followed by one `at` line per active frame, innermost first.
    pub(crate) fn capture_stack(&self, header: String) -> String {
        let mut out = header;
        let mut pos = self.pos;
        for frame in self.frames.iter().rev() {
            let loc = frame.source.location(pos);
            if frame.name.is_empty() {
                out.push_str(&format!(
                    "\n    at {}:{}:{}",
                    loc.name,
                    loc.line,
                    loc.start_col + 1
                ));
            } else {
                out.push_str(&format!(
                    "\n    at {} ({}:{}:{})",
                    frame.name,
                    loc.name,
                    loc.line,
                    loc.start_col + 1
                ));
            }
            pos = frame.call_site;
        }
        out
    }

    // Property access

    fn primitive_proto(&mut self, v: &Value) -> Option<ObjRef> {
        let ctx = self.context();
        let i = ctx.intrinsics()?;
        Some(match v {
            Value::String(_) => i.string_proto.clone(),
            Value::Number(_) => i.number_proto.clone(),
            Value::Bool(_) => i.boolean_proto.clone(),
            _ => return None,
        })
    }

    /// `base[key]` for any value.
    pub fn get(&mut self, base: &Value, key: &PropertyKey) -> JsResult<Value> {
        match base {
            Value::Object(o) => self.get_property(o, key, base),
            Value::Undefined | Value::Null => Err(self.type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                nullish_name(base),
                key.name()
            ))),
            Value::String(s) => {
                if key.is("length") {
                    return Ok(Value::Number(s.encode_utf16().count() as f64));
                }
                if let PropertyKey::Index(i) = key {
                    if let Some(unit) = s.encode_utf16().nth(*i as usize) {
                        return Ok(Value::str(&String::from_utf16_lossy(&[unit])));
                    }
                }
                self.get_from_proto(base, key)
            }
            _ => self.get_from_proto(base, key),
        }
    }

    pub fn get_named(&mut self, base: &Value, name: &str) -> JsResult<Value> {
        self.get(base, &PropertyKey::from(name))
    }

    fn get_from_proto(&mut self, base: &Value, key: &PropertyKey) -> JsResult<Value> {
        match self.primitive_proto(base) {
            Some(proto) => self.get_property(&proto, key, base),
            None => Ok(Value::Undefined),
        }
    }

    /// Reads `key` from `obj` and its prototypes; accessors run with `receiver` as `this`.
    pub fn get_property(&mut self, obj: &ObjRef, key: &PropertyKey, receiver: &Value) -> JsResult<Value> {
        match (obj.kind(), key) {
            (ObjectKind::Array(items), PropertyKey::Index(i)) => {
                if let Some(v) = items.borrow().get(*i as usize) {
                    return Ok(v.clone());
                }
            }
            (ObjectKind::Array(items), PropertyKey::Name(n)) if &**n == "length" => {
                return Ok(Value::Number(items.borrow().len() as f64));
            }
            (ObjectKind::Host(h), PropertyKey::Index(i)) => {
                if h.length().is_some() {
                    return Ok(h.get_index(*i).unwrap_or_default());
                }
            }
            (ObjectKind::Function(FunctionKind::Script(_)), k) if k.is("prototype") => {
                return Ok(self.ensure_prototype(obj));
            }
            _ => {}
        }
        let name = key.name();
        let mut current = Some(obj.clone());
        while let Some(o) = current {
            let found = o.props().get(&*name).cloned();
            if let Some(prop) = found {
                return self.read_property(prop, receiver);
            }
            current = o.proto();
        }
        Ok(Value::Undefined)
    }

    fn read_property(&mut self, prop: Property, receiver: &Value) -> JsResult<Value> {
        match prop {
            Property::Data { value, .. } => Ok(value),
            Property::Accessor {
                getter: Some(getter),
                ..
            } => self.call(&Value::Object(getter), receiver.clone(), Args::new()),
            Property::Accessor { getter: None, .. } => Ok(Value::Undefined),
        }
    }

    /// `base[key] = value` for any value; writes to primitives are dropped.
    pub fn put(&mut self, base: &Value, key: PropertyKey, value: Value) -> JsResult<()> {
        match base {
            Value::Object(o) => self.set_property(o, key, value),
            Value::Undefined | Value::Null => Err(self.type_error(format!(
                "Cannot set properties of {} (setting '{}')",
                nullish_name(base),
                key.name()
            ))),
            _ => Ok(()),
        }
    }

    pub fn set_property(&mut self, obj: &ObjRef, key: PropertyKey, value: Value) -> JsResult<()> {
        match (obj.kind(), &key) {
            (ObjectKind::Array(items), PropertyKey::Index(i)) => {
                let i = *i as usize;
                let mut items = items.borrow_mut();
                let len = items.len();
                if i < len {
                    items[i] = value;
                    return Ok(());
                }
                if i - len <= MAX_DENSE_GAP {
                    items.resize(i, Value::Undefined);
                    items.push(value);
                    return Ok(());
                }
            }
            (ObjectKind::Array(items), k) if k.is("length") => {
                let n = self.to_number(&value)?;
                if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
                    return Err(self.range_error("Invalid array length"));
                }
                let n = n as usize;
                let mut items = items.borrow_mut();
                if n > items.len() + MAX_DENSE_GAP {
                    drop(items);
                    return Err(self.range_error("Invalid array length"));
                }
                items.resize(n, Value::Undefined);
                return Ok(());
            }
            (ObjectKind::Host(h), PropertyKey::Index(i)) if h.length().is_some() => {
                let n = self.to_number(&value)?;
                h.set_index(*i, n);
                return Ok(());
            }
            _ => {}
        }

        let name = key.name();
        let mut current = Some(obj.clone());
        while let Some(o) = current {
            let found = o.props().get(&*name).cloned();
            match found {
                Some(Property::Accessor { setter, .. }) => {
                    if let Some(setter) = setter {
                        let args: Args = smallvec::smallvec![value];
                        self.call(&Value::Object(setter), Value::Object(obj.clone()), args)?;
                    }
                    return Ok(());
                }
                Some(Property::Data {
                    writable: false, ..
                }) => return Ok(()),
                Some(Property::Data { .. }) if Rc::ptr_eq(&o, obj) => {
                    if let Some(Property::Data { value: slot, .. }) = obj.props_mut().get_mut(&*name) {
                        *slot = value;
                    }
                    return Ok(());
                }
                Some(Property::Data { .. }) => break,
                None => current = o.proto(),
            }
        }
        if let (ObjectKind::Function(FunctionKind::Script(_)), true) = (obj.kind(), key.is("prototype")) {
            obj.define(
                "prototype",
                Property::Data {
                    value,
                    writable: true,
                    enumerable: false,
                },
            );
            return Ok(());
        }
        obj.props_mut().insert(name, Property::data(value));
        Ok(())
    }

    /// `delete obj[key]`; false when the property cannot be removed.
    pub fn delete_property(&mut self, obj: &ObjRef, key: &PropertyKey) -> bool {
        match (obj.kind(), key) {
            (ObjectKind::Array(items), PropertyKey::Index(i)) => {
                let mut items = items.borrow_mut();
                let i = *i as usize;
                if i < items.len() {
                    items[i] = Value::Undefined;
                    return true;
                }
            }
            (ObjectKind::Array(_), k) if k.is("length") => return false,
            (ObjectKind::Host(h), PropertyKey::Index(i)) => {
                if h.length().is_some_and(|len| *i < len) {
                    return false;
                }
            }
            _ => {}
        }
        let name = key.name();
        let mut props = obj.props_mut();
        if let Some(Property::Data {
            writable: false,
            enumerable: false,
            ..
        }) = props.get(&*name)
        {
            return false;
        }
        props.shift_remove(&*name);
        true
    }

    pub fn has_own_property(&self, obj: &ObjRef, key: &PropertyKey) -> bool {
        match (obj.kind(), key) {
            (ObjectKind::Array(items), PropertyKey::Index(i)) => {
                if (*i as usize) < items.borrow().len() {
                    return true;
                }
            }
            (ObjectKind::Array(_), k) if k.is("length") => return true,
            (ObjectKind::Host(h), PropertyKey::Index(i)) => {
                if h.length().is_some_and(|len| *i < len) {
                    return true;
                }
            }
            (ObjectKind::Function(FunctionKind::Script(_)), k) if k.is("prototype") => return true,
            _ => {}
        }
        obj.props().contains_key(&*key.name())
    }

    /// `key in obj`.
    pub fn has_property(&self, obj: &ObjRef, key: &PropertyKey) -> bool {
        let mut current = Some(obj.clone());
        while let Some(o) = current {
            if self.has_own_property(&o, key) {
                return true;
            }
            current = o.proto();
        }
        false
    }

    /// Enumerable own keys: indices first, then named properties in insertion order.
    pub fn own_keys(&self, obj: &ObjRef) -> Vec<Rc<str>> {
        let count = match obj.kind() {
            ObjectKind::Array(items) => items.borrow().len() as u32,
            ObjectKind::Host(h) => h.length().unwrap_or(0),
            _ => 0,
        };
        let mut keys: Vec<Rc<str>> = (0..count).map(|i| PropertyKey::Index(i).name()).collect();
        keys.extend(
            obj.props()
                .iter()
                .filter(|(_, p)| p.is_enumerable())
                .map(|(k, _)| k.clone()),
        );
        keys
    }

    /// Keys visited by `for-in`: own then inherited, each name once.
    pub fn enumerate_keys(&self, obj: &ObjRef) -> Vec<Rc<str>> {
        let mut seen = fast_map_new::<Rc<str>, ()>();
        let mut out = Vec::new();
        let mut current = Some(obj.clone());
        while let Some(o) = current {
            for key in self.own_keys(&o) {
                if seen.insert(key.clone(), ()).is_none() {
                    out.push(key);
                }
            }
            for (name, _) in o.props().iter() {
                seen.entry(name.clone()).or_insert(());
            }
            current = o.proto();
        }
        out
    }

    // Conversions

    pub fn to_primitive(&mut self, v: &Value, prefer_string: bool) -> JsResult<Value> {
        let Value::Object(o) = v else {
            return Ok(v.clone());
        };
        let order = if prefer_string {
            ["toString", "valueOf"]
        } else {
            ["valueOf", "toString"]
        };
        for name in order {
            let f = self.get_property(o, &PropertyKey::from(name), v)?;
            if f.is_callable() {
                let r = self.call(&f, v.clone(), Args::new())?;
                if !matches!(r, Value::Object(_)) {
                    return Ok(r);
                }
            }
        }
        Err(self.type_error(messages::TO_PRIMITIVE))
    }

    pub fn to_number(&mut self, v: &Value) -> JsResult<f64> {
        Ok(match v {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => *b as u8 as f64,
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Object(_) => {
                let p = self.to_primitive(v, false)?;
                return self.to_number(&p);
            }
        })
    }

    pub fn to_string(&mut self, v: &Value) -> JsResult<Rc<str>> {
        if let Some(s) = primitive_to_string(v) {
            return Ok(s);
        }
        let p = self.to_primitive(v, true)?;
        self.to_string(&p)
    }

    pub fn to_int32(&mut self, v: &Value) -> JsResult<i32> {
        Ok(to_int32(self.to_number(v)?))
    }

    pub fn to_uint32(&mut self, v: &Value) -> JsResult<u32> {
        Ok(to_uint32(self.to_number(v)?))
    }

    pub fn to_property_key(&mut self, v: &Value) -> JsResult<PropertyKey> {
        Ok(match v {
            Value::Number(n) => PropertyKey::from_number(*n),
            Value::String(s) => PropertyKey::from_name(s.clone()),
            _ => PropertyKey::from_name(self.to_string(v)?),
        })
    }

    /// `a == b`.
    pub fn loose_equals(&mut self, a: &Value, b: &Value) -> JsResult<bool> {
        Ok(match (a, b) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Number(x), Value::String(s)) | (Value::String(s), Value::Number(x)) => {
                *x == string_to_number(s)
            }
            (Value::Bool(x), _) => return self.loose_equals(&Value::Number(*x as u8 as f64), b),
            (_, Value::Bool(y)) => return self.loose_equals(a, &Value::Number(*y as u8 as f64)),
            (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
            (Value::Object(_), _) => {
                let p = self.to_primitive(a, false)?;
                return self.loose_equals(&p, b);
            }
            (_, Value::Object(_)) => {
                let p = self.to_primitive(b, false)?;
                return self.loose_equals(a, &p);
            }
            _ => a.strict_equals(b),
        })
    }

    /// `v instanceof ctor`.
    pub fn instance_of(&mut self, v: &Value, ctor: &Value) -> JsResult<bool> {
        let Some(c) = ctor.as_object().filter(|c| c.is_callable()).cloned() else {
            return Err(self.type_error(messages::INSTANCEOF_NOT_CALLABLE));
        };
        let Value::Object(o) = v else {
            return Ok(false);
        };
        let Value::Object(proto) = self.get_property(&c, &PropertyKey::from("prototype"), ctor)? else {
            return Err(self.type_error(
                "Function has non-object prototype 'undefined' in instanceof check",
            ));
        };
        let mut current = o.proto();
        while let Some(p) = current {
            if Rc::ptr_eq(&p, &proto) {
                return Ok(true);
            }
            current = p.proto();
        }
        Ok(false)
    }

    /// `key in target`.
    pub fn has_in(&mut self, key: &Value, target: &Value) -> JsResult<bool> {
        let Value::Object(o) = target else {
            let k = self.to_string(key)?;
            let t = self.describe(target);
            return Err(self.type_error(format!(
                "Cannot use 'in' operator to search for '{k}' in {t}"
            )));
        };
        let key = self.to_property_key(key)?;
        Ok(self.has_property(o, &key))
    }

    /// Short rendering of a value for error messages.
    pub fn describe(&self, v: &Value) -> String {
        match v {
            Value::String(s) => s.to_string(),
            Value::Object(o) if o.is_callable() => {
                let name = match o.own_value("name") {
                    Some(Value::String(n)) => n,
                    _ => Rc::from(""),
                };
                format!("function {name}")
            }
            Value::Object(o) => format!("#<{}>", o.class_name()),
            _ => primitive_to_string(v).map(|s| s.to_string()).unwrap_or_default(),
        }
    }

    // Calls

    pub fn call(&mut self, func: &Value, this: Value, args: Args) -> JsResult<Value> {
        let Some(f) = func.as_object().filter(|f| f.is_callable()).cloned() else {
            let desc = self.describe(func);
            return Err(self.type_error(format!("{desc} {}", messages::NOT_A_FUNCTION)));
        };
        self.invoke(&f, this, args, false)
    }

    /// `new func(...args)`.
    pub fn construct(&mut self, func: &Value, args: Args) -> JsResult<Value> {
        let target = func.as_object().filter(|f| match f.as_function() {
            Some(FunctionKind::Native(n)) => n.constructor,
            Some(FunctionKind::Script(_)) => true,
            None => false,
        });
        let Some(f) = target.cloned() else {
            let desc = self.describe(func);
            return Err(self.type_error(format!("{desc} {}", messages::NOT_A_CONSTRUCTOR)));
        };
        if let Some(FunctionKind::Native(_)) = f.as_function() {
            return self.invoke(&f, Value::Undefined, args, true);
        }
        let proto = match self.ensure_prototype(&f) {
            Value::Object(p) => Some(p),
            _ => self.context().intrinsics().map(|i| i.object_proto.clone()),
        };
        let this = Value::Object(self.new_object_with_proto(proto, ObjectKind::Ordinary));
        let result = self.invoke(&f, this.clone(), args, true)?;
        Ok(if matches!(result, Value::Object(_)) {
            result
        } else {
            this
        })
    }

    fn invoke(&mut self, f: &ObjRef, this: Value, args: Args, is_construct: bool) -> JsResult<Value> {
        if self.depth >= self.config.max_call_depth {
            return Err(self.range_error(messages::STACK_OVERFLOW));
        }
        self.depth += 1;
        let result = match f.as_function() {
            Some(FunctionKind::Native(native)) => {
                let func = native.func;
                let call = CallArgs {
                    this,
                    args,
                    callee: f.clone(),
                    is_construct,
                };
                func(self, &call)
            }
            Some(FunctionKind::Script(closure)) => self.call_closure(closure, this, args),
            None => Ok(Value::Undefined),
        };
        self.depth -= 1;
        result
    }
}

fn nullish_name(v: &Value) -> &'static str {
    if matches!(v, Value::Null) { "null" } else { "undefined" }
}

/// String conversion for everything but objects.
pub fn primitive_to_string(v: &Value) -> Option<Rc<str>> {
    Some(match v {
        Value::Undefined => Rc::from("undefined"),
        Value::Null => Rc::from("null"),
        Value::Bool(true) => Rc::from("true"),
        Value::Bool(false) => Rc::from("false"),
        Value::Number(n) => Rc::from(number_to_string(*n)),
        Value::String(s) => s.clone(),
        Value::Object(_) => return None,
    })
}
