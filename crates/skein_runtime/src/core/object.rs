//! Objects and their property storage.
//!
//! Every object remembers the context it was created in. Properties keep insertion order.
//! Host objects carry embedder data behind the `HostObject` trait; that data is dropped
//! exactly once, when the last reference to the object goes away.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use ahash::RandomState;
use indexmap::IndexMap;
use skein_ir::FunctionNode;
use skein_syntax::SourceFile;

use super::env::Scope;
use super::heap::Edge;
use super::value::Value;
use crate::runtime::{CallArgs, JsResult, Runtime};

pub type ObjRef = Rc<Object>;
pub type PropertyMap = IndexMap<Rc<str>, Property, RandomState>;
pub type NativeFn = fn(&mut Runtime, &CallArgs) -> JsResult<Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(pub u32);

#[derive(Clone)]
pub enum Property {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
    },
    Accessor {
        getter: Option<ObjRef>,
        setter: Option<ObjRef>,
    },
}

impl Property {
    pub fn data(value: Value) -> Self {
        Property::Data {
            value,
            writable: true,
            enumerable: true,
        }
    }

    pub fn readonly(value: Value) -> Self {
        Property::Data {
            value,
            writable: false,
            enumerable: true,
        }
    }

    /// Neither writable nor enumerable.
    pub fn fixed(value: Value) -> Self {
        Property::Data {
            value,
            writable: false,
            enumerable: false,
        }
    }

    /// Writable but skipped by enumeration; used for builtin methods.
    pub fn hidden(value: Value) -> Self {
        Property::Data {
            value,
            writable: true,
            enumerable: false,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            Property::Data { enumerable, .. } => *enumerable,
            Property::Accessor { .. } => false,
        }
    }
}

/// Property name, with array indices split out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyKey {
    Index(u32),
    Name(Rc<str>),
}

impl PropertyKey {
    pub fn from_name(name: Rc<str>) -> Self {
        match parse_index(&name) {
            Some(i) => PropertyKey::Index(i),
            None => PropertyKey::Name(name),
        }
    }

    pub fn from_number(n: f64) -> Self {
        if n >= 0.0 && n < u32::MAX as f64 && n.fract() == 0.0 {
            return PropertyKey::Index(n as u32);
        }
        PropertyKey::Name(Rc::from(super::number::number_to_string(n)))
    }

    pub fn name(&self) -> Rc<str> {
        match self {
            PropertyKey::Index(i) => {
                let mut buf = itoa::Buffer::new();
                Rc::from(buf.format(*i))
            }
            PropertyKey::Name(n) => n.clone(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        matches!(self, PropertyKey::Name(n) if &**n == name)
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::from_name(Rc::from(s))
    }
}

/// Canonical array index: no sign, no leading zeros, below 2^32 - 1.
fn parse_index(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    let n: u64 = s.parse().ok()?;
    (n < u32::MAX as u64).then_some(n as u32)
}

pub struct NativeFunction {
    pub name: Rc<str>,
    pub func: NativeFn,
    pub arity: u32,
    /// Whether `new` is allowed.
    pub constructor: bool,
}

pub struct Closure {
    pub node: Rc<FunctionNode>,
    pub scope: Rc<Scope>,
    pub source: Rc<SourceFile>,
    /// Global object of the defining context; free names resolve against it.
    pub global: ObjRef,
}

pub enum FunctionKind {
    Script(Closure),
    Native(NativeFunction),
}

/// Embedder data attached to an object.
pub trait HostObject: Any {
    fn class_name(&self) -> &'static str;

    /// Number of indexed elements, for objects that expose any.
    fn length(&self) -> Option<u32> {
        None
    }

    fn get_index(&self, _index: u32) -> Option<Value> {
        None
    }

    /// Stores a numeric element; returns false when the index is not handled.
    fn set_index(&self, _index: u32, _value: f64) -> bool {
        false
    }

    /// Reports every object this host data keeps alive.
    fn trace(&self, _visit: &mut dyn FnMut(&ObjRef)) {}

    fn as_any(&self) -> &dyn Any;
}

pub enum ObjectKind {
    Ordinary,
    Array(RefCell<Vec<Value>>),
    Function(FunctionKind),
    Error,
    Host(Box<dyn HostObject>),
}

pub struct Object {
    context: ContextId,
    proto: RefCell<Option<ObjRef>>,
    props: RefCell<PropertyMap>,
    kind: ObjectKind,
}

impl Object {
    pub fn new(context: ContextId, proto: Option<ObjRef>, kind: ObjectKind) -> ObjRef {
        Rc::new(Object {
            context,
            proto: RefCell::new(proto),
            props: RefCell::new(PropertyMap::default()),
            kind,
        })
    }

    #[inline]
    pub fn context(&self) -> ContextId {
        self.context
    }

    #[inline]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn proto(&self) -> Option<ObjRef> {
        self.proto.borrow().clone()
    }

    pub fn set_proto(&self, proto: Option<ObjRef>) {
        *self.proto.borrow_mut() = proto;
    }

    pub fn props(&self) -> Ref<'_, PropertyMap> {
        self.props.borrow()
    }

    pub fn props_mut(&self) -> RefMut<'_, PropertyMap> {
        self.props.borrow_mut()
    }

    pub fn own(&self, name: &str) -> Option<Property> {
        self.props.borrow().get(name).cloned()
    }

    /// Own data property value, without running accessors.
    pub fn own_value(&self, name: &str) -> Option<Value> {
        match self.props.borrow().get(name) {
            Some(Property::Data { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn define(&self, name: &str, prop: Property) {
        self.props.borrow_mut().insert(Rc::from(name), prop);
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array(_))
    }

    pub fn as_array(&self) -> Option<&RefCell<Vec<Value>>> {
        match &self.kind {
            ObjectKind::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionKind> {
        match &self.kind {
            ObjectKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&dyn HostObject> {
        match &self.kind {
            ObjectKind::Host(h) => Some(h.as_ref()),
            _ => None,
        }
    }

    /// Downcasts host data to a concrete embedder type.
    pub fn host<T: 'static>(&self) -> Option<&T> {
        self.as_host()?.as_any().downcast_ref::<T>()
    }

    pub fn class_name(&self) -> &'static str {
        match &self.kind {
            ObjectKind::Ordinary => "Object",
            ObjectKind::Array(_) => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::Error => "Error",
            ObjectKind::Host(h) => h.class_name(),
        }
    }

    /// Drops every property, element and the prototype link.
    pub fn clear(&self) {
        let props = std::mem::take(&mut *self.props.borrow_mut());
        let proto = self.proto.borrow_mut().take();
        let items = self.as_array().map(|a| std::mem::take(&mut *a.borrow_mut()));
        drop((props, proto, items));
    }

    /// Reports every object and scope this object references.
    pub fn trace(&self, visit: &mut dyn FnMut(Edge<'_>)) {
        if let Some(proto) = self.proto.borrow().as_ref() {
            visit(Edge::Object(proto));
        }
        for prop in self.props.borrow().values() {
            match prop {
                Property::Data { value, .. } => {
                    if let Value::Object(o) = value {
                        visit(Edge::Object(o));
                    }
                }
                Property::Accessor { getter, setter } => {
                    for f in [getter, setter].into_iter().flatten() {
                        visit(Edge::Object(f));
                    }
                }
            }
        }
        match &self.kind {
            ObjectKind::Array(items) => {
                for item in items.borrow().iter() {
                    if let Value::Object(o) = item {
                        visit(Edge::Object(o));
                    }
                }
            }
            ObjectKind::Function(FunctionKind::Script(closure)) => {
                visit(Edge::Scope(&closure.scope));
                visit(Edge::Object(&closure.global));
            }
            ObjectKind::Host(host) => host.trace(&mut |o: &ObjRef| visit(Edge::Object(o))),
            _ => {}
        }
    }

    pub fn ptr_eq(a: &ObjRef, b: &ObjRef) -> bool {
        Rc::ptr_eq(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_keys_are_canonical() {
        assert_eq!(PropertyKey::from("0"), PropertyKey::Index(0));
        assert_eq!(PropertyKey::from("42"), PropertyKey::Index(42));
        assert!(matches!(PropertyKey::from("01"), PropertyKey::Name(_)));
        assert!(matches!(PropertyKey::from("-1"), PropertyKey::Name(_)));
        assert!(matches!(PropertyKey::from("4294967295"), PropertyKey::Name(_)));
        assert_eq!(PropertyKey::from_number(3.0), PropertyKey::Index(3));
        assert!(PropertyKey::from_number(1.5).is("1.5"));
    }
}
