use crate::core::{NativeFn, ObjRef, Property, Value};
use crate::runtime::Runtime;

enum Builtin {
    Function {
        name: String,
        func: NativeFn,
        arity: u32,
    },
    Accessor {
        name: String,
        getter: Option<NativeFn>,
        setter: Option<NativeFn>,
    },
    Value {
        name: String,
        value: Value,
    },
    Namespace {
        name: String,
        members: BuiltinRegistry,
    },
    Class(ClassSpec),
}

/// Collects global bindings before they are materialized in a context.
pub struct BuiltinRegistry {
    entries: Vec<Builtin>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str, func: NativeFn, arity: u32) {
        self.entries.push(Builtin::Function {
            name: name.to_string(),
            func,
            arity,
        });
    }

    pub fn register_accessor(&mut self, name: &str, getter: Option<NativeFn>, setter: Option<NativeFn>) {
        self.entries.push(Builtin::Accessor {
            name: name.to_string(),
            getter,
            setter,
        });
    }

    pub fn register_value(&mut self, name: &str, value: Value) {
        self.entries.push(Builtin::Value {
            name: name.to_string(),
            value,
        });
    }

    /// A plain object holding `members`, like `Math`.
    pub fn register_namespace(&mut self, name: &str, members: BuiltinRegistry) {
        self.entries.push(Builtin::Namespace {
            name: name.to_string(),
            members,
        });
    }

    pub fn register_class(&mut self, class: ClassSpec) {
        self.entries.push(Builtin::Class(class));
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| match e {
                Builtin::Function { name, .. }
                | Builtin::Accessor { name, .. }
                | Builtin::Value { name, .. }
                | Builtin::Namespace { name, .. } => name.clone(),
                Builtin::Class(c) => c.name.clone(),
            })
            .collect()
    }

    /// Defines every entry on `target`, skipped by enumeration.
    pub fn install_into(self, rt: &mut Runtime, target: &ObjRef) {
        for entry in self.entries {
            match entry {
                Builtin::Function { name, func, arity } => rt.define_method(target, &name, func, arity),
                Builtin::Accessor {
                    name,
                    getter,
                    setter,
                } => rt.define_accessor(target, &name, getter, setter),
                Builtin::Value { name, value } => target.define(&name, Property::hidden(value)),
                Builtin::Namespace { name, members } => {
                    let ns = rt.new_object();
                    members.install_into(rt, &ns);
                    target.define(&name, Property::hidden(Value::Object(ns)));
                }
                Builtin::Class(class) => {
                    let name = class.name.clone();
                    let ctor = class.build(rt);
                    target.define(&name, Property::hidden(Value::Object(ctor)));
                }
            }
        }
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A native constructor with its prototype methods and static members.
pub struct ClassSpec {
    name: String,
    ctor: NativeFn,
    arity: u32,
    methods: BuiltinRegistry,
    statics: BuiltinRegistry,
}

impl ClassSpec {
    pub fn new(name: &str, ctor: NativeFn, arity: u32) -> Self {
        Self {
            name: name.to_string(),
            ctor,
            arity,
            methods: BuiltinRegistry::new(),
            statics: BuiltinRegistry::new(),
        }
    }

    pub fn method(mut self, name: &str, func: NativeFn, arity: u32) -> Self {
        self.methods.register(name, func, arity);
        self
    }

    pub fn constant(mut self, name: &str, value: Value) -> Self {
        self.statics.register_value(name, value.clone());
        self.methods.register_value(name, value);
        self
    }

    pub fn static_fn(mut self, name: &str, func: NativeFn, arity: u32) -> Self {
        self.statics.register(name, func, arity);
        self
    }

    fn build(self, rt: &mut Runtime) -> ObjRef {
        let proto = rt.new_object();
        self.methods.install_into(rt, &proto);
        let ctor = rt.new_constructor(&self.name, self.ctor, self.arity, &proto);
        self.statics.install_into(rt, &ctor);
        ctor
    }
}

/// Something that contributes globals to every context it is handed to.
pub trait BuiltinProvider {
    fn install(&self, registry: &mut BuiltinRegistry);
}

/// Global functions and namespaces of the standard library.
pub struct StdBuiltinProvider;

impl BuiltinProvider for StdBuiltinProvider {
    fn install(&self, registry: &mut BuiltinRegistry) {
        use crate::builtins::{global, math};

        registry.register("parseInt", global::parse_int, 2);
        registry.register("parseFloat", global::parse_float, 1);
        registry.register("isNaN", global::is_nan, 1);
        registry.register("isFinite", global::is_finite, 1);
        registry.register_value("NaN", Value::Number(f64::NAN));
        registry.register_value("Infinity", Value::Number(f64::INFINITY));
        registry.register_value("undefined", Value::Undefined);

        let mut m = BuiltinRegistry::new();
        m.register("floor", math::floor, 1);
        m.register("ceil", math::ceil, 1);
        m.register("round", math::round, 1);
        m.register("abs", math::abs, 1);
        m.register("min", math::min, 2);
        m.register("max", math::max, 2);
        m.register("sqrt", math::sqrt, 1);
        m.register("pow", math::pow, 2);
        m.register_value("PI", Value::Number(std::f64::consts::PI));
        m.register_value("E", Value::Number(std::f64::consts::E));
        registry.register_namespace("Math", m);
    }
}
