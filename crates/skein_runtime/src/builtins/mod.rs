//! Standard builtins installed into every context.

pub(super) mod array;
pub(super) mod error;
pub(super) mod function;
pub(crate) mod global;
pub(crate) mod math;
pub(super) mod object;
pub(super) mod number;
pub(super) mod string;

use crate::builtins_registry::{BuiltinProvider, BuiltinRegistry, StdBuiltinProvider};
use crate::core::{ContextId, ObjRef, Object, ObjectKind, Property, Value};
use crate::runtime::{Context, ErrorKind, Intrinsics, Runtime};

fn plain(rt: &mut Runtime, id: ContextId, proto: Option<&ObjRef>) -> ObjRef {
    rt.alloc(Object::new(id, proto.cloned(), ObjectKind::Ordinary))
}

/// Builds the intrinsic prototypes of `ctx`, then its global bindings.
pub(crate) fn install(rt: &mut Runtime, ctx: &Context) {
    let id = ctx.id();
    let object_proto = plain(rt, id, None);
    let error_proto = plain(rt, id, Some(&object_proto));
    let error_protos = ErrorKind::ALL.map(|kind| match kind {
        ErrorKind::Error => error_proto.clone(),
        _ => plain(rt, id, Some(&error_proto)),
    });
    ctx.set_intrinsics(Intrinsics {
        function_proto: plain(rt, id, Some(&object_proto)),
        array_proto: plain(rt, id, Some(&object_proto)),
        string_proto: plain(rt, id, Some(&object_proto)),
        number_proto: plain(rt, id, Some(&object_proto)),
        boolean_proto: plain(rt, id, Some(&object_proto)),
        object_proto,
        error_protos,
    });
    let global = ctx.global();
    let Some(intrinsics) = ctx.intrinsics() else {
        return;
    };
    global.set_proto(Some(intrinsics.object_proto.clone()));
    global.define("globalThis", Property::hidden(Value::Object(global.clone())));

    object::install(rt, &global, intrinsics);
    function::install(rt, &global, intrinsics);
    array::install(rt, &global, intrinsics);
    string::install(rt, &global, intrinsics);
    number::install(rt, &global, intrinsics);
    error::install(rt, &global, intrinsics);

    let mut registry = BuiltinRegistry::new();
    StdBuiltinProvider.install(&mut registry);
    registry.install_into(rt, &global);
}

