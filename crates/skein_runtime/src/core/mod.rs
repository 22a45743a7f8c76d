//! Core value model: values, objects, scopes, the heap registry and number conversions.

pub mod env;
pub mod heap;
pub mod number;
pub mod object;
pub mod value;

pub use env::{AssignOutcome, Scope};
pub use heap::{Edge, Heap};
pub use object::{
    Closure, ContextId, FunctionKind, HostObject, NativeFn, NativeFunction, ObjRef, Object,
    ObjectKind, Property, PropertyKey, PropertyMap,
};
pub use value::Value;

pub type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

#[inline]
pub fn fast_map_new<K, V>() -> FastHashMap<K, V> {
    FastHashMap::with_hasher(ahash::RandomState::new())
}
