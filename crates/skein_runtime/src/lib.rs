//! Skein script runtime.

#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::new_without_default)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::len_zero)]
#![allow(clippy::unnecessary_cast)]

pub mod core;
pub mod errors;
mod ast_exec;

mod runtime;
mod builtins;
pub mod builtins_registry;
mod inspect;

// Re-exports from core/
pub use core::number;
pub use core::value::Value;
pub use core::env::Scope;
pub use core::{
    ContextId, FunctionKind, HostObject, NativeFn, ObjRef, Object, ObjectKind, Property,
    PropertyKey,
};

pub use builtins_registry::{BuiltinProvider, BuiltinRegistry, ClassSpec, StdBuiltinProvider};
pub use inspect::inspect;

// Runtime structs and enums
pub use runtime::Args;
pub use runtime::CallArgs;
pub use runtime::CompileError;
pub use runtime::Context;
pub use runtime::ErrorKind;
pub use runtime::Exception;
pub use runtime::Flow;
pub use runtime::Intrinsics;
pub use runtime::JsResult;
pub use runtime::Runtime;
pub use runtime::RuntimeConfig;
pub use runtime::Script;
pub use runtime::primitive_to_string;
