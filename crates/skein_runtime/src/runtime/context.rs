use std::cell::{Cell, OnceCell};
use std::rc::Rc;

use tracing::debug;

use crate::core::{ContextId, ObjRef, Object, ObjectKind, Scope};

/// Native error constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    TypeError,
    RangeError,
    SyntaxError,
    ReferenceError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::RangeError,
        ErrorKind::SyntaxError,
        ErrorKind::ReferenceError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::ReferenceError => "ReferenceError",
        }
    }
}

/// Prototypes every object of a context is built from.
pub struct Intrinsics {
    pub object_proto: ObjRef,
    pub function_proto: ObjRef,
    pub array_proto: ObjRef,
    pub string_proto: ObjRef,
    pub number_proto: ObjRef,
    pub boolean_proto: ObjRef,
    pub error_protos: [ObjRef; 5],
}

impl Intrinsics {
    pub fn error_proto(&self, kind: ErrorKind) -> &ObjRef {
        let idx = ErrorKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        &self.error_protos[idx]
    }

    fn all(&self) -> impl Iterator<Item = &ObjRef> {
        [
            &self.object_proto,
            &self.function_proto,
            &self.array_proto,
            &self.string_proto,
            &self.number_proto,
            &self.boolean_proto,
        ]
        .into_iter()
        .chain(self.error_protos.iter())
    }
}

struct ContextData {
    id: ContextId,
    global: ObjRef,
    script_scope: Rc<Scope>,
    intrinsics: OnceCell<Intrinsics>,
    disposed: Cell<bool>,
}

/// An isolated global scope. Cloning shares the same context.
#[derive(Clone)]
pub struct Context(Rc<ContextData>);

impl Context {
    pub(crate) fn new(id: ContextId) -> Self {
        // The global's prototype is linked to Object.prototype once builtins exist.
        let global = Object::new(id, None, ObjectKind::Ordinary);
        debug!(context = id.0, "context created");
        Context(Rc::new(ContextData {
            id,
            global,
            script_scope: Scope::new(None),
            intrinsics: OnceCell::new(),
            disposed: Cell::new(false),
        }))
    }

    pub fn id(&self) -> ContextId {
        self.0.id
    }

    pub fn global(&self) -> ObjRef {
        self.0.global.clone()
    }

    /// Scope holding top-level `let` and `const` bindings.
    pub fn script_scope(&self) -> Rc<Scope> {
        self.0.script_scope.clone()
    }

    pub(crate) fn set_intrinsics(&self, intrinsics: Intrinsics) {
        let _ = self.0.intrinsics.set(intrinsics);
    }

    /// Builtin prototypes; only absent while the context is being built.
    pub fn intrinsics(&self) -> Option<&Intrinsics> {
        self.0.intrinsics.get()
    }

    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_disposed(&self) -> bool {
        self.0.disposed.get()
    }

    pub(crate) fn teardown(&self) {
        if self.0.disposed.replace(true) {
            return;
        }
        self.0.global.clear();
        self.0.script_scope.clear();
        if let Some(intrinsics) = self.0.intrinsics.get() {
            for proto in intrinsics.all() {
                proto.clear();
            }
        }
        debug!(context = self.0.id.0, "context disposed");
    }
}
