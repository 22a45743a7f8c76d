//! The script runtime.
//!
//! A `Runtime` is one independent heap: it compiles source into `Script`s and runs them in
//! `Context`s. Several contexts can live in one runtime; each has its own global object and
//! builtins, while objects may still flow between them.

mod config;
mod context;
mod ops;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use skein_ir::Program;
use skein_parser::parse_source;
use skein_syntax::{SourceFile, SourceId, Span};
use smallvec::SmallVec;
use tracing::trace;

use crate::builtins_registry::{BuiltinProvider, BuiltinRegistry};
use crate::core::{Heap, ObjRef, Scope, Value};

pub use config::RuntimeConfig;
pub use ops::{Args, primitive_to_string};
pub use context::{Context, ErrorKind, Intrinsics};

/// A thrown value plus where it was raised.
#[derive(Clone, Debug)]
pub struct Exception {
    pub value: Value,
    pub location: Option<(Rc<SourceFile>, Span)>,
}

impl Exception {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            location: None,
        }
    }

    /// Records a location unless one is already set.
    pub fn at(mut self, source: &Rc<SourceFile>, span: Span) -> Self {
        if self.location.is_none() {
            self.location = Some((source.clone(), span));
        }
        self
    }
}

pub type JsResult<T> = Result<T, Exception>;

/// Source that failed to parse.
#[derive(Clone, Debug)]
pub struct CompileError {
    pub message: String,
    pub source: Rc<SourceFile>,
    pub span: Option<Span>,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError: {}", self.message)
    }
}

/// A compiled unit, runnable in any context of the runtime that compiled it.
#[derive(Clone)]
pub struct Script {
    pub(crate) program: Rc<Program>,
    pub(crate) source: Rc<SourceFile>,
}

impl Script {
    pub fn source(&self) -> &Rc<SourceFile> {
        &self.source
    }
}

/// Control flow result from statement execution.
pub enum Flow {
    None,
    Return(Value),
    Break,
    Continue,
    Throw(Exception),
}

/// Arguments handed to a native function.
pub struct CallArgs {
    pub this: Value,
    pub args: SmallVec<[Value; 4]>,
    pub callee: ObjRef,
    pub is_construct: bool,
}

impl CallArgs {
    /// Argument `i`, or `undefined` when absent.
    pub fn get(&self, i: usize) -> Value {
        self.args.get(i).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Whether argument `i` was passed and is not `undefined`.
    pub fn has(&self, i: usize) -> bool {
        self.args.get(i).is_some_and(|v| !v.is_undefined())
    }
}

pub(crate) struct CallFrame {
    /// Empty for top-level code.
    pub(crate) name: Rc<str>,
    pub(crate) source: Rc<SourceFile>,
    /// Where this frame was called from, in the caller's source.
    pub(crate) call_site: Span,
    pub(crate) this: Value,
    pub(crate) global: ObjRef,
}

pub struct Runtime {
    pub(crate) config: RuntimeConfig,
    entered: Vec<Context>,
    home: Option<Context>,
    next_context_id: u32,
    next_source_id: u32,
    pub(crate) frames: Vec<CallFrame>,
    /// Native and script calls currently active.
    pub(crate) depth: usize,
    pub(crate) scope: Option<Rc<Scope>>,
    /// Most recent call or construction site in the innermost frame's source.
    pub(crate) pos: Span,
    pub(crate) completion: Value,
    pub(crate) heap: Heap,
    embedder: Option<Rc<dyn Any>>,
    idle_hooks: Vec<Box<dyn FnMut()>>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            config,
            entered: Vec::new(),
            home: None,
            next_context_id: 0,
            next_source_id: 0,
            frames: Vec::new(),
            depth: 0,
            scope: None,
            pos: Span::default(),
            completion: Value::Undefined,
            heap: Heap::new(),
            embedder: None,
            idle_hooks: Vec::new(),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Attaches embedder state, retrievable from native functions.
    pub fn set_embedder_data(&mut self, data: Rc<dyn Any>) {
        self.embedder = Some(data);
    }

    pub fn embedder_data<T: 'static>(&self) -> Option<Rc<T>> {
        self.embedder.clone()?.downcast::<T>().ok()
    }

    /// Registers work to do when the embedder signals idleness.
    pub fn on_idle(&mut self, hook: Box<dyn FnMut()>) {
        self.idle_hooks.push(hook);
    }

    /// Breaks unreachable reference cycles. Does nothing while script code is running.
    pub fn collect_garbage(&mut self) -> usize {
        if self.depth > 0 || !self.frames.is_empty() {
            return 0;
        }
        self.heap.collect()
    }

    /// Objects and scopes allocated by this runtime that are still alive.
    pub fn heap_live_count(&self) -> usize {
        self.heap.live_count()
    }

    /// Idle hint: collect cycles, then release spare capacity held by the runtime and its
    /// embedder.
    pub fn idle_notification(&mut self) {
        self.collect_garbage();
        self.frames.shrink_to_fit();
        self.entered.shrink_to_fit();
        for hook in &mut self.idle_hooks {
            hook();
        }
        trace!("idle notification handled");
    }

    /// Creates a context with the standard builtins plus whatever `providers` install.
    pub fn create_context(&mut self, providers: &[&dyn BuiltinProvider]) -> Context {
        let id = self.next_context_id;
        self.next_context_id += 1;
        let ctx = Context::new(crate::core::ContextId(id));
        self.heap.track_object(&ctx.global());
        self.heap.track_scope(&ctx.script_scope());
        if self.home.is_none() {
            self.home = Some(ctx.clone());
        }
        self.enter_context(&ctx);
        crate::builtins::install(self, &ctx);
        let mut registry = BuiltinRegistry::new();
        for provider in providers {
            provider.install(&mut registry);
        }
        registry.install_into(self, &ctx.global());
        self.exit_context();
        ctx
    }

    /// Tears a context down; its global and builtins lose every property so cycles through
    /// them are broken.
    pub fn dispose_context(&mut self, ctx: &Context) {
        if self.home.as_ref().is_some_and(|h| h.ptr_eq(ctx)) {
            self.home = None;
        }
        ctx.teardown();
    }

    pub fn enter_context(&mut self, ctx: &Context) {
        self.entered.push(ctx.clone());
    }

    pub fn exit_context(&mut self) {
        self.entered.pop();
    }

    /// The innermost entered context.
    pub fn current_context(&self) -> Option<&Context> {
        self.entered.last()
    }

    /// Context for object creation: the entered one, else the first one created.
    pub fn context(&mut self) -> Context {
        if let Some(c) = self.entered.last().or(self.home.as_ref()) {
            return c.clone();
        }
        self.create_context(&[])
    }

    pub fn new_source(&mut self, name: &str, text: &str) -> Rc<SourceFile> {
        let id = SourceId(self.next_source_id);
        self.next_source_id += 1;
        Rc::new(SourceFile::new(id, name, text.to_string()))
    }

    pub fn compile(&mut self, text: &str, name: &str) -> Result<Script, CompileError> {
        let source = self.new_source(name, text);
        let parsed = parse_source(source.text.as_str());
        if let Some(d) = parsed.diagnostics.first() {
            trace!(name, message = %d.message, "compile failed");
            return Err(CompileError {
                message: d.message.clone(),
                source,
                span: d.span,
            });
        }
        trace!(name, "compiled");
        Ok(Script {
            program: Rc::new(parsed.program),
            source,
        })
    }

    /// Runs a script in the current context and returns its completion value.
    pub fn run(&mut self, script: &Script) -> JsResult<Value> {
        let ctx = self.context();
        let saved_scope = self.scope.replace(ctx.script_scope());
        let saved_completion = std::mem::take(&mut self.completion);
        let saved_pos = self.pos;
        self.frames.push(CallFrame {
            name: Rc::from(""),
            source: script.source.clone(),
            call_site: self.pos,
            this: Value::Object(ctx.global()),
            global: ctx.global(),
        });
        trace!(name = %script.source.name, "run");

        let result = self.run_program(&script.program, &script.source, &ctx);

        self.frames.pop();
        self.pos = saved_pos;
        self.scope = saved_scope;
        let completion = std::mem::replace(&mut self.completion, saved_completion);
        result.map(|()| completion)
    }

    /// Enters `ctx`, runs, exits.
    pub fn run_in(&mut self, ctx: &Context, script: &Script) -> JsResult<Value> {
        self.enter_context(ctx);
        let result = self.run(script);
        self.exit_context();
        result
    }

    /// The `stack` string of a thrown error object, if it has one.
    pub fn exception_trace(&self, ex: &Exception) -> Option<String> {
        let obj = ex.value.as_object()?;
        match obj.own_value("stack") {
            Some(Value::String(s)) => Some(s.to_string()),
            _ => None,
        }
    }
}

impl Drop for Runtime {
    /// Every object this runtime allocated loses its references, so cycles among them and
    /// the host data they carry are freed with the runtime.
    fn drop(&mut self) {
        self.entered.clear();
        self.home = None;
        self.scope = None;
        self.frames.clear();
        self.completion = Value::Undefined;
        self.heap.teardown();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
