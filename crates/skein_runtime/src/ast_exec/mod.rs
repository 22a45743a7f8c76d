//! AST-based executor.
//!
//! Statements produce a `Flow`; expressions produce `JsResult<Value>`. Every failing
//! expression stamps its span onto the exception on the way out, so the innermost one wins.

mod access;
mod call;
mod expr;
mod stmt;

use std::rc::Rc;

use skein_ir::{FunctionNode, Program, ScopeInfo, Stmt, VarKind};
use skein_syntax::SourceFile;

use crate::core::{Closure, FunctionKind, ObjRef, ObjectKind, Property, PropertyKey, Scope, Value};
use crate::runtime::{Context, ErrorKind, Flow, JsResult, Runtime};

impl Runtime {
    pub(crate) fn run_program(
        &mut self,
        program: &Program,
        source: &Rc<SourceFile>,
        ctx: &Context,
    ) -> JsResult<()> {
        let global = ctx.global();
        let script_scope = ctx.script_scope();

        for name in top_level_lexical(&program.body) {
            if script_scope.has_own(name) {
                let ex = self.error(
                    ErrorKind::SyntaxError,
                    format!("Identifier '{name}' has already been declared"),
                );
                return Err(ex);
            }
        }
        for name in program.scope.vars.iter() {
            if !global.props().contains_key(&**name) {
                global.define(name, Property::data(Value::Undefined));
            }
        }
        for func in program.scope.functions.iter() {
            let closure = self.new_closure(func.clone(), &script_scope, source, &global);
            if let Some(name) = &func.name {
                self.set_property(&global, PropertyKey::from_name(name.clone()), Value::Object(closure))?;
            }
        }

        match self.exec_stmts(&program.body, source) {
            Flow::Throw(ex) => Err(ex),
            _ => Ok(()),
        }
    }

    /// A function object closing over `scope`.
    pub(crate) fn new_closure(
        &mut self,
        node: Rc<FunctionNode>,
        scope: &Rc<Scope>,
        source: &Rc<SourceFile>,
        global: &ObjRef,
    ) -> ObjRef {
        let name: Rc<str> = node.name.clone().unwrap_or_else(|| Rc::from(""));
        let length = node.params.len() as f64;
        let proto = self.context().intrinsics().map(|i| i.function_proto.clone());
        let func = self.new_object_with_proto(
            proto,
            ObjectKind::Function(FunctionKind::Script(Closure {
                node,
                scope: scope.clone(),
                source: source.clone(),
                global: global.clone(),
            })),
        );
        func.define("length", Property::fixed(Value::Number(length)));
        func.define("name", Property::fixed(Value::String(name)));
        func
    }

    /// Declares hoisted `var`s and functions of a function body into `scope`.
    pub(crate) fn hoist(
        &mut self,
        info: &ScopeInfo,
        scope: &Rc<Scope>,
        source: &Rc<SourceFile>,
        global: &ObjRef,
    ) {
        for name in info.vars.iter() {
            scope.declare_var(name);
        }
        for func in info.functions.iter() {
            let closure = self.new_closure(func.clone(), scope, source, global);
            if let Some(name) = &func.name {
                scope.declare(name.clone(), Value::Object(closure), true);
            }
        }
    }

    /// Global object free names resolve against in the running code.
    pub(crate) fn current_global(&mut self) -> ObjRef {
        match self.frames.last() {
            Some(frame) => frame.global.clone(),
            None => self.context().global(),
        }
    }
}

/// Names declared by `let`/`const` directly in `body`.
fn top_level_lexical(body: &[Stmt]) -> impl Iterator<Item = &Rc<str>> {
    body.iter()
        .filter_map(|s| match s {
            Stmt::Var(decl) if decl.kind != VarKind::Var => Some(decl.decls.iter().map(|d| &d.name)),
            _ => None,
        })
        .flatten()
}

/// Whether a block needs its own scope.
pub(crate) fn declares_lexical(body: &[Stmt]) -> bool {
    top_level_lexical(body).next().is_some()
}
