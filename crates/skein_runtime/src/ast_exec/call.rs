use std::rc::Rc;

use skein_ir::{Expr, ExprKind};
use skein_syntax::{SourceFile, Span};

use crate::core::{Closure, PropertyKey, Value};
use crate::errors::messages;
use crate::runtime::{Args, CallFrame, Flow, JsResult, Runtime};

impl Runtime {
    pub(crate) fn call_closure(&mut self, closure: &Closure, this: Value, args: Args) -> JsResult<Value> {
        let node = closure.node.clone();
        let scope = self.new_scope(Some(closure.scope.clone()));
        for (i, param) in node.params.iter().enumerate() {
            scope.declare(param.clone(), args.get(i).cloned().unwrap_or_default(), true);
        }
        self.hoist(&node.scope, &scope, &closure.source, &closure.global);

        let this = if this.is_nullish() {
            Value::Object(closure.global.clone())
        } else {
            this
        };
        let call_site = self.pos;
        self.frames.push(CallFrame {
            name: node.name.clone().unwrap_or_else(|| Rc::from("<anonymous>")),
            source: closure.source.clone(),
            call_site,
            this,
            global: closure.global.clone(),
        });
        let saved_scope = self.scope.replace(scope);
        let saved_completion = std::mem::take(&mut self.completion);

        let flow = self.exec_stmts(&node.body, &closure.source);

        self.completion = saved_completion;
        self.scope = saved_scope;
        self.frames.pop();
        self.pos = call_site;
        match flow {
            Flow::Return(v) => Ok(v),
            Flow::Throw(ex) => Err(ex),
            _ => Ok(Value::Undefined),
        }
    }

    pub(crate) fn eval_args(&mut self, args: &[Expr], src: &Rc<SourceFile>) -> JsResult<Args> {
        let mut out = Args::with_capacity(args.len());
        for a in args {
            out.push(self.eval_expr(a, src)?);
        }
        Ok(out)
    }

    /// `callee(args)`; member callees pass their base as `this`.
    pub(crate) fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
        src: &Rc<SourceFile>,
    ) -> JsResult<Value> {
        let (func, this) = match &callee.kind {
            ExprKind::Member { object, property } => {
                let base = self.eval_expr(object, src)?;
                self.pos = callee.span;
                let f = self
                    .get(&base, &PropertyKey::from_name(property.clone()))
                    .map_err(|e| e.at(src, callee.span))?;
                (f, base)
            }
            ExprKind::Index { object, index } => {
                let base = self.eval_expr(object, src)?;
                let key = self.eval_expr(index, src)?;
                let key = self.to_property_key(&key)?;
                self.pos = callee.span;
                let f = self.get(&base, &key).map_err(|e| e.at(src, callee.span))?;
                (f, base)
            }
            _ => (self.eval_expr(callee, src)?, Value::Undefined),
        };
        let args = self.eval_args(args, src)?;
        self.pos = span;
        if !func.is_callable() {
            let text = src.text.slice(callee.span);
            return Err(self.type_error(format!("{text} {}", messages::NOT_A_FUNCTION)));
        }
        self.call(&func, this, args)
    }

    pub(crate) fn eval_new(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
        src: &Rc<SourceFile>,
    ) -> JsResult<Value> {
        let func = self.eval_expr(callee, src)?;
        let args = self.eval_args(args, src)?;
        self.pos = span;
        if !func.is_callable() {
            let text = src.text.slice(callee.span);
            return Err(self.type_error(format!("{text} {}", messages::NOT_A_CONSTRUCTOR)));
        }
        self.construct(&func, args)
    }
}
