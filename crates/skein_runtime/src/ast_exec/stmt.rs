use std::rc::Rc;

use skein_ir::{ForInStmt, ForInit, ForStmt, Stmt, TryStmt, VarDecl, VarKind, WhileStmt};
use skein_syntax::SourceFile;

use super::declares_lexical;
use crate::core::{PropertyKey, Scope, Value};
use crate::runtime::{Exception, Flow, Runtime};

impl Runtime {
    pub(crate) fn exec_stmts(&mut self, stmts: &[Stmt], src: &Rc<SourceFile>) -> Flow {
        for stmt in stmts {
            match self.exec_stmt(stmt, src) {
                Flow::None => {}
                other => return other,
            }
        }
        Flow::None
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt, src: &Rc<SourceFile>) -> Flow {
        match stmt {
            Stmt::Expr(e) => match self.eval_expr(e, src) {
                Ok(v) => {
                    self.completion = v;
                    Flow::None
                }
                Err(ex) => Flow::Throw(ex),
            },
            Stmt::Var(decl) => self.exec_var_decl(decl, src),
            Stmt::Function(_) | Stmt::Empty | Stmt::Error(_) => Flow::None,
            Stmt::Return(value, _) => match value {
                Some(e) => match self.eval_expr(e, src) {
                    Ok(v) => Flow::Return(v),
                    Err(ex) => Flow::Throw(ex),
                },
                None => Flow::Return(Value::Undefined),
            },
            Stmt::If(s) => match self.eval_expr(&s.cond, src) {
                Ok(c) if c.truthy() => self.exec_stmt(&s.then_branch, src),
                Ok(_) => match &s.else_branch {
                    Some(e) => self.exec_stmt(e, src),
                    None => Flow::None,
                },
                Err(ex) => Flow::Throw(ex),
            },
            Stmt::While(s) => self.exec_while(s, src),
            Stmt::DoWhile(s) => self.exec_do_while(s, src),
            Stmt::For(s) => self.exec_for(s, src),
            Stmt::ForIn(s) => self.exec_for_in(s, src),
            Stmt::Break(_) => Flow::Break,
            Stmt::Continue(_) => Flow::Continue,
            Stmt::Throw(e, span) => match self.eval_expr(e, src) {
                Ok(v) => Flow::Throw(Exception::new(v).at(src, *span)),
                Err(ex) => Flow::Throw(ex),
            },
            Stmt::Try(t) => self.exec_try(t, src),
            Stmt::Block(body) => self.exec_block(body, src),
        }
    }

    pub(crate) fn exec_block(&mut self, body: &[Stmt], src: &Rc<SourceFile>) -> Flow {
        if !declares_lexical(body) {
            return self.exec_stmts(body, src);
        }
        let scope = self.new_scope(self.scope.clone());
        self.with_scope(scope, |rt| rt.exec_stmts(body, src))
    }

    /// Runs `f` with `scope` as the innermost scope.
    pub(crate) fn with_scope<F: FnOnce(&mut Self) -> Flow>(&mut self, scope: Rc<Scope>, f: F) -> Flow {
        let saved = self.scope.replace(scope);
        let flow = f(self);
        self.scope = saved;
        flow
    }

    fn exec_var_decl(&mut self, decl: &VarDecl, src: &Rc<SourceFile>) -> Flow {
        for d in decl.decls.iter() {
            let value = match &d.init {
                Some(e) => match self.eval_expr(e, src) {
                    Ok(v) => v,
                    Err(ex) => return Flow::Throw(ex),
                },
                None if decl.kind == VarKind::Var => continue,
                None => Value::Undefined,
            };
            let result = match decl.kind {
                VarKind::Var => self.assign_ident(&d.name, value),
                VarKind::Let | VarKind::Const => {
                    if let Some(scope) = &self.scope {
                        scope.declare(d.name.clone(), value, decl.kind == VarKind::Let);
                    }
                    Ok(())
                }
            };
            if let Err(ex) = result {
                return Flow::Throw(ex.at(src, d.span));
            }
        }
        Flow::None
    }

    /// Loop body outcome: `None` to keep looping, `Some` to leave with that flow.
    fn loop_body(&mut self, body: &Stmt, src: &Rc<SourceFile>) -> Option<Flow> {
        match self.exec_stmt(body, src) {
            Flow::None | Flow::Continue => None,
            Flow::Break => Some(Flow::None),
            other => Some(other),
        }
    }

    fn exec_while(&mut self, s: &WhileStmt, src: &Rc<SourceFile>) -> Flow {
        loop {
            match self.eval_expr(&s.cond, src) {
                Ok(c) if c.truthy() => {}
                Ok(_) => return Flow::None,
                Err(ex) => return Flow::Throw(ex),
            }
            if let Some(flow) = self.loop_body(&s.body, src) {
                return flow;
            }
        }
    }

    fn exec_do_while(&mut self, s: &WhileStmt, src: &Rc<SourceFile>) -> Flow {
        loop {
            if let Some(flow) = self.loop_body(&s.body, src) {
                return flow;
            }
            match self.eval_expr(&s.cond, src) {
                Ok(c) if c.truthy() => {}
                Ok(_) => return Flow::None,
                Err(ex) => return Flow::Throw(ex),
            }
        }
    }

    fn exec_for(&mut self, s: &ForStmt, src: &Rc<SourceFile>) -> Flow {
        let lexical = matches!(&s.init, Some(ForInit::Var(d)) if d.kind != VarKind::Var);
        if lexical {
            let scope = self.new_scope(self.scope.clone());
            return self.with_scope(scope, |rt| rt.exec_for_inner(s, src));
        }
        self.exec_for_inner(s, src)
    }

    fn exec_for_inner(&mut self, s: &ForStmt, src: &Rc<SourceFile>) -> Flow {
        match &s.init {
            Some(ForInit::Var(decl)) => {
                if let Flow::Throw(ex) = self.exec_var_decl(decl, src) {
                    return Flow::Throw(ex);
                }
            }
            Some(ForInit::Expr(e)) => {
                if let Err(ex) = self.eval_expr(e, src) {
                    return Flow::Throw(ex);
                }
            }
            None => {}
        }
        loop {
            if let Some(test) = &s.test {
                match self.eval_expr(test, src) {
                    Ok(c) if c.truthy() => {}
                    Ok(_) => return Flow::None,
                    Err(ex) => return Flow::Throw(ex),
                }
            }
            if let Some(flow) = self.loop_body(&s.body, src) {
                return flow;
            }
            if let Some(update) = &s.update {
                if let Err(ex) = self.eval_expr(update, src) {
                    return Flow::Throw(ex);
                }
            }
        }
    }

    fn exec_for_in(&mut self, s: &ForInStmt, src: &Rc<SourceFile>) -> Flow {
        let target = match self.eval_expr(&s.object, src) {
            Ok(v) => v,
            Err(ex) => return Flow::Throw(ex),
        };
        let obj = match &target {
            Value::Undefined | Value::Null => return Flow::None,
            Value::Object(o) => o.clone(),
            Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                let keys = match &target {
                    Value::String(t) => (0..t.encode_utf16().count())
                        .map(|i| PropertyKey::Index(i as u32).name())
                        .collect(),
                    _ => Vec::new(),
                };
                return self.for_in_keys(s, keys, None, src);
            }
        };
        let keys = self.enumerate_keys(&obj);
        self.for_in_keys(s, keys, Some(obj), src)
    }

    fn for_in_keys(
        &mut self,
        s: &ForInStmt,
        keys: Vec<Rc<str>>,
        obj: Option<crate::core::ObjRef>,
        src: &Rc<SourceFile>,
    ) -> Flow {
        let lexical = matches!(s.decl, Some(VarKind::Let | VarKind::Const));
        for key in keys {
            if let Some(o) = &obj {
                // Keys deleted during iteration are skipped.
                if !self.has_property(o, &PropertyKey::from_name(key.clone())) {
                    continue;
                }
            }
            let flow = if lexical {
                let scope = self.new_scope(self.scope.clone());
                scope.declare(s.name.clone(), Value::String(key), s.decl == Some(VarKind::Let));
                self.with_scope(scope, |rt| rt.loop_body(&s.body, src).unwrap_or(Flow::Continue))
            } else {
                if let Err(ex) = self.assign_ident(&s.name, Value::String(key)) {
                    return Flow::Throw(ex);
                }
                self.loop_body(&s.body, src).unwrap_or(Flow::Continue)
            };
            match flow {
                Flow::Continue => {}
                other => return other,
            }
        }
        Flow::None
    }

    fn exec_try(&mut self, t: &TryStmt, src: &Rc<SourceFile>) -> Flow {
        let mut flow = match (self.exec_block(&t.block, src), &t.catch) {
            (Flow::Throw(ex), Some(catch)) => {
                let scope = self.new_scope(self.scope.clone());
                if let Some(param) = &catch.param {
                    scope.declare(param.clone(), ex.value, true);
                }
                self.with_scope(scope, |rt| rt.exec_block(&catch.body, src))
            }
            (flow, _) => flow,
        };
        if let Some(finally) = &t.finally {
            let saved = std::mem::take(&mut self.completion);
            match self.exec_block(finally, src) {
                Flow::None => self.completion = saved,
                other => flow = other,
            }
        }
        flow
    }
}
