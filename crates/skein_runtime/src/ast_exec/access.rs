use std::rc::Rc;

use skein_ir::{Expr, ExprKind};
use skein_syntax::SourceFile;

use crate::core::{AssignOutcome, PropertyKey, Value};
use crate::errors::messages;
use crate::runtime::{JsResult, Runtime};

/// Assignable location produced by the left side of `=`, `++` and friends.
pub(crate) enum Reference {
    Binding(Rc<str>),
    Property(Value, PropertyKey),
}

impl Runtime {
    pub(crate) fn lookup_ident(&mut self, name: &Rc<str>) -> JsResult<Value> {
        if let Some(v) = self.scope.as_ref().and_then(|s| s.lookup(name)) {
            return Ok(v);
        }
        let global = self.current_global();
        let key = PropertyKey::from_name(name.clone());
        if self.has_property(&global, &key) {
            return self.get_property(&global, &key, &Value::Object(global.clone()));
        }
        Err(self.reference_error(format!("{name} is not defined")))
    }

    /// Whether `name` resolves to anything; `typeof` uses this to avoid throwing.
    pub(crate) fn ident_exists(&mut self, name: &Rc<str>) -> bool {
        if self.scope.as_ref().is_some_and(|s| s.lookup(name).is_some()) {
            return true;
        }
        let global = self.current_global();
        self.has_property(&global, &PropertyKey::from_name(name.clone()))
    }

    /// Assigns to the nearest binding, falling back to a global property.
    pub(crate) fn assign_ident(&mut self, name: &Rc<str>, value: Value) -> JsResult<()> {
        if let Some(scope) = self.scope.clone() {
            match scope.assign(name, value.clone()) {
                AssignOutcome::Done => return Ok(()),
                AssignOutcome::Immutable => return Err(self.type_error(messages::CONST_ASSIGNMENT)),
                AssignOutcome::Missing => {}
            }
        }
        let global = self.current_global();
        self.set_property(&global, PropertyKey::from_name(name.clone()), value)
    }

    pub(crate) fn eval_reference(&mut self, target: &Expr, src: &Rc<SourceFile>) -> JsResult<Reference> {
        Ok(match &target.kind {
            ExprKind::Ident(name) => Reference::Binding(name.clone()),
            ExprKind::Member { object, property } => {
                let base = self.eval_expr(object, src)?;
                Reference::Property(base, PropertyKey::from_name(property.clone()))
            }
            ExprKind::Index { object, index } => {
                let base = self.eval_expr(object, src)?;
                let key = self.eval_expr(index, src)?;
                let key = self.to_property_key(&key)?;
                Reference::Property(base, key)
            }
            _ => return Err(self.reference_error("Invalid left-hand side in assignment")),
        })
    }

    pub(crate) fn get_reference(&mut self, r: &Reference) -> JsResult<Value> {
        match r {
            Reference::Binding(name) => self.lookup_ident(name),
            Reference::Property(base, key) => self.get(base, key),
        }
    }

    pub(crate) fn put_reference(&mut self, r: Reference, value: Value) -> JsResult<()> {
        match r {
            Reference::Binding(name) => self.assign_ident(&name, value),
            Reference::Property(base, key) => self.put(&base, key, value),
        }
    }
}
