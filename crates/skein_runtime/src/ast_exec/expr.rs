use std::rc::Rc;

use skein_ir::{BinaryOp, Expr, ExprKind, FunctionNode, LogicalOp, UnaryOp, UpdateOp};
use skein_syntax::SourceFile;

use super::access::Reference;
use crate::core::number::to_uint32;
use crate::core::{Property, PropertyKey, Value};
use crate::runtime::{JsResult, Runtime};

impl Runtime {
    /// Evaluates `expr`; a failure is located at the innermost expression that raised it.
    pub(crate) fn eval_expr(&mut self, expr: &Expr, src: &Rc<SourceFile>) -> JsResult<Value> {
        self.pos = expr.span;
        self.eval_inner(expr, src).map_err(|e| e.at(src, expr.span))
    }

    fn eval_inner(&mut self, expr: &Expr, src: &Rc<SourceFile>) -> JsResult<Value> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::String(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Ident(name) => {
                if &**name == "undefined" && !self.ident_shadowed(name) {
                    return Ok(Value::Undefined);
                }
                self.lookup_ident(name)
            }
            ExprKind::This => Ok(match self.frames.last() {
                Some(frame) => frame.this.clone(),
                None => Value::Object(self.context().global()),
            }),
            ExprKind::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items.iter() {
                    values.push(self.eval_expr(item, src)?);
                }
                Ok(Value::Object(self.new_array(values)))
            }
            ExprKind::Object(props) => {
                let obj = self.new_object();
                for p in props.iter() {
                    let v = self.eval_expr(&p.value, src)?;
                    obj.props_mut().insert(p.key.clone(), Property::data(v));
                }
                Ok(Value::Object(obj))
            }
            ExprKind::Function(node) => Ok(self.eval_function(node, src)),
            ExprKind::Unary { op, expr: operand } => self.eval_unary(*op, operand, src),
            ExprKind::Update { op, prefix, target } => {
                let r = self.eval_reference(target, src)?;
                let old = self.get_reference(&r)?;
                let old = self.to_number(&old)?;
                let new = match op {
                    UpdateOp::Inc => old + 1.0,
                    UpdateOp::Dec => old - 1.0,
                };
                self.put_reference(r, Value::Number(new))?;
                Ok(Value::Number(if *prefix { new } else { old }))
            }
            ExprKind::Binary { op, left, right } => {
                let l = self.eval_expr(left, src)?;
                let r = self.eval_expr(right, src)?;
                self.pos = expr.span;
                self.binary(*op, &l, &r)
            }
            ExprKind::Logical { op, left, right } => {
                let l = self.eval_expr(left, src)?;
                let short = match op {
                    LogicalOp::And => !l.truthy(),
                    LogicalOp::Or => l.truthy(),
                };
                if short { Ok(l) } else { self.eval_expr(right, src) }
            }
            ExprKind::Assign { op, target, value } => {
                let r = self.eval_reference(target, src)?;
                let v = match op.binary() {
                    None => self.eval_expr(value, src)?,
                    Some(bin) => {
                        let current = self.get_reference(&r)?;
                        let rhs = self.eval_expr(value, src)?;
                        self.binary(bin, &current, &rhs)?
                    }
                };
                self.pos = expr.span;
                self.put_reference(r, v.clone())?;
                Ok(v)
            }
            ExprKind::Conditional {
                test,
                then,
                otherwise,
            } => {
                if self.eval_expr(test, src)?.truthy() {
                    self.eval_expr(then, src)
                } else {
                    self.eval_expr(otherwise, src)
                }
            }
            ExprKind::Member { object, property } => {
                let base = self.eval_expr(object, src)?;
                self.pos = expr.span;
                self.get(&base, &PropertyKey::from_name(property.clone()))
            }
            ExprKind::Index { object, index } => {
                let base = self.eval_expr(object, src)?;
                let key = self.eval_expr(index, src)?;
                let key = self.to_property_key(&key)?;
                self.pos = expr.span;
                self.get(&base, &key)
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args, expr.span, src),
            ExprKind::New { callee, args } => self.eval_new(callee, args, expr.span, src),
            ExprKind::Sequence(items) => {
                let mut last = Value::Undefined;
                for item in items.iter() {
                    last = self.eval_expr(item, src)?;
                }
                Ok(last)
            }
            ExprKind::Error => Ok(Value::Undefined),
        }
    }

    fn ident_shadowed(&self, name: &str) -> bool {
        self.scope.as_ref().is_some_and(|s| s.lookup(name).is_some())
    }

    fn eval_function(&mut self, node: &Rc<FunctionNode>, src: &Rc<SourceFile>) -> Value {
        let global = self.current_global();
        let outer = match &self.scope {
            Some(s) => s.clone(),
            None => self.context().script_scope(),
        };
        let Some(name) = node.name.clone() else {
            return Value::Object(self.new_closure(node.clone(), &outer, src, &global));
        };
        // A named function expression sees its own name.
        let scope = self.new_scope(Some(outer));
        let func = self.new_closure(node.clone(), &scope, src, &global);
        scope.declare(name, Value::Object(func.clone()), false);
        Value::Object(func)
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr, src: &Rc<SourceFile>) -> JsResult<Value> {
        match op {
            UnaryOp::Typeof => {
                if let ExprKind::Ident(name) = &operand.kind {
                    if !self.ident_exists(name) {
                        return Ok(Value::str("undefined"));
                    }
                }
                let v = self.eval_expr(operand, src)?;
                Ok(Value::str(v.type_of()))
            }
            UnaryOp::Delete => self.eval_delete(operand, src),
            _ => {
                let v = self.eval_expr(operand, src)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!v.truthy()),
                    UnaryOp::Neg => Value::Number(-self.to_number(&v)?),
                    UnaryOp::Plus => Value::Number(self.to_number(&v)?),
                    UnaryOp::BitNot => Value::Number(!self.to_int32(&v)? as f64),
                    _ => Value::Undefined,
                })
            }
        }
    }

    fn eval_delete(&mut self, operand: &Expr, src: &Rc<SourceFile>) -> JsResult<Value> {
        match &operand.kind {
            ExprKind::Ident(name) => {
                if self.ident_shadowed(name) {
                    return Ok(Value::Bool(false));
                }
                let global = self.current_global();
                let deleted = self.delete_property(&global, &PropertyKey::from_name(name.clone()));
                Ok(Value::Bool(deleted))
            }
            ExprKind::Member { .. } | ExprKind::Index { .. } => {
                let Reference::Property(base, key) = self.eval_reference(operand, src)? else {
                    return Ok(Value::Bool(true));
                };
                match &base {
                    Value::Object(o) => Ok(Value::Bool(self.delete_property(o, &key))),
                    Value::Undefined | Value::Null => {
                        let what = if base.is_undefined() { "undefined" } else { "null" };
                        Err(self.type_error(format!(
                            "Cannot convert {what} to object"
                        )))
                    }
                    _ => Ok(Value::Bool(true)),
                }
            }
            _ => {
                self.eval_expr(operand, src)?;
                Ok(Value::Bool(true))
            }
        }
    }

    pub(crate) fn binary(&mut self, op: BinaryOp, l: &Value, r: &Value) -> JsResult<Value> {
        Ok(match op {
            BinaryOp::Add => {
                let lp = self.to_primitive(l, false)?;
                let rp = self.to_primitive(r, false)?;
                if matches!(lp, Value::String(_)) || matches!(rp, Value::String(_)) {
                    let a = self.to_string(&lp)?;
                    let b = self.to_string(&rp)?;
                    let mut s = String::with_capacity(a.len() + b.len());
                    s.push_str(&a);
                    s.push_str(&b);
                    Value::from(s)
                } else {
                    Value::Number(self.to_number(&lp)? + self.to_number(&rp)?)
                }
            }
            BinaryOp::Sub => Value::Number(self.to_number(l)? - self.to_number(r)?),
            BinaryOp::Mul => Value::Number(self.to_number(l)? * self.to_number(r)?),
            BinaryOp::Div => Value::Number(self.to_number(l)? / self.to_number(r)?),
            BinaryOp::Mod => Value::Number(self.to_number(l)? % self.to_number(r)?),
            BinaryOp::BitAnd => Value::Number((self.to_int32(l)? & self.to_int32(r)?) as f64),
            BinaryOp::BitOr => Value::Number((self.to_int32(l)? | self.to_int32(r)?) as f64),
            BinaryOp::BitXor => Value::Number((self.to_int32(l)? ^ self.to_int32(r)?) as f64),
            BinaryOp::Shl => {
                let a = self.to_int32(l)?;
                let b = self.to_uint32(r)? & 31;
                Value::Number(a.wrapping_shl(b) as f64)
            }
            BinaryOp::Shr => {
                let a = self.to_int32(l)?;
                let b = self.to_uint32(r)? & 31;
                Value::Number((a >> b) as f64)
            }
            BinaryOp::UShr => {
                let a = to_uint32(self.to_number(l)?);
                let b = self.to_uint32(r)? & 31;
                Value::Number((a >> b) as f64)
            }
            BinaryOp::Eq => Value::Bool(self.loose_equals(l, r)?),
            BinaryOp::Ne => Value::Bool(!self.loose_equals(l, r)?),
            BinaryOp::StrictEq => Value::Bool(l.strict_equals(r)),
            BinaryOp::StrictNe => Value::Bool(!l.strict_equals(r)),
            BinaryOp::Lt => Value::Bool(self.compare(l, r, false)? == Some(true)),
            BinaryOp::Gt => Value::Bool(self.compare(r, l, true)? == Some(true)),
            BinaryOp::Le => Value::Bool(self.compare(r, l, true)? == Some(false)),
            BinaryOp::Ge => Value::Bool(self.compare(l, r, false)? == Some(false)),
            BinaryOp::In => Value::Bool(self.has_in(l, r)?),
            BinaryOp::Instanceof => Value::Bool(self.instance_of(l, r)?),
        })
    }

    /// Abstract relational comparison `a < b`; `None` when either side is NaN.
    /// `right_first` keeps left-to-right conversion order when the operands were swapped.
    fn compare(&mut self, a: &Value, b: &Value, right_first: bool) -> JsResult<Option<bool>> {
        let (pa, pb) = if right_first {
            let pb = self.to_primitive(b, false)?;
            (self.to_primitive(a, false)?, pb)
        } else {
            let pa = self.to_primitive(a, false)?;
            (pa, self.to_primitive(b, false)?)
        };
        if let (Value::String(x), Value::String(y)) = (&pa, &pb) {
            return Ok(Some(x.encode_utf16().lt(y.encode_utf16())));
        }
        let x = self.to_number(&pa)?;
        let y = self.to_number(&pb)?;
        if x.is_nan() || y.is_nan() {
            return Ok(None);
        }
        Ok(Some(x < y))
    }
}
