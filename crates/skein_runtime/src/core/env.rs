use std::cell::RefCell;
use std::rc::Rc;

use super::heap::Edge;
use super::value::Value;
use super::{FastHashMap, fast_map_new};

#[derive(Clone, Debug)]
pub struct Binding {
    pub value: Value,
    pub mutable: bool,
}

pub enum AssignOutcome {
    Done,
    Immutable,
    Missing,
}

/// One lexical scope. Closures keep their defining scope alive through `parent`.
pub struct Scope {
    bindings: RefCell<FastHashMap<Rc<str>, Binding>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn new(parent: Option<Rc<Scope>>) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(fast_map_new()),
            parent,
        })
    }

    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }

    pub fn declare(&self, name: Rc<str>, value: Value, mutable: bool) {
        self.bindings
            .borrow_mut()
            .insert(name, Binding { value, mutable });
    }

    /// `var` semantics: an existing binding keeps its value.
    pub fn declare_var(&self, name: &Rc<str>) {
        let mut bindings = self.bindings.borrow_mut();
        if !bindings.contains_key(name) {
            bindings.insert(
                name.clone(),
                Binding {
                    value: Value::Undefined,
                    mutable: true,
                },
            );
        }
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut scope = self;
        loop {
            if let Some(b) = scope.bindings.borrow().get(name) {
                return Some(b.value.clone());
            }
            scope = scope.parent.as_deref()?;
        }
    }

    pub fn assign(&self, name: &str, value: Value) -> AssignOutcome {
        let mut scope = self;
        loop {
            if let Some(b) = scope.bindings.borrow_mut().get_mut(name) {
                if !b.mutable {
                    return AssignOutcome::Immutable;
                }
                b.value = value;
                return AssignOutcome::Done;
            }
            match scope.parent.as_deref() {
                Some(p) => scope = p,
                None => return AssignOutcome::Missing,
            }
        }
    }

    /// Reports the parent scope and every object bound here.
    pub fn trace(&self, visit: &mut dyn FnMut(Edge<'_>)) {
        if let Some(parent) = &self.parent {
            visit(Edge::Scope(parent));
        }
        for binding in self.bindings.borrow().values() {
            if let Value::Object(o) = &binding.value {
                visit(Edge::Object(o));
            }
        }
    }

    pub fn clear(&self) {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        drop(bindings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parents_and_respects_const() {
        let outer = Scope::new(None);
        outer.declare(Rc::from("a"), Value::Number(1.0), true);
        outer.declare(Rc::from("k"), Value::Number(2.0), false);
        let inner = Scope::new(Some(outer.clone()));
        inner.declare_var(&Rc::from("b"));

        assert!(matches!(inner.lookup("a"), Some(Value::Number(n)) if n == 1.0));
        assert!(matches!(inner.lookup("b"), Some(Value::Undefined)));
        assert!(inner.lookup("zz").is_none());

        assert!(matches!(inner.assign("a", Value::Number(5.0)), AssignOutcome::Done));
        assert!(matches!(outer.lookup("a"), Some(Value::Number(n)) if n == 5.0));
        assert!(matches!(inner.assign("k", Value::Null), AssignOutcome::Immutable));
        assert!(matches!(inner.assign("zz", Value::Null), AssignOutcome::Missing));
    }
}
