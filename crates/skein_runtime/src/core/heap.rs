//! Heap bookkeeping and cycle collection.
//!
//! Objects and scopes are reference counted, which frees everything except cycles. The
//! heap keeps a weak handle to every object and scope a runtime allocates, so it can find
//! cycles that nothing outside the heap still reaches and break them.
//!
//! Collection is trial deletion: a node whose strong count exceeds the references other
//! tracked nodes hold on it is rooted from outside (a context table, the embedder, a Rust
//! local). Everything reachable from such a node survives; the rest is cleared, which drops
//! the edges that kept the cycle alive.

use std::rc::{Rc, Weak};

use tracing::debug;

use super::env::Scope;
use super::object::{ObjRef, Object};
use super::{FastHashMap, fast_map_new};

/// An outgoing reference of a heap node.
pub enum Edge<'a> {
    Object(&'a ObjRef),
    Scope(&'a Rc<Scope>),
}

/// Registrations between pruning passes over dead handles.
const INITIAL_PRUNE_AT: usize = 4096;

pub struct Heap {
    objects: Vec<Weak<Object>>,
    scopes: Vec<Weak<Scope>>,
    prune_at: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            scopes: Vec::new(),
            prune_at: INITIAL_PRUNE_AT,
        }
    }

    pub fn track_object(&mut self, obj: &ObjRef) {
        self.objects.push(Rc::downgrade(obj));
        self.maybe_prune();
    }

    pub fn track_scope(&mut self, scope: &Rc<Scope>) {
        self.scopes.push(Rc::downgrade(scope));
        self.maybe_prune();
    }

    fn maybe_prune(&mut self) {
        if self.objects.len() + self.scopes.len() < self.prune_at {
            return;
        }
        self.prune();
        self.prune_at = ((self.objects.len() + self.scopes.len()) * 2).max(INITIAL_PRUNE_AT);
    }

    fn prune(&mut self) {
        self.objects.retain(|w| w.strong_count() > 0);
        self.scopes.retain(|w| w.strong_count() > 0);
    }

    /// Objects and scopes still alive.
    pub fn live_count(&self) -> usize {
        let objects = self.objects.iter().filter(|w| w.strong_count() > 0).count();
        let scopes = self.scopes.iter().filter(|w| w.strong_count() > 0).count();
        objects + scopes
    }

    /// Breaks every cycle not reachable from outside the heap. Returns how many nodes were
    /// cleared. Must not run while script code holds borrows into the heap.
    pub fn collect(&mut self) -> usize {
        self.prune();
        let objects: Vec<ObjRef> = self.objects.iter().filter_map(Weak::upgrade).collect();
        let scopes: Vec<Rc<Scope>> = self.scopes.iter().filter_map(Weak::upgrade).collect();
        let graph = Graph::new(&objects, &scopes);

        // Each upgrade above added one strong reference of our own.
        let mut refs: Vec<usize> = objects
            .iter()
            .map(|o| Rc::strong_count(o) - 1)
            .chain(scopes.iter().map(|s| Rc::strong_count(s) - 1))
            .collect();
        for node in 0..refs.len() {
            graph.for_each_child(node, |child| refs[child] = refs[child].saturating_sub(1));
        }

        let marks = graph.mark_all(refs.iter().enumerate().filter(|(_, r)| **r > 0).map(|(i, _)| i));
        let cleared = graph.sweep(&marks);
        debug!(
            objects = objects.len(),
            scopes = scopes.len(),
            cleared,
            "heap collected"
        );
        drop(graph);
        drop((objects, scopes));
        self.prune();
        cleared
    }

    /// Clears every live node, reachable or not. Used when the owning runtime goes away.
    pub fn teardown(&mut self) -> usize {
        let objects: Vec<ObjRef> = self.objects.drain(..).filter_map(|w| w.upgrade()).collect();
        let scopes: Vec<Rc<Scope>> = self.scopes.drain(..).filter_map(|w| w.upgrade()).collect();
        for obj in &objects {
            obj.clear();
        }
        for scope in &scopes {
            scope.clear();
        }
        let cleared = objects.len() + scopes.len();
        debug!(cleared, "heap torn down");
        cleared
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

/// Index over one snapshot of the heap; objects first, then scopes.
struct Graph<'a> {
    objects: &'a [ObjRef],
    scopes: &'a [Rc<Scope>],
    object_index: FastHashMap<*const Object, usize>,
    scope_index: FastHashMap<*const Scope, usize>,
}

impl<'a> Graph<'a> {
    fn new(objects: &'a [ObjRef], scopes: &'a [Rc<Scope>]) -> Self {
        let mut object_index = fast_map_new();
        for (i, o) in objects.iter().enumerate() {
            object_index.insert(Rc::as_ptr(o), i);
        }
        let mut scope_index = fast_map_new();
        for (i, s) in scopes.iter().enumerate() {
            scope_index.insert(Rc::as_ptr(s), objects.len() + i);
        }
        Self {
            objects,
            scopes,
            object_index,
            scope_index,
        }
    }

    fn len(&self) -> usize {
        self.objects.len() + self.scopes.len()
    }

    fn node_of(&self, edge: &Edge<'_>) -> Option<usize> {
        match edge {
            Edge::Object(o) => self.object_index.get(&Rc::as_ptr(o)).copied(),
            Edge::Scope(s) => self.scope_index.get(&Rc::as_ptr(s)).copied(),
        }
    }

    /// Calls `f` with every tracked child of `node`, once per edge.
    fn for_each_child(&self, node: usize, mut f: impl FnMut(usize)) {
        let mut visit = |edge: Edge<'_>| {
            if let Some(child) = self.node_of(&edge) {
                f(child);
            }
        };
        match node.checked_sub(self.objects.len()) {
            None => self.objects[node].trace(&mut visit),
            Some(i) => self.scopes[i].trace(&mut visit),
        }
    }

    fn mark_all(&self, roots: impl Iterator<Item = usize>) -> Vec<bool> {
        let mut marks = vec![false; self.len()];
        let mut stack: Vec<usize> = Vec::new();
        for root in roots {
            if !marks[root] {
                marks[root] = true;
                stack.push(root);
            }
        }
        while let Some(node) = stack.pop() {
            self.for_each_child(node, |child| {
                if !marks[child] {
                    marks[child] = true;
                    stack.push(child);
                }
            });
        }
        marks
    }

    fn sweep(&self, marks: &[bool]) -> usize {
        let mut cleared = 0;
        for (i, obj) in self.objects.iter().enumerate() {
            if !marks[i] {
                obj.clear();
                cleared += 1;
            }
        }
        for (i, scope) in self.scopes.iter().enumerate() {
            if !marks[self.objects.len() + i] {
                scope.clear();
                cleared += 1;
            }
        }
        cleared
    }
}
