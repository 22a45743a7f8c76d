//! Realm directory.
//!
//! Each engine instance keeps its realms here, addressed by dense indices. Realm 0 is created
//! with the instance and never disposed from script. `current` is the realm the next top-level
//! unit runs in; `Realm.switch` only records `pending_switch`, which the driver commits after
//! the running unit finishes.

use skein_runtime::{BuiltinProvider, Context, ObjRef, Runtime, Value};
use tracing::debug;

use crate::error::ShellError;

pub struct RealmDirectory {
    realms: Vec<Option<Context>>,
    current: usize,
    pending_switch: usize,
    shared: Option<Value>,
}

impl RealmDirectory {
    pub fn new() -> Self {
        Self {
            realms: Vec::new(),
            current: 0,
            pending_switch: 0,
            shared: None,
        }
    }

    /// Appends a realm whose global carries the standard builtins plus `providers`.
    pub fn create(&mut self, rt: &mut Runtime, providers: &[&dyn BuiltinProvider]) -> usize {
        let ctx = rt.create_context(providers);
        self.realms.push(Some(ctx));
        let index = self.realms.len() - 1;
        debug!(index, "realm created");
        index
    }

    /// The live realm at `index`.
    pub fn context(&self, index: usize) -> Result<Context, ShellError> {
        match self.realms.get(index) {
            Some(Some(ctx)) => Ok(ctx.clone()),
            _ => Err(ShellError::InvalidRealmIndex),
        }
    }

    pub fn global(&self, index: usize) -> Result<ObjRef, ShellError> {
        self.context(index).map(|c| c.global())
    }

    /// Releases realm `index`. Realm 0, the current realm and the pending switch target stay.
    pub fn dispose(&mut self, rt: &mut Runtime, index: usize) -> Result<(), ShellError> {
        let ctx = self.context(index)?;
        if index == 0 || index == self.current || index == self.pending_switch {
            return Err(ShellError::InvalidRealmIndex);
        }
        rt.dispose_context(&ctx);
        self.realms[index] = None;
        debug!(index, "realm disposed");
        Ok(())
    }

    /// Index of the realm `rt` has entered most recently.
    pub fn current_of(&self, rt: &Runtime) -> Option<usize> {
        let entered = rt.current_context()?;
        self.realms
            .iter()
            .position(|r| r.as_ref().is_some_and(|c| c.ptr_eq(entered)))
    }

    /// Index of the live realm `obj` was created in.
    pub fn owner_of(&self, obj: &ObjRef) -> Option<usize> {
        let id = obj.context();
        self.realms
            .iter()
            .position(|r| r.as_ref().is_some_and(|c| c.id() == id))
    }

    /// Makes `index` current once the running unit completes.
    pub fn switch_to(&mut self, index: usize) -> Result<(), ShellError> {
        self.context(index)?;
        self.pending_switch = index;
        debug!(index, "realm switch scheduled");
        Ok(())
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn pending_switch(&self) -> usize {
        self.pending_switch
    }

    /// Called by the driver at each unit boundary.
    pub fn commit_switch(&mut self) {
        if self.current != self.pending_switch {
            debug!(from = self.current, to = self.pending_switch, "realm switched");
        }
        self.current = self.pending_switch;
    }

    pub fn len(&self) -> usize {
        self.realms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.realms.is_empty()
    }

    pub fn shared(&self) -> Value {
        self.shared.clone().unwrap_or_default()
    }

    pub fn set_shared(&mut self, value: Value) {
        self.shared = Some(value);
    }

    /// Disposes every live realm, breaking reference cycles through their globals.
    pub fn dispose_all(&mut self, rt: &mut Runtime) {
        self.shared = None;
        for ctx in self.realms.drain(..).flatten() {
            rt.dispose_context(&ctx);
        }
        self.current = 0;
        self.pending_switch = 0;
    }
}

impl Default for RealmDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispose_rules() {
        let mut rt = Runtime::new();
        let mut dir = RealmDirectory::new();
        assert_eq!(dir.create(&mut rt, &[]), 0);
        assert_eq!(dir.create(&mut rt, &[]), 1);
        assert_eq!(dir.create(&mut rt, &[]), 2);

        assert!(dir.dispose(&mut rt, 0).is_err());
        dir.switch_to(2).unwrap();
        assert!(dir.dispose(&mut rt, 2).is_err());
        assert!(dir.dispose(&mut rt, 1).is_ok());
        assert!(dir.dispose(&mut rt, 1).is_err());
        assert!(dir.global(1).is_err());
        assert!(dir.dispose(&mut rt, 7).is_err());
        assert_eq!(dir.len(), 3);
    }

    #[test]
    fn switch_is_deferred() {
        let mut rt = Runtime::new();
        let mut dir = RealmDirectory::new();
        dir.create(&mut rt, &[]);
        dir.create(&mut rt, &[]);
        dir.switch_to(1).unwrap();
        assert_eq!(dir.current(), 0);
        dir.commit_switch();
        assert_eq!(dir.current(), 1);
        assert!(dir.switch_to(5).is_err());
        assert_eq!(dir.pending_switch(), 1);
    }

    #[test]
    fn owner_and_current() {
        let mut rt = Runtime::new();
        let mut dir = RealmDirectory::new();
        dir.create(&mut rt, &[]);
        dir.create(&mut rt, &[]);
        let g1 = dir.global(1).unwrap();
        assert_eq!(dir.owner_of(&g1), Some(1));
        assert_eq!(dir.current_of(&rt), None);
        let ctx = dir.context(1).unwrap();
        rt.enter_context(&ctx);
        assert_eq!(dir.current_of(&rt), Some(1));
        rt.exit_context();
    }
}
