//! One engine instance: a runtime, its realms, its buffer arena and its streams.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use skein_core::{BufferArena, SharedArena};
use skein_runtime::{JsResult, Runtime};
use tracing::debug;

use crate::driver::execute_string;
use crate::error::ShellError;
use crate::globals::ShellGlobals;
use crate::io::{Input, Output, exit_process};
use crate::lock::ExecLock;
use crate::options::ShellOptions;
use crate::realm::RealmDirectory;
use crate::source_group::SourceGroup;

pub const PROMPT: &str = "skein> ";
pub const INTERACTIVE_NAME: &str = "(skein)";

/// Embedder state reachable from native functions.
pub struct ShellState {
    pub(crate) arena: SharedArena,
    pub(crate) realms: RefCell<RealmDirectory>,
    pub(crate) test_shell: bool,
    pub(crate) output: RefCell<Output>,
    pub(crate) input: RefCell<Input>,
    pub(crate) lock: ExecLock,
    /// Set once any unit has been compiled.
    pub(crate) executed: Cell<bool>,
}

impl ShellState {
    /// Writes script-facing output. A failed write ends the process.
    pub(crate) fn emit(&self, text: &str) {
        let mut out = self.output.borrow_mut();
        if let Err(e) = out.write_all(text.as_bytes()) {
            eprintln!("{}", ShellError::Write(e));
            exit_process(1);
        }
    }

    pub(crate) fn flush(&self) {
        let _ = self.output.borrow_mut().flush();
    }
}

/// The shell state of `rt`, or a thrown string when `rt` is not a shell runtime.
pub(crate) fn shell_state(rt: &Runtime) -> JsResult<Rc<ShellState>> {
    rt.embedder_data::<ShellState>()
        .ok_or_else(|| rt.throw_string("Not running inside the shell"))
}

pub struct Instance {
    rt: Runtime,
    state: Rc<ShellState>,
}

impl Instance {
    pub fn new(options: &ShellOptions) -> Self {
        Self::with_io(options, Output::Stdout, Input::Stdin)
    }

    pub fn with_io(options: &ShellOptions, output: Output, input: Input) -> Self {
        let mut rt = Runtime::new();
        let state = Rc::new(ShellState {
            arena: BufferArena::shared(),
            realms: RefCell::new(RealmDirectory::new()),
            test_shell: options.test_shell,
            output: RefCell::new(output),
            input: RefCell::new(input),
            lock: ExecLock::new(),
            executed: Cell::new(false),
        });
        rt.set_embedder_data(state.clone());
        let arena = state.arena.clone();
        rt.on_idle(Box::new(move || {
            if let Ok(mut arena) = arena.try_borrow_mut() {
                arena.shrink();
            }
        }));
        state.realms.borrow_mut().create(&mut rt, &[&ShellGlobals]);
        debug!("instance created");
        Self { rt, state }
    }

    pub fn runtime(&mut self) -> &mut Runtime {
        &mut self.rt
    }

    /// Runs one unit in the current realm; see `driver::execute_string`.
    pub fn execute(&mut self, source: &str, name: &str, print_result: bool, report: bool) -> bool {
        let state = self.state.clone();
        let _held = state.lock.acquire();
        execute_string(&mut self.rt, source, name, print_result, report)
    }

    /// Runs every unit of `group` under the execution lock, then collects the cycles it left.
    pub fn run_group(&mut self, group: &SourceGroup) -> Result<bool, ShellError> {
        let state = self.state.clone();
        let outcome = {
            let _held = state.lock.acquire();
            group.execute(&mut self.rt)
        };
        self.collect_garbage();
        outcome
    }

    /// Frees unreachable cycles and the buffers they hold. Returns the number of objects and
    /// scopes cleared.
    pub fn collect_garbage(&mut self) -> usize {
        let cleared = self.rt.collect_garbage();
        if cleared > 0 {
            debug!(cleared, live_bytes = self.buffer_bytes(), "garbage collected");
        }
        cleared
    }

    pub fn idle_notification(&mut self) {
        self.rt.idle_notification();
    }

    /// Reads lines until end of input, running each with result printing on.
    pub fn run_interactive(&mut self) -> Result<(), ShellError> {
        let state = self.state.clone();
        let _held = state.lock.acquire();
        loop {
            state.emit(PROMPT);
            state.flush();
            let mut line = String::new();
            let read = state
                .lock
                .unlocked(|| state.input.borrow_mut().read_line(&mut line));
            match read {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    execute_string(&mut self.rt, &line, INTERACTIVE_NAME, true, true);
                }
            }
        }
        state.emit("\n");
        state.flush();
        Ok(())
    }

    /// Whether any unit has been compiled in this instance.
    pub fn executed(&self) -> bool {
        self.state.executed.get()
    }

    pub fn realm_count(&self) -> usize {
        self.state.realms.borrow().len()
    }

    /// Bytes held by this instance's live buffers.
    pub fn buffer_bytes(&self) -> usize {
        self.state.arena.borrow().live_bytes()
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.state.flush();
        self.state.realms.borrow_mut().dispose_all(&mut self.rt);
        debug!("instance disposed");
    }
}
