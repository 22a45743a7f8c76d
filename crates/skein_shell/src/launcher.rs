//! Multi-instance launcher.
//!
//! Group 0 runs on the calling thread. Every further group gets a long-lived worker thread
//! that builds a fresh instance for each repetition. Each repetition the control thread sends
//! every worker a start message over a rendezvous channel, carrying whether the run is the
//! final one, then waits on the worker's done channel. A worker stops after the run it was
//! told is final, or when its start channel closes.

use std::io::Write;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, error};

use crate::error::ShellError;
use crate::instance::Instance;
use crate::io::exit_process;
use crate::options::ShellOptions;
use crate::source_group::SourceGroup;

/// Stack size for worker threads and the control thread.
pub const THREAD_STACK_SIZE: usize = 32 * 1024 * 1024;

const WORKER_NAME: &str = "IsolateThread";

struct Worker {
    index: usize,
    /// Carries `true` for the final run.
    start: Option<Sender<bool>>,
    done: Receiver<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(index: usize, group: SourceGroup, options: ShellOptions) -> Result<Self, ShellError> {
        let (start_tx, start_rx) = channel::bounded::<bool>(0);
        let (done_tx, done_rx) = channel::bounded::<bool>(1);
        let handle = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .stack_size(THREAD_STACK_SIZE)
            .spawn(move || worker_loop(index, &group, &options, &start_rx, &done_tx))
            .map_err(ShellError::Spawn)?;
        Ok(Self {
            index,
            start: Some(start_tx),
            done: done_rx,
            handle: Some(handle),
        })
    }

    fn start(&self, is_last: bool) -> Result<(), ShellError> {
        let start = self.start.as_ref().ok_or(ShellError::WorkerStopped(self.index))?;
        start
            .send(is_last)
            .map_err(|_| ShellError::WorkerStopped(self.index))
    }

    /// Outcome of the run just started.
    fn wait(&self) -> Result<bool, ShellError> {
        self.done
            .recv()
            .map_err(|_| ShellError::WorkerStopped(self.index))
    }

    /// Outcome of the final run, then the thread is gone.
    fn finish(&mut self) -> Result<bool, ShellError> {
        let ok = self.wait();
        self.stop()?;
        ok
    }

    /// Closes the start channel of an idle worker and joins it.
    fn stop(&mut self) -> Result<(), ShellError> {
        self.start = None;
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| ShellError::WorkerPanicked)?;
        }
        Ok(())
    }
}

fn worker_loop(
    index: usize,
    group: &SourceGroup,
    options: &ShellOptions,
    start: &Receiver<bool>,
    done: &Sender<bool>,
) {
    debug!(index, "worker started");
    while let Ok(is_last) = start.recv() {
        let ok = {
            let mut instance = Instance::new(options);
            let ok = match instance.run_group(group) {
                Ok(ok) => ok,
                Err(e) => {
                    error!(index, error = %e, "worker failed");
                    eprintln!("{e}");
                    exit_process(1);
                }
            };
            if options.send_idle_notification {
                instance.idle_notification();
            }
            ok
        };
        if done.send(ok).is_err() || is_last {
            break;
        }
    }
    debug!(index, "worker stopped");
}

pub struct Launcher {
    options: ShellOptions,
}

impl Launcher {
    pub fn new(options: ShellOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ShellOptions {
        &self.options
    }

    /// Runs every group, repeated `stress_runs` times, then the interactive shell if asked for
    /// or if nothing ran. Returns whether every unit of every run succeeded.
    pub fn run(&self) -> Result<bool, ShellError> {
        let opts = &self.options;
        let runs = opts.stress_runs.max(1);

        let mut workers = Vec::new();
        for (i, group) in opts.groups.iter().enumerate().skip(1) {
            workers.push(Worker::spawn(i, group.clone(), opts.clone())?);
        }
        let main_group = opts.groups.first().cloned().unwrap_or_default();

        let mut ok = true;
        let mut kept = None;
        for run in 0..runs {
            let is_last = run + 1 == runs;
            if runs > 1 {
                let mut out = std::io::stdout().lock();
                writeln!(out, "============ Run {}/{} ============", run + 1, runs)
                    .map_err(ShellError::Write)?;
                debug!(run = run + 1, runs, "stress run");
            }
            for w in &workers {
                w.start(is_last)?;
            }

            let mut instance = Instance::new(opts);
            let mut run_ok = instance.run_group(&main_group)?;
            if opts.send_idle_notification {
                instance.idle_notification();
            }

            for w in &mut workers {
                run_ok &= if is_last { w.finish()? } else { w.wait()? };
            }
            ok &= run_ok;

            if is_last {
                kept = Some(instance);
            } else if !run_ok {
                debug!(run = run + 1, "stopping after failed run");
                for w in &mut workers {
                    w.stop()?;
                }
                kept = Some(instance);
                break;
            }
        }

        let wants_shell = opts.interactive_shell || (!opts.has_sources() && !opts.test_shell);
        if let Some(instance) = kept.as_mut().filter(|_| wants_shell) {
            instance.run_interactive()?;
        }
        Ok(ok)
    }
}
