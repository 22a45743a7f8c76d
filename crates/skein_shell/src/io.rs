//! Script-facing standard streams.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use crate::lock::ExecLock;

/// Where `print`, `write` and reports go.
pub enum Output {
    Stdout,
    Writer(Box<dyn Write>),
}

impl Output {
    pub fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().lock().write_all(bytes),
            Output::Writer(w) => w.write_all(bytes),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().lock().flush(),
            Output::Writer(w) => w.flush(),
        }
    }
}

/// Where `readline` and the interactive shell read from.
pub enum Input {
    Stdin,
    Reader(Box<dyn BufRead>),
}

impl Input {
    /// Appends the next line, newline included; returns 0 at end of input.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        match self {
            Input::Stdin => io::stdin().read_line(buf),
            Input::Reader(r) => r.read_line(buf),
        }
    }
}

/// An in-memory `Output` whose contents stay readable after it is handed over.
#[derive(Clone, Default)]
pub struct CapturedOutput(Rc<RefCell<Vec<u8>>>);

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads a whole file with the execution lock released.
pub fn read_bytes(lock: Option<&ExecLock>, path: &str) -> io::Result<Vec<u8>> {
    match lock {
        Some(lock) => lock.unlocked(|| std::fs::read(path)),
        None => std::fs::read(path),
    }
}

/// Like `read_bytes`; invalid UTF-8 is replaced rather than rejected.
pub fn read_text(lock: Option<&ExecLock>, path: &str) -> io::Result<String> {
    let bytes = read_bytes(lock, path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Flushes the standard streams and ends the process without unwinding.
pub fn exit_process(code: i32) -> ! {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
    // SAFETY: `_exit` only terminates the process; both standard streams were flushed above.
    unsafe { libc::_exit(code) }
}

/// One `readline` result: lines ending in a backslash continue onto the next, the backslash
/// becoming a newline. `None` at end of input with nothing read.
pub fn read_continued_line(input: &mut Input, lock: &ExecLock) -> io::Result<Option<String>> {
    let mut out = String::new();
    loop {
        let mut line = String::new();
        let n = lock.unlocked(|| input.read_line(&mut line))?;
        if n == 0 {
            return Ok(if out.is_empty() { None } else { Some(out) });
        }
        let Some(body) = line.strip_suffix('\n') else {
            out.push_str(&line);
            continue;
        };
        let body = body.strip_suffix('\r').unwrap_or(body);
        match body.strip_suffix('\\') {
            Some(head) => {
                out.push_str(head);
                out.push('\n');
            }
            None => {
                out.push_str(body);
                return Ok(Some(out));
            }
        }
    }
}
