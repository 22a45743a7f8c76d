//! The skein shell: host globals, realms, the execution driver and the launcher.
//!
//! - `buffers` - `ArrayBuffer` and the typed view constructors, over `skein_core`
//! - `realm` - index-addressed realms of one instance
//! - `driver` - compiles and runs one unit and reports failures
//! - `source_group` / `launcher` - what each instance runs, and on which thread

pub mod buffers;
pub mod driver;
pub mod error;
pub mod globals;
pub mod instance;
pub mod io;
pub mod launcher;
pub mod lock;
pub mod options;
pub mod realm;
pub mod source_group;

pub use driver::execute_string;
pub use error::ShellError;
pub use globals::ShellGlobals;
pub use instance::{INTERACTIVE_NAME, Instance, PROMPT, ShellState};
pub use io::{CapturedOutput, Input, Output};
pub use launcher::{Launcher, THREAD_STACK_SIZE};
pub use options::{ShellOptions, USAGE};
pub use realm::RealmDirectory;
pub use source_group::SourceGroup;
