use std::io::Write;
use std::thread;

use anyhow::{Context, anyhow};
use skein_shell::{Launcher, ShellOptions, THREAD_STACK_SIZE, USAGE};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn init_logging() {
    let filter = EnvFilter::try_from_env("SKEIN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs the launcher on a thread with the same stack size the workers get.
fn run(options: ShellOptions) -> anyhow::Result<bool> {
    let handle = thread::Builder::new()
        .name("main".to_string())
        .stack_size(THREAD_STACK_SIZE)
        .spawn(move || Launcher::new(options).run())
        .context("failed to start main thread")?;
    let ok = handle
        .join()
        .map_err(|_| anyhow!("main thread panicked"))??;
    Ok(ok)
}

fn main() {
    init_logging();
    let options = match ShellOptions::parse(std::env::args().skip(1)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };
    if options.help {
        println!("{USAGE}");
        return;
    }
    debug!(groups = options.groups.len(), runs = options.stress_runs, "starting");

    let code = match run(options) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("{e}");
            1
        }
    };
    let _ = std::io::stdout().flush();
    std::process::exit(code);
}
