use std::io;

/// Failures of the shell itself, as opposed to exceptions thrown inside scripts.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// A script file named on the command line could not be read.
    #[error("Error reading '{path}'")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Standard output rejected a write.
    #[error("Error in fwrite")]
    Write(#[source] io::Error),

    #[error("invalid value for {option}: {reason}")]
    InvalidOption { option: String, reason: String },

    /// Out of range, disposed, or not disposable in the current state.
    #[error("Invalid realm index")]
    InvalidRealmIndex,

    #[error("failed to start worker thread")]
    Spawn(#[source] io::Error),

    #[error("worker thread panicked")]
    WorkerPanicked,

    /// A worker exited before the control thread was done with it.
    #[error("worker for group {0} stopped unexpectedly")]
    WorkerStopped(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let e = ShellError::Read {
            path: "missing.js".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(e.to_string(), "Error reading 'missing.js'");
        assert_eq!(ShellError::InvalidRealmIndex.to_string(), "Invalid realm index");
        assert_eq!(
            ShellError::WorkerStopped(2).to_string(),
            "worker for group 2 stopped unexpectedly"
        );
    }
}
