//! Source groups: the files and inline sources one instance runs, in command-line order.

use skein_runtime::Runtime;

use crate::driver::execute_string;
use crate::error::ShellError;
use crate::instance::ShellState;
use crate::io::read_text;

/// The argument tokens one engine instance runs, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceGroup {
    tokens: Vec<String>,
}

impl SourceGroup {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether any token names a file or inline source.
    pub fn has_units(&self) -> bool {
        let mut tokens = self.tokens.iter();
        while let Some(t) = tokens.next() {
            if t == "-e" {
                if tokens.next().is_some() {
                    return true;
                }
            } else if !t.starts_with('-') {
                return true;
            }
        }
        false
    }

    /// Runs each unit: `-e <src>` as `unnamed`, other dash tokens skipped, everything else a
    /// file. A unit that fails is reported and the rest still run; the result is false if any
    /// failed. An unreadable file is a fatal error.
    pub fn execute(&self, rt: &mut Runtime) -> Result<bool, ShellError> {
        let state = rt.embedder_data::<ShellState>();
        let mut ok = true;
        let mut tokens = self.tokens.iter();
        while let Some(token) = tokens.next() {
            if token == "-e" {
                let Some(source) = tokens.next() else {
                    break;
                };
                ok &= execute_string(rt, source, "unnamed", false, true);
            } else if token.starts_with('-') {
                continue;
            } else {
                let text = read_text(state.as_ref().map(|s| &s.lock), token).map_err(|source| {
                    ShellError::Read {
                        path: token.clone(),
                        source,
                    }
                })?;
                ok &= execute_string(rt, &text, token, false, true);
            }
        }
        Ok(ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(tokens: &[&str]) -> SourceGroup {
        SourceGroup::new(tokens.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn units() {
        assert!(!group(&[]).has_units());
        assert!(!group(&["--shell", "-e"]).has_units());
        assert!(group(&["-e", "1"]).has_units());
        assert!(group(&["a.js"]).has_units());
    }
}
