//! Command-line options.
//!
//! Flags the shell understands are consumed here; what remains is split into one
//! `SourceGroup` per engine instance at every `--isolate`.

use tracing::warn;

use crate::error::ShellError;
use crate::source_group::SourceGroup;

pub const USAGE: &str = "\
Usage: skein [options] [--isolate [options]]...

  <file>                    run a script file
  -e <source>               run inline source
  --isolate                 start a new group, run on its own thread
  --shell                   enter the interactive shell after running scripts
  --test                    print results with plain string conversion
  --stress-runs N           repeat the whole run N times
  --send-idle-notification  release spare memory after each group run
  --help                    print this message

The SKEIN_LOG environment variable sets the log filter (default: warn).";

#[derive(Clone, Debug)]
pub struct ShellOptions {
    pub interactive_shell: bool,
    pub test_shell: bool,
    pub send_idle_notification: bool,
    pub stress_runs: usize,
    pub help: bool,
    /// Always at least one group; group 0 runs on the control thread.
    pub groups: Vec<SourceGroup>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            interactive_shell: false,
            test_shell: false,
            send_idle_notification: false,
            stress_runs: 1,
            help: false,
            groups: vec![SourceGroup::default()],
        }
    }
}

impl ShellOptions {
    /// Parses arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, ShellError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut opts = ShellOptions {
            groups: Vec::new(),
            ..ShellOptions::default()
        };
        let mut current: Vec<String> = Vec::new();

        let mut i = 0;
        while i < argv.len() {
            let a = argv[i].as_str();
            if a == "--isolate" {
                opts.groups.push(SourceGroup::new(std::mem::take(&mut current)));
            } else if a == "-e" {
                current.push(a.to_string());
                if let Some(src) = argv.get(i + 1) {
                    current.push(src.clone());
                    i += 1;
                }
            } else if a == "--shell" {
                opts.interactive_shell = true;
            } else if a == "--test" {
                opts.test_shell = true;
            } else if a == "--send-idle-notification" {
                opts.send_idle_notification = true;
            } else if a == "--help" || a == "-h" {
                opts.help = true;
            } else if a == "-f" {
                // Accepted for compatibility with other standalone engines.
            } else if a == "-p" {
                // Threads sharing one instance would need a runtime that can cross threads.
                return Err(ShellError::InvalidOption {
                    option: a.to_string(),
                    reason: "parallel list files are not supported; use --isolate".into(),
                });
            } else if a == "--stress-runs" {
                let value = argv.get(i + 1).ok_or_else(|| ShellError::InvalidOption {
                    option: a.to_string(),
                    reason: "missing value".into(),
                })?;
                opts.stress_runs = parse_runs(value)?;
                i += 1;
            } else if let Some(value) = a.strip_prefix("--stress-runs=") {
                opts.stress_runs = parse_runs(value)?;
            } else if a.starts_with("--") {
                warn!(flag = a, "unknown flag ignored");
            } else {
                current.push(a.to_string());
            }
            i += 1;
        }
        opts.groups.push(SourceGroup::new(current));
        Ok(opts)
    }

    /// Whether any group has a script to run.
    pub fn has_sources(&self) -> bool {
        self.groups.iter().any(SourceGroup::has_units)
    }
}

fn parse_runs(value: &str) -> Result<usize, ShellError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ShellError::InvalidOption {
            option: "--stress-runs".into(),
            reason: format!("expected a positive integer, got '{value}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn parse(args: &[&str]) -> ShellOptions {
        ShellOptions::parse(args.iter().copied()).unwrap()
    }

    #[test]
    fn defaults() {
        let o = parse(&[]);
        assert_eq!(o.stress_runs, 1);
        assert!(!o.interactive_shell && !o.test_shell && !o.send_idle_notification);
        assert_eq!(o.groups.len(), 1);
        assert!(!o.has_sources());
    }

    #[test]
    fn flags_are_consumed() {
        let o = parse(&["--shell", "--test", "-f", "a.js", "--stress-runs", "3", "--bogus"]);
        assert!(o.interactive_shell && o.test_shell);
        assert_eq!(o.stress_runs, 3);
        assert_eq!(o.groups[0].tokens(), ["a.js"]);
        assert_eq!(parse(&["--stress-runs=2"]).stress_runs, 2);
    }

    #[test]
    fn isolate_splits_groups() {
        let o = parse(&["a.js", "--isolate", "-e", "1", "--isolate"]);
        assert_eq!(o.groups.len(), 3);
        assert_eq!(o.groups[0].tokens(), ["a.js"]);
        assert_eq!(o.groups[1].tokens(), ["-e", "1"]);
        assert!(o.groups[2].tokens().is_empty());
    }

    #[test]
    fn inline_source_may_look_like_a_flag() {
        let o = parse(&["-e", "--isolate"]);
        assert_eq!(o.groups.len(), 1);
        assert_eq!(o.groups[0].tokens(), ["-e", "--isolate"]);
    }

    #[test]
    fn bad_stress_runs() {
        assert!(ShellOptions::parse(["--stress-runs", "0"]).is_err());
        assert!(ShellOptions::parse(["--stress-runs"]).is_err());
        assert!(ShellOptions::parse(["--stress-runs=x"]).is_err());
    }

    #[test]
    fn parallel_list_file_is_rejected() {
        let err = ShellOptions::parse(["-p", "list.txt"]).unwrap_err();
        assert!(matches!(&err, ShellError::InvalidOption { option, .. } if option == "-p"));
        assert!(err.to_string().contains("use --isolate"), "{err}");
        // Inline source is never taken for the flag.
        assert_eq!(parse(&["-e", "-p"]).groups[0].tokens(), ["-e", "-p"]);
    }

    proptest! {
        #[test]
        fn groups_partition_plain_tokens(parts in prop::collection::vec(prop::collection::vec("[a-z]{1,6}\\.js", 0..4), 1..5)) {
            let mut argv = Vec::new();
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    argv.push("--isolate".to_string());
                }
                argv.extend(part.iter().cloned());
            }
            let o = ShellOptions::parse(argv).unwrap();
            prop_assert_eq!(o.groups.len(), parts.len());
            for (group, part) in o.groups.iter().zip(&parts) {
                prop_assert_eq!(group.tokens(), part.as_slice());
            }
        }
    }
}
