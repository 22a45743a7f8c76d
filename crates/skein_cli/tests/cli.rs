use std::path::PathBuf;
use std::process::Output;

use assert_cmd::Command;

fn skein() -> Command {
    let mut cmd = Command::cargo_bin("skein").unwrap();
    cmd.env_remove("SKEIN_LOG");
    cmd
}

fn run_skein(args: &[&str]) -> Output {
    skein().args(args).output().unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn write_script(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn inline_source_prints() {
    let out = run_skein(&["-e", "print(1 + 1, 'x')"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "2 x\n");
}

#[test]
fn runs_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_script(&dir, "a.js", "var n = 20;\n");
    let b = write_script(&dir, "b.js", "print(n + 1);\n");
    let out = run_skein(&[a.to_str().unwrap(), b.to_str().unwrap()]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "21\n");
}

#[test]
fn uncaught_exception_is_reported_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "boom.js", "print('before');\nthrow 'boom';\n");
    let name = path.to_str().unwrap();
    let out = run_skein(&[name, "-e", "print('after')"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        stdout(&out),
        format!("before\n{name}:2: boom\nthrow 'boom';\n^^^^^^^^^^^^\n\nafter\n")
    );
}

#[test]
fn missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.js");
    let out = run_skein(&[missing.to_str().unwrap(), "-e", "print('never')"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Error reading '"), "{}", stderr(&out));
    assert_eq!(stdout(&out), "");
}

#[test]
fn isolated_groups_run_separately() {
    let out = run_skein(&[
        "-e",
        "var g = 'main'; print(g)",
        "--isolate",
        "-e",
        "print(typeof g)",
    ]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("main\n"), "{text}");
    assert!(text.contains("undefined\n"), "{text}");

    let out = run_skein(&["-e", "1", "--isolate", "-e", "throw 'w'"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn stress_runs_print_headers() {
    let out = run_skein(&["--stress-runs", "2", "-e", "print('r')"]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "============ Run 1/2 ============\nr\n============ Run 2/2 ============\nr\n"
    );
}

#[test]
fn quit_exits_with_code() {
    let out = run_skein(&["-e", "write('bye'); quit(3); print('unreached')"]);
    assert_eq!(out.status.code(), Some(3));
    assert_eq!(stdout(&out), "bye");
}

#[test]
fn interactive_shell_reads_stdin() {
    let out = skein().write_stdin("1 + 2\n'a'\n").output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "skein> 3\nskein> \"a\"\nskein> \n");
}

#[test]
fn shell_flag_runs_after_scripts() {
    let out = skein()
        .args(["-e", "var v = 7;", "--shell"])
        .write_stdin("v * 2\n")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "skein> 14\nskein> \n");
}

#[test]
fn test_mode_without_sources_does_nothing() {
    let out = skein().arg("--test").write_stdin("print(1)\n").output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "");
}

#[test]
fn unknown_flags_are_logged_and_ignored() {
    let out = run_skein(&["--no-such-flag", "-e", "print(5)"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "5\n");
    assert!(stderr(&out).contains("unknown flag ignored"), "{}", stderr(&out));
}

#[test]
fn bad_option_value_shows_usage() {
    let out = run_skein(&["--stress-runs", "zero"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Usage: skein"));
}

#[test]
fn help() {
    let out = run_skein(&["--help"]);
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("Usage: skein"));
}

#[test]
fn parallel_list_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "a.js", "print('ran');\n");
    let list = write_script(&dir, "list.txt", &format!("{}\n", script.display()));
    let out = run_skein(&["-p", list.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid value for -p"), "{}", stderr(&out));
    assert_eq!(stdout(&out), "");
}
