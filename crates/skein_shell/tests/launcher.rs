use skein_shell::{Launcher, ShellOptions};

fn launch(args: &[&str]) -> bool {
    let options = ShellOptions::parse(args.iter().copied()).unwrap();
    Launcher::new(options).run().unwrap()
}

#[test]
fn single_group_success() {
    assert!(launch(&["--test", "-e", "var a = 1;"]));
}

#[test]
fn isolated_groups_all_contribute() {
    assert!(launch(&["--test", "-e", "1", "--isolate", "-e", "2", "--isolate", "-e", "3"]));
    assert!(!launch(&["--test", "-e", "1", "--isolate", "-e", "throw 'worker'"]));
    assert!(!launch(&["--test", "-e", "throw 'main'", "--isolate", "-e", "1"]));
}

#[test]
fn groups_do_not_share_globals() {
    assert!(!launch(&[
        "--test",
        "-e",
        "var only = 1;",
        "--isolate",
        "-e",
        "if (typeof only !== 'undefined') throw 'leaked';",
        "-e",
        "only;",
    ]));
}

#[test]
fn stress_runs_use_fresh_instances() {
    let src = "if (typeof seen !== 'undefined') throw 'stale'; var seen = 1;";
    assert!(launch(&["--test", "--stress-runs", "3", "-e", src, "--isolate", "-e", src]));
    assert!(!launch(&["--test", "--stress-runs=2", "--isolate", "-e", "throw 'x'"]));
}

#[test]
fn idle_notifications_between_runs() {
    assert!(launch(&[
        "--test",
        "--send-idle-notification",
        "--stress-runs",
        "2",
        "-e",
        "new ArrayBuffer(64);",
    ]));
}

#[test]
fn slow_workers_run_every_repetition() {
    let slow = "var s = 0; for (var i = 0; i < 2000; i++) { s += i; }";
    for _ in 0..25 {
        assert!(launch(&["--test", "--stress-runs", "2", "-e", "1", "--isolate", "-e", slow]));
    }
    assert!(launch(&[
        "--test",
        "--stress-runs",
        "4",
        "-e",
        "1",
        "--isolate",
        "-e",
        slow,
        "--isolate",
        "-e",
        slow,
    ]));
}

#[test]
fn failed_run_stops_idle_workers() {
    let slow = "var s = 0; for (var i = 0; i < 2000; i++) { s += i; }";
    assert!(!launch(&["--test", "--stress-runs", "3", "-e", "throw 'main'", "--isolate", "-e", slow]));
}
