#![allow(dead_code)]

use skein_shell::{CapturedOutput, Input, Instance, Output, ShellOptions};

pub fn shell_with_input(test_shell: bool, input: &str) -> (Instance, CapturedOutput) {
    let out = CapturedOutput::new();
    let opts = ShellOptions {
        test_shell,
        ..ShellOptions::default()
    };
    let input = Input::Reader(Box::new(std::io::Cursor::new(input.as_bytes().to_vec())));
    let instance = Instance::with_io(&opts, Output::Writer(Box::new(out.clone())), input);
    (instance, out)
}

/// A `--test` shell with empty input.
pub fn shell() -> (Instance, CapturedOutput) {
    shell_with_input(true, "")
}

/// Runs `src` with result printing and returns what it printed, final newline trimmed.
pub fn eval(instance: &mut Instance, out: &CapturedOutput, src: &str) -> String {
    out.clear();
    let ok = instance.execute(src, "t.js", true, true);
    let text = out.contents();
    assert!(ok, "`{src}` failed:\n{text}");
    text.strip_suffix('\n').unwrap_or(&text).to_string()
}

/// The value thrown by `src`, caught in script and converted to a string.
pub fn thrown(instance: &mut Instance, out: &CapturedOutput, src: &str) -> String {
    eval(
        instance,
        out,
        &format!("var caught = 'nothing thrown'; try {{ {src}; }} catch (e) {{ caught = String(e); }} caught"),
    )
}
