//! Top-level execution of one source unit, and failure reports.

use skein_runtime::{CompileError, Context, Exception, Runtime, Value, inspect};
use skein_syntax::render_at;
use tracing::trace;

use crate::instance::ShellState;

/// Compiles and runs `source` in the current realm, then commits any pending realm switch.
///
/// Returns false when compilation fails or the script throws; the failure is reported on the
/// shell's output when `report` is set. With `print_result`, a result other than `undefined`
/// is printed on its own line.
pub fn execute_string(
    rt: &mut Runtime,
    source: &str,
    name: &str,
    print_result: bool,
    report: bool,
) -> bool {
    let Some(state) = rt.embedder_data::<ShellState>() else {
        return false;
    };
    state.executed.set(true);

    let script = match rt.compile(source, name) {
        Ok(script) => script,
        Err(err) => {
            if report {
                state.emit(&format_compile_error(&err));
            }
            return false;
        }
    };
    let realm = {
        let realms = state.realms.borrow();
        realms.context(realms.current())
    };
    let Ok(ctx) = realm else {
        return false;
    };

    trace!(name, "executing unit");
    let result = rt.run_in(&ctx, &script);
    state.realms.borrow_mut().commit_switch();

    match result {
        Err(ex) => {
            if report {
                let text = format_exception(rt, &ctx, &ex);
                state.emit(&text);
            }
            false
        }
        Ok(value) => {
            if print_result && !value.is_undefined() {
                if let Some(text) = render_result(rt, &ctx, &value, state.test_shell) {
                    state.emit(&text);
                    state.emit("\n");
                }
            }
            true
        }
    }
}

/// `--test` uses plain string conversion; otherwise the inspector. A conversion that throws
/// prints nothing.
fn render_result(rt: &mut Runtime, ctx: &Context, value: &Value, test_shell: bool) -> Option<String> {
    rt.enter_context(ctx);
    let text = if test_shell {
        rt.to_string(value).map(|s| s.to_string())
    } else {
        inspect(rt, value)
    };
    rt.exit_context();
    text.ok()
}

/// The report for an uncaught exception, trailing blank line included.
pub fn format_exception(rt: &mut Runtime, ctx: &Context, ex: &Exception) -> String {
    rt.enter_context(ctx);
    let text = rt
        .to_string(&ex.value)
        .map(|s| s.to_string())
        .unwrap_or_else(|_| "<string conversion failed>".to_string());
    rt.exit_context();

    let Some((source, span)) = &ex.location else {
        return format!("{text}\n");
    };
    let mut out = render_at(source, *span, &text);
    if let Some(trace) = rt.exception_trace(ex).filter(|t| !t.is_empty()) {
        out.push_str(&trace);
        out.push('\n');
    }
    out.push('\n');
    out
}

pub fn format_compile_error(err: &CompileError) -> String {
    let text = err.to_string();
    match err.span {
        Some(span) => {
            let mut out = render_at(&err.source, span, &text);
            out.push('\n');
            out
        }
        None => format!("{text}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_shape() {
        let mut rt = Runtime::new();
        let err = match rt.compile("var a = 1;\nvar = 2;", "bad.js") {
            Err(e) => e,
            Ok(_) => panic!("expected a syntax error"),
        };
        let text = format_compile_error(&err);
        let lines: Vec<&str> = text.split('\n').collect();
        assert!(lines[0].starts_with("bad.js:2: SyntaxError: "), "{text}");
        assert_eq!(lines[1], "var = 2;");
        assert!(lines[2].trim_start().starts_with('^'));
        assert!(text.ends_with("\n\n"));
    }
}
