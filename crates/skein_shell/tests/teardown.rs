//! Kept in its own test binary: the external-memory counter is process-wide.

mod common;

use common::{eval, shell};

#[test]
fn dropping_an_instance_releases_every_buffer() {
    let before = skein_core::external_memory();
    {
        let (mut sh, out) = shell();
        eval(&mut sh, &out, "var keep = new ArrayBuffer(4000); var view = new Int32Array(keep);");
        eval(
            &mut sh,
            &out,
            "function g() { var buf = new ArrayBuffer(64); function h() { return buf; } return h; } var held = g();",
        );
        eval(&mut sh, &out, "(function () { var a = new ArrayBuffer(32); a.self = a; })()");
        eval(&mut sh, &out, "Realm.shared = new ArrayBuffer(8); Realm.create();");
        assert_eq!(skein_core::external_memory() - before, 4104);
    }
    assert_eq!(skein_core::external_memory(), before);
}
