mod common;

use common::{eval, shell, thrown};

#[test]
fn array_buffer_is_zeroed_and_sized() {
    let (mut sh, out) = shell();
    assert_eq!(eval(&mut sh, &out, "var b = new ArrayBuffer(8); b.byteLength"), "8");
    assert_eq!(eval(&mut sh, &out, "var u = new Uint8Array(b); u[0] + u[7]"), "0");
    assert_eq!(eval(&mut sh, &out, "ArrayBuffer(3).byteLength"), "3");
    assert_eq!(eval(&mut sh, &out, "b.byteLength = 1; b.byteLength"), "8");
}

#[test]
fn array_buffer_errors() {
    let (mut sh, out) = shell();
    assert_eq!(
        thrown(&mut sh, &out, "new ArrayBuffer()"),
        "ArrayBuffer constructor must have one argument"
    );
    assert_eq!(
        thrown(&mut sh, &out, "new ArrayBuffer(-1)"),
        "Array length must not be negative."
    );
    assert_eq!(
        thrown(&mut sh, &out, "new ArrayBuffer(0x40000000)"),
        "Array length exceeds maximum length."
    );
}

#[test]
fn view_over_other_views_buffer() {
    let (mut sh, out) = shell();
    assert_eq!(
        eval(&mut sh, &out, "new Uint16Array(new Uint8Array([1, 2, 3, 4]).buffer).length"),
        "2"
    );
    let src = "
        var b = new ArrayBuffer(16);
        var v = new Int32Array(b, 4, 2);
        String([v.byteOffset, v.byteLength, v.length, v.BYTES_PER_ELEMENT, v.buffer === b])";
    assert_eq!(eval(&mut sh, &out, src), "4,8,2,4,true");
}

#[test]
fn view_construction_errors() {
    let (mut sh, out) = shell();
    let cases = [
        ("new Uint8Array()", "Array constructor must have at least one argument"),
        ("new Uint16Array(new ArrayBuffer(4), 6)", "byteOffset out of bounds"),
        (
            "new Uint16Array(new ArrayBuffer(4), 1)",
            "byteOffset must be multiple of element size",
        ),
        (
            "new Uint16Array(new ArrayBuffer(5))",
            "buffer size must be multiple of element size",
        ),
        ("new Uint16Array(new ArrayBuffer(4), 2, 2)", "length out of bounds"),
        ("new Float64Array(-3)", "Array length must not be negative."),
    ];
    for (src, expected) in cases {
        assert_eq!(thrown(&mut sh, &out, src), expected, "{src}");
    }
}

#[test]
fn element_coercion() {
    let (mut sh, out) = shell();
    assert_eq!(
        eval(&mut sh, &out, "var c = new Uint8ClampedArray([300, -5, 1.5, 2.5]); [c[0], c[1], c[2], c[3]].join()"),
        "255,0,2,2"
    );
    assert_eq!(eval(&mut sh, &out, "new Int8Array([200])[0]"), "-56");
    assert_eq!(eval(&mut sh, &out, "new Uint32Array([-1])[0]"), "4294967295");
    assert_eq!(eval(&mut sh, &out, "new Int16Array([NaN])[0]"), "0");
    assert_eq!(eval(&mut sh, &out, "new Float32Array([0.5])[0]"), "0.5");
    assert_eq!(eval(&mut sh, &out, "var f = new Float64Array(1); f[0] = '2.25'; f[0]"), "2.25");
    assert_eq!(eval(&mut sh, &out, "var u = new Uint8Array(2); u[5] = 1; u[5]"), "undefined");
}

#[test]
fn per_instance_and_static_properties() {
    let (mut sh, out) = shell();
    assert_eq!(
        eval(&mut sh, &out, "Float64Array.BYTES_PER_ELEMENT + new Int16Array(1).BYTES_PER_ELEMENT"),
        "10"
    );
    assert_eq!(eval(&mut sh, &out, "Uint8Array(3).length"), "3");
    assert_eq!(eval(&mut sh, &out, "var v = new Uint8Array(2); v.length = 9; v.length"), "2");
    assert_eq!(
        eval(&mut sh, &out, "new Uint8Array(1) instanceof Uint8Array && !(new Uint8Array(1) instanceof Int8Array)"),
        "true"
    );
}

#[test]
fn buffer_slice_copies() {
    let (mut sh, out) = shell();
    let src = "
        var u = new Uint8Array([1, 2, 3, 4, 5]);
        var s = u.buffer.slice(-2);
        var t = new Uint8Array(s);
        t[0] = 9;
        String([s.byteLength, t[0], t[1], u[3]])";
    assert_eq!(eval(&mut sh, &out, src), "2,9,5,4");
    assert_eq!(eval(&mut sh, &out, "u.buffer.slice(3, 1).byteLength"), "0");
    assert_eq!(eval(&mut sh, &out, "u.buffer.slice(1, 3) instanceof ArrayBuffer"), "true");
    assert_eq!(
        thrown(&mut sh, &out, "u.buffer.slice()"),
        "'slice' must have at least one argument"
    );
    assert_eq!(
        thrown(&mut sh, &out, "ArrayBuffer.prototype.slice.call({}, 0)"),
        "'slice' invoked on wrong receiver type"
    );
}

#[test]
fn subarray_aliases_both_ways() {
    let (mut sh, out) = shell();
    let src = "
        var v = new Int16Array([1, 2, 3, 4, 5]);
        var s = v.subarray(1, -1);
        s[0] = 20;
        v[3] = 40;
        String([s.length, s.byteOffset, v[1], s[2], s.buffer === v.buffer])";
    assert_eq!(eval(&mut sh, &out, src), "3,2,20,40,true");
    assert_eq!(eval(&mut sh, &out, "v.subarray(4, 2).length"), "0");
    assert_eq!(
        thrown(&mut sh, &out, "v.subarray()"),
        "'subarray' must have at least one argument"
    );
    assert_eq!(
        thrown(&mut sh, &out, "v.subarray.call({}, 0)"),
        "'subarray' invoked on wrong receiver type"
    );
}

#[test]
fn set_from_arrays_and_views() {
    let (mut sh, out) = shell();
    assert_eq!(
        eval(&mut sh, &out, "var d = new Uint8Array(4); d.set([7, 8], 1); [d[0], d[1], d[2], d[3]].join()"),
        "0,7,8,0"
    );
    assert_eq!(
        eval(&mut sh, &out, "var f = new Float32Array([1.5, -2]); var i = new Int8Array(2); i.set(f); [i[0], i[1]].join()"),
        "1,-2"
    );
    assert_eq!(
        thrown(&mut sh, &out, "new Uint8Array(2).set([1, 2, 3])"),
        "offset or source length out of bounds"
    );
    assert_eq!(
        thrown(&mut sh, &out, "new Uint8Array(2).set(5)"),
        "'set' invoked with non-array argument"
    );
    assert_eq!(thrown(&mut sh, &out, "new Uint8Array(2).set()"), "'set' must have at least one argument");
    assert_eq!(
        thrown(&mut sh, &out, "Uint8Array.prototype.set.call([], [])"),
        "'set' invoked on wrong receiver type"
    );
}

#[test]
fn set_within_one_buffer_behaves_like_a_temporary_copy() {
    let (mut sh, out) = shell();
    let same_kind = "
        var u = new Uint8Array([1, 2, 3, 4, 5, 6]);
        u.set(u.subarray(0, 4), 2);
        [u[0], u[1], u[2], u[3], u[4], u[5]].join()";
    assert_eq!(eval(&mut sh, &out, same_kind), "1,2,1,2,3,4");

    let widening = "
        var b = new ArrayBuffer(8);
        var bytes = new Uint8Array(b, 0, 4);
        bytes.set([1, 2, 3, 4]);
        var wide = new Uint16Array(b);
        wide.set(bytes);
        [wide[0], wide[1], wide[2], wide[3]].join()";
    assert_eq!(eval(&mut sh, &out, widening), "1,2,3,4");

    let narrowing = "
        var b = new ArrayBuffer(16);
        var ints = new Int32Array(b);
        ints.set([10, -20, 30, 40]);
        var small = new Int8Array(b, 2, 4);
        small.set(ints);
        [small[0], small[1], small[2], small[3]].join()";
    assert_eq!(eval(&mut sh, &out, narrowing), "10,-20,30,40");
}

#[test]
fn buffers_are_released_when_unreachable() {
    let (mut sh, out) = shell();
    let before = sh.buffer_bytes();
    eval(&mut sh, &out, "var keep = new ArrayBuffer(100);");
    assert_eq!(sh.buffer_bytes(), before + 100);
    eval(&mut sh, &out, "var view = new Uint8Array(keep); keep = undefined;");
    assert_eq!(sh.buffer_bytes(), before + 100);
    eval(&mut sh, &out, "view = undefined;");
    assert_eq!(sh.buffer_bytes(), before);
}

#[test]
fn buffers_captured_by_dead_closures_are_collected() {
    let (mut sh, out) = shell();
    let before = sh.buffer_bytes();
    eval(
        &mut sh,
        &out,
        "function g() { var buf = new ArrayBuffer(1000); function h() { return buf; } return 1; } g();",
    );
    eval(&mut sh, &out, "(function () { var a = new ArrayBuffer(50); a.self = a; })()");
    eval(
        &mut sh,
        &out,
        "var live = (function () { var b = new ArrayBuffer(7); return function () { return b; }; })();",
    );
    assert_eq!(sh.buffer_bytes(), before + 1057);

    assert!(sh.collect_garbage() > 0);
    assert_eq!(sh.buffer_bytes(), before + 7);
    assert_eq!(eval(&mut sh, &out, "live().byteLength"), "7");

    eval(&mut sh, &out, "live = undefined;");
    sh.collect_garbage();
    assert_eq!(sh.buffer_bytes(), before);
}

#[test]
fn views_keep_their_buffer_through_collection() {
    let (mut sh, out) = shell();
    let before = sh.buffer_bytes();
    eval(
        &mut sh,
        &out,
        "var v = (function () { var b = new ArrayBuffer(4); b.me = b; return new Uint8Array(b); })(); v[1] = 9;",
    );
    sh.collect_garbage();
    assert_eq!(sh.buffer_bytes(), before + 4);
    assert_eq!(eval(&mut sh, &out, "v[1] + v.buffer.byteLength"), "13");
}
