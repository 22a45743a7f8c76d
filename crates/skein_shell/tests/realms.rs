mod common;

use common::{eval, shell, thrown};

#[test]
fn globals_persist_across_units_of_one_realm() {
    let (mut sh, out) = shell();
    eval(&mut sh, &out, "globalThis.x = 1;");
    assert_eq!(eval(&mut sh, &out, "x"), "1");
    assert_eq!(eval(&mut sh, &out, "Realm.current()"), "0");
    assert_eq!(sh.realm_count(), 1);
}

#[test]
fn created_realms_are_isolated() {
    let (mut sh, out) = shell();
    eval(&mut sh, &out, "var x = 'outer';");
    assert_eq!(eval(&mut sh, &out, "var r = Realm.create(); r"), "1");
    assert_eq!(eval(&mut sh, &out, "Realm.eval(r, 'typeof x')"), "undefined");
    assert_eq!(eval(&mut sh, &out, "Realm.eval(r, 'typeof print')"), "function");
    assert_eq!(eval(&mut sh, &out, "Realm.global(r).y = 5; Realm.eval(r, 'y')"), "5");
    assert_eq!(eval(&mut sh, &out, "typeof y"), "undefined");
    assert_eq!(eval(&mut sh, &out, "Realm.eval(r, 'Realm.current()')"), "1");
    assert_eq!(eval(&mut sh, &out, "Realm.global(0) === globalThis"), "true");
    assert_eq!(sh.realm_count(), 2);
}

#[test]
fn switch_takes_effect_at_the_next_unit() {
    let (mut sh, out) = shell();
    eval(&mut sh, &out, "var x = 1;");
    assert_eq!(eval(&mut sh, &out, "Realm.switch(Realm.create()); Realm.current()"), "0");
    assert_eq!(eval(&mut sh, &out, "Realm.current()"), "1");
    assert_eq!(eval(&mut sh, &out, "typeof x"), "undefined");
    eval(&mut sh, &out, "Realm.switch(0);");
    assert_eq!(eval(&mut sh, &out, "x"), "1");
}

#[test]
fn dispose_rules() {
    let (mut sh, out) = shell();
    eval(&mut sh, &out, "var a = Realm.create(), b = Realm.create();");
    assert_eq!(thrown(&mut sh, &out, "Realm.dispose(0)"), "Invalid realm index");
    assert_eq!(thrown(&mut sh, &out, "Realm.dispose(9)"), "Invalid realm index");
    assert_eq!(thrown(&mut sh, &out, "Realm.switch(b); Realm.dispose(b)"), "Invalid realm index");
    eval(&mut sh, &out, "Realm.switch(0);");

    eval(&mut sh, &out, "Realm.dispose(a);");
    assert_eq!(thrown(&mut sh, &out, "Realm.global(a)"), "Invalid realm index");
    assert_eq!(thrown(&mut sh, &out, "Realm.eval(a, '1')"), "Invalid realm index");
    assert_eq!(thrown(&mut sh, &out, "Realm.dispose(a)"), "Invalid realm index");
    assert_eq!(eval(&mut sh, &out, "Realm.create()"), "3");
    assert_eq!(eval(&mut sh, &out, "Realm.eval(b, '2 + 2')"), "4");
}

#[test]
fn arguments_are_checked() {
    let (mut sh, out) = shell();
    let cases = [
        "Realm.global('0')",
        "Realm.dispose()",
        "Realm.switch({})",
        "Realm.owner(1)",
        "Realm.eval(0, 1)",
        "Realm.eval(0)",
    ];
    for src in cases {
        assert_eq!(thrown(&mut sh, &out, src), "Invalid argument", "{src}");
    }
}

#[test]
fn owner_follows_the_creating_realm() {
    let (mut sh, out) = shell();
    eval(&mut sh, &out, "var r = Realm.create();");
    assert_eq!(eval(&mut sh, &out, "Realm.owner({})"), "0");
    assert_eq!(eval(&mut sh, &out, "Realm.owner(Realm.eval(r, '[]'))"), "1");
    assert_eq!(eval(&mut sh, &out, "Realm.owner(Realm.global(r))"), "1");
}

#[test]
fn shared_slot_is_visible_from_every_realm() {
    let (mut sh, out) = shell();
    assert_eq!(eval(&mut sh, &out, "typeof Realm.shared"), "undefined");
    eval(&mut sh, &out, "var r = Realm.create(); Realm.shared = { a: 1 };");
    assert_eq!(eval(&mut sh, &out, "Realm.eval(r, 'Realm.shared.a')"), "1");
    eval(&mut sh, &out, "Realm.eval(r, 'Realm.shared = 7');");
    assert_eq!(eval(&mut sh, &out, "Realm.shared"), "7");
}

#[test]
fn eval_failures() {
    let (mut sh, out) = shell();
    eval(&mut sh, &out, "var r = Realm.create();");
    assert_eq!(eval(&mut sh, &out, "Realm.eval(r, 'var = ;') === undefined"), "true");
    assert_eq!(thrown(&mut sh, &out, "Realm.eval(r, \"throw 'inner'\")"), "inner");
    assert_eq!(out.contents().lines().count(), 1);
}
