mod common;
use common::*;
use edubasic::lang::ast::*;
use edubasic::mach::Val;

fn eval(expr: Expression) -> String {
    exec(vec![print(vec![expr])])
}

fn f(name: &str, args: Vec<Expression>) -> Expression {
    call_fn(name, args)
}

#[test]
fn test_math() {
    assert_eq!(eval(f("ABS", vec![int(-3)])), "3\n");
    assert_eq!(eval(f("SGN", vec![real(-0.5)])), "-1\n");
    assert_eq!(eval(f("INT", vec![real(-2.5)])), "-3\n");
    assert_eq!(eval(f("FIX", vec![real(-2.5)])), "-2\n");
    assert_eq!(eval(f("ROUND", vec![real(2.346), int(2)])), "2.35\n");
    assert_eq!(eval(f("SQRT", vec![int(16)])), "4\n");
    assert_eq!(eval(f("LOG", vec![int(0)])), "-Infinity\n");
    assert_eq!(eval(f("EXP", vec![int(0)])), "1\n");
}

#[test]
fn test_negative_roots_go_complex() {
    assert_eq!(eval(f("SQRT", vec![int(-4)])), "0+2i\n");
    let out = eval(f("IMAG", vec![f("LOG", vec![int(-1)])]));
    assert!(out.starts_with("3.14159"), "{}", out);
}

#[test]
fn test_complex_parts() {
    let z = add(int(3), Expression::Imaginary(4.0));
    assert_eq!(eval(f("ABS", vec![z.clone()])), "5\n");
    assert_eq!(eval(f("REAL", vec![z.clone()])), "3\n");
    assert_eq!(eval(f("CONJ", vec![z])), "3-4i\n");
}

#[test]
fn test_strings() {
    let s = || string("Hello, World");
    assert_eq!(eval(f("LEN", vec![s()])), "12\n");
    assert_eq!(eval(f("LEFT$", vec![s(), int(5)])), "Hello\n");
    assert_eq!(eval(f("RIGHT$", vec![s(), int(5)])), "World\n");
    assert_eq!(eval(f("MID$", vec![s(), int(8), int(3)])), "Wor\n");
    assert_eq!(eval(f("MID$", vec![s(), int(8)])), "World\n");
    assert_eq!(eval(f("INSTR", vec![s(), string("o")])), "5\n");
    assert_eq!(eval(f("INSTR", vec![s(), string("o"), int(6)])), "9\n");
    assert_eq!(eval(f("INSTR", vec![s(), string("z")])), "0\n");
    assert_eq!(eval(f("UCASE$", vec![s()])), "HELLO, WORLD\n");
    assert_eq!(eval(f("TRIM$", vec![string("  x  ")])), "x\n");
    assert_eq!(eval(f("CHR$", vec![int(65)])), "A\n");
    assert_eq!(eval(f("ASC", vec![string("a")])), "97\n");
    assert_eq!(eval(f("STR$", vec![real(1.5)])), "1.5\n");
}

#[test]
fn test_val() {
    assert_eq!(eval(f("VAL", vec![string("42")])), "42\n");
    assert_eq!(eval(f("VAL", vec![string(" 3.5kg")])), "3.5\n");
    assert_eq!(eval(f("VAL", vec![string("abc")])), "0\n");
}

#[test]
fn test_function_names_ignore_case() {
    assert_eq!(eval(f("len", vec![string("abc")])), "3\n");
}

#[test]
fn test_unknown_function() {
    assert_eq!(
        eval(f("FROB", vec![])),
        "?ILLEGAL FUNCTION CALL IN LINE 1; Unknown function FROB\n"
    );
}

#[test]
fn test_wrong_arity() {
    assert_eq!(
        eval(f("LEFT$", vec![string("a")])),
        "?WRONG NUMBER OF ARGUMENTS IN LINE 1; LEFT$ expects 2 to 2 arguments\n"
    );
}

#[test]
fn test_string_function_rejects_number() {
    assert_eq!(
        eval(f("UCASE$", vec![int(1)])),
        "?TYPE MISMATCH IN LINE 1; Expected STRING, got INTEGER\n"
    );
}

#[test]
fn test_rnd_is_seeded() {
    let program = || {
        vec![
            Statement::Randomize(Some(int(7))),
            set("a#", f("RND", vec![])),
            set("b#", f("RND", vec![])),
        ]
    };
    let (mut r1, t1) = runtime(program());
    let (mut r2, t2) = runtime(program());
    exec_runtime(&mut r1, &t1);
    exec_runtime(&mut r2, &t2);
    let a = r1.context_mut().get("a#");
    assert_eq!(a, r2.context_mut().get("a#"));
    assert_ne!(a, r1.context_mut().get("b#"));
    match a {
        Val::Real(n) => assert!((0.0..1.0).contains(&n)),
        v => panic!("{:?}", v),
    }
}

#[test]
fn test_keyboard() {
    let (mut r, t) = runtime(vec![print(vec![
        f("INKEY$", vec![]),
        string(" "),
        f("KEYDOWN", vec![string("Space")]),
        string(" "),
        f("KEYDOWN", vec![string("Enter")]),
    ])]);
    r.context_mut().keys_mut().press("Space");
    assert_eq!(exec_runtime(&mut r, &t), "Space -1 0\n");
}

#[test]
fn test_clock_functions() {
    let (mut r, t) = runtime(vec![
        set("t#", f("TIMER", vec![])),
        set("d$", f("DATE$", vec![])),
        set("h$", f("TIME$", vec![])),
    ]);
    assert_eq!(exec_runtime(&mut r, &t), "");
    match r.context_mut().get("t#") {
        Val::Real(n) => assert!((0.0..86401.0).contains(&n)),
        v => panic!("{:?}", v),
    }
    match r.context_mut().get("d$") {
        Val::String(s) => assert_eq!(s.len(), 10),
        v => panic!("{:?}", v),
    }
    match r.context_mut().get("h$") {
        Val::String(s) => assert_eq!(s.matches(':').count(), 2),
        v => panic!("{:?}", v),
    }
}
