mod common;
use common::*;
use edubasic::lang::ast::*;
use edubasic::mach::Val;

fn grade(score: i64) -> Vec<Statement> {
    vec![
        set("s%", int(score)),
        Statement::If(lt(var("s%"), int(50))),
        print(vec![string("fail")]),
        Statement::ElseIf(lt(var("s%"), int(80))),
        print(vec![string("pass")]),
        Statement::ElseIf(lt(var("s%"), int(101))),
        print(vec![string("merit")]),
        Statement::Else,
        print(vec![string("impossible")]),
        Statement::EndIf,
        print(vec![string("end")]),
    ]
}

#[test]
fn test_if_chain() {
    assert_eq!(exec(grade(10)), "fail\nend\n");
    assert_eq!(exec(grade(60)), "pass\nend\n");
    assert_eq!(exec(grade(90)), "merit\nend\n");
    assert_eq!(exec(grade(500)), "impossible\nend\n");
}

#[test]
fn test_if_without_else() {
    let out = exec(vec![
        Statement::If(eq(int(1), int(2))),
        print(vec![string("no")]),
        Statement::EndIf,
        print(vec![string("yes")]),
    ]);
    assert_eq!(out, "yes\n");
}

#[test]
fn test_nested_if() {
    let out = exec(vec![
        set("a%", int(1)),
        set("b%", int(0)),
        Statement::If(var("a%")),
        Statement::If(var("b%")),
        print(vec![string("both")]),
        Statement::Else,
        print(vec![string("only a")]),
        Statement::EndIf,
        Statement::Else,
        print(vec![string("not a")]),
        Statement::EndIf,
    ]);
    assert_eq!(out, "only a\n");
}

#[test]
fn test_unless() {
    let out = exec(vec![
        Statement::Unless(eq(int(1), int(2))),
        print(vec![string("ran")]),
        Statement::Else,
        print(vec![string("skipped")]),
        Statement::EndUnless,
    ]);
    assert_eq!(out, "ran\n");
}

#[test]
fn test_condition_must_be_integer() {
    let out = exec(vec![Statement::If(real(1.0)), Statement::EndIf]);
    assert_eq!(
        out,
        "?TYPE MISMATCH IN LINE 1; Condition must be INTEGER, got REAL\n"
    );
}

#[test]
fn test_if_without_end_if() {
    let out = exec(vec![Statement::If(int(1)), print(vec![string("x")])]);
    assert_eq!(out, "?IF WITHOUT END IF IN LINE 1\n");
}

#[test]
fn test_stray_end_if_is_tolerated() {
    let out = exec(vec![Statement::EndIf, print(vec![string("ok")])]);
    assert_eq!(out, "ok\n");
}

fn select(value: Expression, op: &str) -> Vec<Statement> {
    vec![
        Statement::SelectCase(value),
        Statement::Case(vec![CaseTest::Value(vec![int(1)])]),
        set("r%", int(10)),
        Statement::Case(vec![CaseTest::Range(int(2), int(7))]),
        set("r%", int(20)),
        Statement::Case(vec![CaseTest::Relational(op.into(), int(99))]),
        set("r%", int(30)),
        Statement::Case(vec![CaseTest::Else]),
        set("r%", int(40)),
        Statement::EndSelect,
    ]
}

fn select_result(value: Expression) -> Val {
    let (mut r, t) = runtime(select(value, ">="));
    let out = exec_runtime(&mut r, &t);
    assert_eq!(out, "");
    r.context_mut().get("r%")
}

#[test]
fn test_select_case() {
    assert_eq!(select_result(int(1)), Val::Integer(10));
    assert_eq!(select_result(int(5)), Val::Integer(20));
    assert_eq!(select_result(int(7)), Val::Integer(20));
    assert_eq!(select_result(int(100)), Val::Integer(30));
    assert_eq!(select_result(int(50)), Val::Integer(40));
    assert_eq!(select_result(real(2.5)), Val::Integer(20));
}

#[test]
fn test_select_first_match_only() {
    let out = exec(vec![
        Statement::SelectCase(string("b")),
        Statement::Case(vec![CaseTest::Value(vec![string("a"), string("b")])]),
        print(vec![string("first")]),
        Statement::Case(vec![CaseTest::Value(vec![string("b")])]),
        print(vec![string("second")]),
        Statement::EndSelect,
        print(vec![string("after")]),
    ]);
    assert_eq!(out, "first\nafter\n");
}

#[test]
fn test_select_unknown_operator() {
    let out = exec(select(int(100), "=>"));
    assert_eq!(
        out,
        "?UNKNOWN OPERATOR IN LINE 6; Unknown CASE operator '=>'\n"
    );
}

#[test]
fn test_case_without_select() {
    let out = exec(vec![Statement::Case(vec![CaseTest::Else])]);
    assert_eq!(out, "?CASE WITHOUT SELECT IN LINE 1\n");
}
