mod common;
use common::*;
use edubasic::lang::ast::*;

fn throw(message: &str) -> Statement {
    Statement::Throw(string(message))
}

#[test]
fn test_catch_binds_description() {
    let out = exec(vec![
        Statement::Try,
        set("x%", div(int(1), int(0))),
        print(vec![string("unreached")]),
        Statement::Catch(Some("e$".into())),
        print(vec![string("caught "), var("e$")]),
        Statement::EndTry,
        print(vec![string("after")]),
    ]);
    assert_eq!(out, "caught DIVISION BY ZERO\nafter\n");
}

#[test]
fn test_clean_body_skips_catch_runs_finally() {
    let out = exec(vec![
        Statement::Try,
        print(vec![string("body")]),
        Statement::Catch(None),
        print(vec![string("catch")]),
        Statement::Finally,
        print(vec![string("finally")]),
        Statement::EndTry,
    ]);
    assert_eq!(out, "body\nfinally\n");
}

#[test]
fn test_catch_then_finally() {
    let out = exec(vec![
        Statement::Try,
        throw("oops"),
        Statement::Catch(Some("e$".into())),
        print(vec![var("e$")]),
        Statement::Finally,
        print(vec![string("finally")]),
        Statement::EndTry,
    ]);
    assert_eq!(out, "oops\nfinally\n");
}

#[test]
fn test_finally_reraises() {
    let out = exec(vec![
        Statement::Try,
        throw("boom"),
        Statement::Finally,
        print(vec![string("cleanup")]),
        Statement::EndTry,
        print(vec![string("never")]),
    ]);
    assert_eq!(out, "cleanup\n?UNHANDLED EXCEPTION IN LINE 2; boom\n");
}

#[test]
fn test_error_in_catch_goes_to_finally() {
    let out = exec(vec![
        Statement::Try,
        throw("a"),
        Statement::Catch(Some("e$".into())),
        throw("b"),
        Statement::Finally,
        print(vec![string("f")]),
        Statement::EndTry,
    ]);
    assert_eq!(out, "f\n?UNHANDLED EXCEPTION IN LINE 4; b\n");
}

#[test]
fn test_nested_try_rethrow() {
    let out = exec(vec![
        Statement::Try,
        Statement::Try,
        throw("inner"),
        Statement::Catch(Some("e$".into())),
        Statement::Throw(add(string("re: "), var("e$"))),
        Statement::EndTry,
        Statement::Catch(Some("f$".into())),
        print(vec![var("f$")]),
        Statement::EndTry,
    ]);
    assert_eq!(out, "re: inner\n");
}

#[test]
fn test_structural_errors_are_not_caught() {
    let out = exec(vec![
        Statement::Try,
        goto("nowhere"),
        Statement::Catch(None),
        print(vec![string("x")]),
        Statement::EndTry,
    ]);
    assert_eq!(out, "?UNDEFINED LABEL IN LINE 2; Label 'nowhere' not found\n");
}

#[test]
fn test_error_unwinds_calls() {
    let (mut r, t) = runtime(vec![
        Statement::Sub("Deep".into(), vec![param("n%", false)]),
        Statement::If(gt(var("n%"), int(0))),
        Statement::Call("Deep".into(), vec![sub(var("n%"), int(1))]),
        Statement::Else,
        throw("bottom"),
        Statement::EndIf,
        Statement::EndSub,
        Statement::Try,
        Statement::Call("Deep".into(), vec![int(3)]),
        Statement::Catch(Some("e$".into())),
        print(vec![var("e$")]),
        Statement::EndTry,
    ]);
    assert_eq!(exec_runtime(&mut r, &t), "bottom\n");
    assert_eq!(r.context().depth(), 0);
    assert!(r.frames().is_empty());
}

#[test]
fn test_throw_number() {
    let out = exec(vec![
        Statement::Try,
        Statement::Throw(int(42)),
        Statement::Catch(Some("e$".into())),
        print(vec![var("e$")]),
        Statement::EndTry,
    ]);
    assert_eq!(out, "42\n");
}

#[test]
fn test_uncaught_throw() {
    let out = exec(vec![print(vec![string("a")]), throw("bye")]);
    assert_eq!(out, "a\n?UNHANDLED EXCEPTION IN LINE 2; bye\n");
}

#[test]
fn test_try_without_end_try() {
    let out = exec(vec![Statement::Try, print(vec![string("x")])]);
    assert_eq!(out, "?TRY WITHOUT END TRY IN LINE 1\n");
}

#[test]
fn test_goto_out_of_try_leaves_it() {
    let (mut r, t) = runtime(vec![
        Statement::Try,
        goto("out"),
        Statement::Catch(Some("e$".into())),
        print(vec![add(string("caught: "), var("e$"))]),
        Statement::EndTry,
        label("out"),
        throw("boom"),
    ]);
    assert_eq!(
        exec_runtime(&mut r, &t),
        "?UNHANDLED EXCEPTION IN LINE 7; boom\n"
    );
    assert!(r.frames().is_empty());
}

#[test]
fn test_goto_out_of_inner_try_reaches_outer() {
    let out = exec(vec![
        Statement::Try,
        Statement::Try,
        goto("out"),
        Statement::Catch(Some("e$".into())),
        print(vec![add(string("inner "), var("e$"))]),
        Statement::EndTry,
        label("out"),
        throw("boom"),
        Statement::Catch(Some("e$".into())),
        print(vec![add(string("outer "), var("e$"))]),
        Statement::EndTry,
    ]);
    assert_eq!(out, "outer boom\n");
}
