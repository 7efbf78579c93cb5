mod common;
use common::*;
use edubasic::lang::ast::*;
use edubasic::mach::Val;

#[test]
fn test_goto_skips_lines() {
    let (mut r, t) = runtime(vec![
        goto("L"),
        set("x%", int(1)),
        label("L"),
        set("x%", int(2)),
        Statement::End,
    ]);
    assert_eq!(exec_runtime(&mut r, &t), "");
    assert_eq!(r.context_mut().get("x%"), Val::Integer(2));
}

#[test]
fn test_labels_ignore_case() {
    let out = exec(vec![
        goto("FINISH"),
        print(vec![string("skipped")]),
        label("finish"),
        print(vec![string("done")]),
    ]);
    assert_eq!(out, "done\n");
}

#[test]
fn test_undefined_label() {
    let out = exec(vec![goto("nowhere")]);
    assert_eq!(out, "?UNDEFINED LABEL IN LINE 1; Label 'nowhere' not found\n");
}

#[test]
fn test_end_stops() {
    let out = exec(vec![
        print(vec![string("a")]),
        Statement::End,
        print(vec![string("b")]),
    ]);
    assert_eq!(out, "a\n");
}

#[test]
fn test_gosub_return() {
    let out = exec(vec![
        Statement::Gosub("greet".into()),
        print(vec![string("back")]),
        Statement::Gosub("greet".into()),
        Statement::End,
        label("greet"),
        print(vec![string("hi")]),
        Statement::Return,
    ]);
    assert_eq!(out, "hi\nback\nhi\n");
}

#[test]
fn test_return_without_gosub_ends() {
    let out = exec(vec![
        print(vec![string("a")]),
        Statement::Return,
        print(vec![string("b")]),
    ]);
    assert_eq!(out, "a\n");
}

fn double_sub() -> Vec<Statement> {
    vec![
        Statement::Sub(
            "Double".into(),
            vec![param("x%", false), param("out%", true)],
        ),
        set("out%", mul(var("x%"), int(2))),
        Statement::EndSub,
    ]
}

#[test]
fn test_call_byref_writes_back() {
    let mut program = double_sub();
    program.push(Statement::Call("double".into(), vec![int(21), var("r%")]));
    program.push(print(vec![var("r%")]));
    assert_eq!(exec(program), "42\n");
}

#[test]
fn test_byref_given_expression_gets_copy() {
    let mut program = double_sub();
    program.push(Statement::Call(
        "Double".into(),
        vec![int(21), add(var("r%"), int(0))],
    ));
    program.push(print(vec![var("r%")]));
    assert_eq!(exec(program), "0\n");
}

#[test]
fn test_by_value_parameter_is_local() {
    let out = exec(vec![
        Statement::Sub("Clobber".into(), vec![param("x%", false)]),
        set("x%", int(100)),
        print(vec![var("x%")]),
        Statement::EndSub,
        set("x%", int(1)),
        Statement::Call("Clobber".into(), vec![var("x%")]),
        print(vec![var("x%")]),
    ]);
    assert_eq!(out, "100\n1\n");
}

#[test]
fn test_local_variables() {
    let out = exec(vec![
        Statement::Sub("Scratch".into(), vec![]),
        Statement::Local("t%".into(), Some(int(9))),
        print(vec![var("t%")]),
        Statement::EndSub,
        Statement::Call("Scratch".into(), vec![]),
        print(vec![var("t%")]),
    ]);
    assert_eq!(out, "9\n0\n");
}

#[test]
fn test_recursive_byref_chain() {
    let out = exec(vec![
        Statement::Sub(
            "Fact".into(),
            vec![param("n%", false), param("acc%", true)],
        ),
        Statement::If(gt(var("n%"), int(1))),
        set("acc%", mul(var("acc%"), var("n%"))),
        Statement::Call("Fact".into(), vec![sub(var("n%"), int(1)), var("acc%")]),
        Statement::EndIf,
        Statement::EndSub,
        set("acc%", int(1)),
        Statement::Call("Fact".into(), vec![int(5), var("acc%")]),
        print(vec![var("acc%")]),
    ]);
    assert_eq!(out, "120\n");
}

#[test]
fn test_exit_sub() {
    let out = exec(vec![
        Statement::Sub("Early".into(), vec![]),
        print(vec![string("a")]),
        Statement::Exit(Block::Sub, None),
        print(vec![string("b")]),
        Statement::EndSub,
        Statement::Call("Early".into(), vec![]),
        print(vec![string("c")]),
    ]);
    assert_eq!(out, "a\nc\n");
}

#[test]
fn test_undefined_sub() {
    let out = exec(vec![Statement::Call("Nope".into(), vec![])]);
    assert_eq!(out, "?UNDEFINED SUB IN LINE 1; SUB Nope not defined\n");
}

#[test]
fn test_wrong_argument_count() {
    let mut program = double_sub();
    program.push(Statement::Call("Double".into(), vec![int(1)]));
    assert_eq!(
        exec(program),
        "?WRONG NUMBER OF ARGUMENTS IN LINE 4; Double expects 2 arguments, got 1\n"
    );
}

#[test]
fn test_runaway_recursion() {
    let out = exec(vec![
        Statement::Sub("Forever".into(), vec![]),
        Statement::Call("Forever".into(), vec![]),
        Statement::EndSub,
        Statement::Call("Forever".into(), vec![]),
    ]);
    assert!(out.starts_with("?OUT OF MEMORY IN LINE 2"), "{}", out);
}
