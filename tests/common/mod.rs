#![allow(dead_code)]
use edubasic::host::{Host, TextGraphics};
use edubasic::lang::ast::*;
use edubasic::mach::{Event, Program, Runtime};
use std::cell::RefCell;
use std::rc::Rc;

/// Runtime with a text transcript the tests can read back.
pub fn runtime(statements: Vec<Statement>) -> (Runtime, Rc<RefCell<String>>) {
    runtime_with(statements, Host::new())
}

pub fn runtime_with(statements: Vec<Statement>, host: Host) -> (Runtime, Rc<RefCell<String>>) {
    let graphics = TextGraphics::new();
    let transcript = graphics.transcript();
    let host = host.with_graphics(graphics);
    let runtime = Runtime::new(Program::from_statements(statements))
        .with_host(host)
        .with_seed(1);
    (runtime, transcript)
}

pub fn exec(statements: Vec<Statement>) -> String {
    let (mut r, transcript) = runtime(statements);
    exec_runtime(&mut r, &transcript)
}

/// Run to completion. Errors are appended to the printed text the
/// way a host would show them.
pub fn exec_runtime(runtime: &mut Runtime, transcript: &Rc<RefCell<String>>) -> String {
    exec_n(runtime, transcript, 5000)
}

pub fn exec_n(runtime: &mut Runtime, transcript: &Rc<RefCell<String>>, cycles: usize) -> String {
    let mut s = String::new();
    let mut prev_running = false;
    loop {
        let event = runtime.execute(cycles);
        s.push_str(&transcript.borrow());
        transcript.borrow_mut().clear();
        match &event {
            Event::Stopped => break,
            Event::Error(error) => {
                s.push_str(&format!("?{}\n", error));
                break;
            }
            Event::Sleeping(_) => runtime.wake(),
            Event::Running => {
                if prev_running {
                    s.push_str(&format!("\n{} Execution cycles exceeded.\n", cycles));
                    break;
                }
            }
        }
        prev_running = event == Event::Running;
    }
    s
}

pub fn int(n: i64) -> Expression {
    Expression::from(n)
}

pub fn real(n: f64) -> Expression {
    Expression::from(n)
}

pub fn string(s: &str) -> Expression {
    Expression::string(s)
}

pub fn var(name: &str) -> Expression {
    Expression::var(name)
}

pub fn add(l: Expression, r: Expression) -> Expression {
    Expression::Add(Box::new(l), Box::new(r))
}

pub fn sub(l: Expression, r: Expression) -> Expression {
    Expression::Subtract(Box::new(l), Box::new(r))
}

pub fn mul(l: Expression, r: Expression) -> Expression {
    Expression::Multiply(Box::new(l), Box::new(r))
}

pub fn div(l: Expression, r: Expression) -> Expression {
    Expression::Divide(Box::new(l), Box::new(r))
}

pub fn eq(l: Expression, r: Expression) -> Expression {
    Expression::Equal(Box::new(l), Box::new(r))
}

pub fn lt(l: Expression, r: Expression) -> Expression {
    Expression::Less(Box::new(l), Box::new(r))
}

pub fn gt(l: Expression, r: Expression) -> Expression {
    Expression::Greater(Box::new(l), Box::new(r))
}

pub fn call_fn(name: &str, args: Vec<Expression>) -> Expression {
    Expression::function(name, args)
}

pub fn set(name: &str, expr: Expression) -> Statement {
    Statement::Let(Variable::from(name), expr)
}

/// `name = name + n`
pub fn incr(name: &str, n: i64) -> Statement {
    set(name, add(var(name), int(n)))
}

pub fn print(items: Vec<Expression>) -> Statement {
    Statement::Print(items.into_iter().map(PrintItem::Expression).collect())
}

pub fn label(name: &str) -> Statement {
    Statement::Label(name.into())
}

pub fn goto(name: &str) -> Statement {
    Statement::Goto(name.into())
}

pub fn for_loop(name: &str, from: i64, to: i64, step: Option<i64>) -> Statement {
    Statement::For(name.into(), int(from), int(to), step.map(int))
}

pub fn next() -> Statement {
    Statement::Next(None)
}

pub fn param(name: &str, by_ref: bool) -> Param {
    Param {
        name: name.into(),
        by_ref,
    }
}
