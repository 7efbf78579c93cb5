use edubasic::lang::ast::*;
use edubasic::mach::Program;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    edubasic::term::main(demo());
}

fn var(name: &str) -> Box<Expression> {
    Box::new(Expression::var(name))
}

fn int(n: i64) -> Box<Expression> {
    Box::new(Expression::from(n))
}

fn print(items: Vec<Expression>) -> Statement {
    Statement::Print(items.into_iter().map(PrintItem::Expression).collect())
}

fn name(s: &str) -> Rc<str> {
    s.into()
}

/// Squares, a countdown, a SUB with a BYREF result and a caught error.
fn demo() -> Program {
    Program::from_statements(vec![
        Statement::Rem(name("EduBASIC demonstration")),
        print(vec![Expression::string("Squares")]),
        Statement::For(name("i%"), Expression::from(1), Expression::from(5), None),
        print(vec![
            Expression::var("i%"),
            Expression::string(" squared is "),
            Expression::Multiply(var("i%"), var("i%")),
        ]),
        Statement::Next(Some(name("i%"))),
        Statement::Let(Variable::from("n%"), Expression::from(3)),
        Statement::While(Expression::Greater(var("n%"), int(0))),
        print(vec![Expression::var("n%"), Expression::string("...")]),
        Statement::Sleep(Expression::from(0.25)),
        Statement::Let(
            Variable::from("n%"),
            Expression::Subtract(var("n%"), int(1)),
        ),
        Statement::Wend,
        Statement::Sub(
            name("Hypot"),
            vec![
                Param {
                    name: name("a#"),
                    by_ref: false,
                },
                Param {
                    name: name("b#"),
                    by_ref: false,
                },
                Param {
                    name: name("result#"),
                    by_ref: true,
                },
            ],
        ),
        Statement::Let(
            Variable::from("result#"),
            Expression::function(
                "SQRT",
                vec![Expression::Add(
                    Box::new(Expression::Multiply(var("a#"), var("a#"))),
                    Box::new(Expression::Multiply(var("b#"), var("b#"))),
                )],
            ),
        ),
        Statement::EndSub,
        Statement::Call(
            name("Hypot"),
            vec![Expression::from(3), Expression::from(4), Expression::var("h#")],
        ),
        print(vec![Expression::string("Hypotenuse "), Expression::var("h#")]),
        Statement::Try,
        Statement::Let(
            Variable::from("x%"),
            Expression::Divide(int(1), int(0)),
        ),
        Statement::Catch(Some(name("e$"))),
        print(vec![Expression::string("Caught: "), Expression::var("e$")]),
        Statement::EndTry,
        Statement::End,
    ])
}
