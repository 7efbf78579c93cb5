/*!
# Introduction to the EduBASIC engine

EduBASIC programs reach the engine already parsed: one statement per
line, each line carrying an indent level. The indent is what ties an
`IF` to its `END IF`, so a program built by hand should go through
`Program::from_statements`, which lays out indents the way the editor
does.

```
use edubasic::lang::ast::{Expression, PrintItem, Statement, Variable};
use edubasic::mach::{Event, Program, Runtime};

let program = Program::from_statements(vec![
    Statement::Let(Variable::from("total%"), Expression::from(0)),
    Statement::For("i%".into(), Expression::from(1), Expression::from(4), None),
    Statement::Let(
        Variable::from("total%"),
        Expression::Add(
            Box::new(Expression::var("total%")),
            Box::new(Expression::var("i%")),
        ),
    ),
    Statement::Next(None),
    Statement::Print(vec![PrintItem::Expression(Expression::var("total%"))]),
]);
let mut runtime = Runtime::new(program);
assert_eq!(runtime.execute(1000), Event::Stopped);
```

## Stepping

`Runtime::step` runs exactly one statement and returns. A learning IDE
calls it once per click; the terminal host calls `Runtime::execute`,
which steps up to a cycle budget and reports one of:

* `Event::Running` when the budget ran out,
* `Event::Sleeping` when `SLEEP` asked for a pause (the host waits,
  the engine never blocks),
* `Event::Stopped` when the program ended,
* `Event::Error` when an error escaped every `TRY`.

Between steps the host may read `Context::variables()` and
`Runtime::frames()` to show what the program is doing.

## Values

Every variable's type comes from its last character:

| Sigil | Type    | Zero value |
|-------|---------|------------|
| `%`   | INTEGER | `0`        |
| `#`   | REAL    | `0`        |
| `$`   | STRING  | `""`       |
| `&`   | COMPLEX | `0+0i`     |
| none  | STRUCTURE | `{}`     |

Array names add a rank suffix: `scores%[]`, `grid#[,]`. Reading a
variable that was never assigned gives its zero value. True is `-1`.

## Errors

Errors print as `TYPE MISMATCH IN LINE 5; Cannot convert STRING to number`.
Missing block terminators and unknown labels always stop the program.
Anything else can be caught:

```text
TRY
    THROW "out of paper"
CATCH e$
    PRINT "caught "; e$
FINALLY
    PRINT "done"
END TRY
```

*/
