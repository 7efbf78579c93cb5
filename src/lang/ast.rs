use std::rc::Rc;

/// ## Statement tree handed over by the parser
///
/// One `Statement` per program line. Block structure is not nested here;
/// it comes from the line's indent level and the closing keywords.

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Rem(Rc<str>),
    Label(Rc<str>),
    Let(Variable, Expression),
    Local(Rc<str>, Option<Expression>),
    Dim(Rc<str>, Vec<Axis>),
    Swap(Variable, Variable),
    Push(Rc<str>, Expression),
    Pop(Rc<str>, Variable),
    Shift(Rc<str>, Variable),
    Unshift(Rc<str>, Expression),
    Print(Vec<PrintItem>),

    If(Expression),
    ElseIf(Expression),
    Else,
    EndIf,
    Unless(Expression),
    EndUnless,
    While(Expression),
    Wend,
    Do(Condition),
    Loop(Condition),
    Until(Expression),
    Uend,
    For(Rc<str>, Expression, Expression, Option<Expression>),
    Next(Option<Rc<str>>),
    SelectCase(Expression),
    Case(Vec<CaseTest>),
    EndSelect,
    Try,
    Catch(Option<Rc<str>>),
    Finally,
    EndTry,
    Throw(Expression),
    Exit(Block, Option<Rc<str>>),
    Continue(Block, Option<Rc<str>>),

    Goto(Rc<str>),
    Gosub(Rc<str>),
    Return,
    Sub(Rc<str>, Vec<Param>),
    EndSub,
    Call(Rc<str>, Vec<Expression>),
    End,

    Randomize(Option<Expression>),
    Sleep(Expression),
    View(Expression),

    Color(Expression, Option<Expression>),
    Locate(Expression, Expression),
    Cls,
    Draw(Shape, Vec<Expression>, bool),

    Tempo(Expression),
    Volume(Expression),
    Voice(Expression),
    Play(Expression, Expression),
    PlayStop,

    Open(Expression, FileMode, Variable),
    Close(Expression),
    ReadBytes(Expression, Expression, Variable),
    WriteBytes(Expression, Expression),
    Seek(Expression, Expression),
    ReadFile(Expression, Variable),
    WriteFile(Expression, Expression),
}

/// Construct kinds addressable by `EXIT` and `CONTINUE`; also the tag
/// of every control frame. `UNTIL` loops are `While` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    If,
    While,
    Do,
    For,
    Select,
    Sub,
    Try,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Always,
    While(Expression),
    Until(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseTest {
    Value(Vec<Expression>),
    Range(Expression, Expression),
    Relational(Rc<str>, Expression),
    Else,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintItem {
    Expression(Expression),
    Comma,
    Semicolon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Rc<str>,
    pub by_ref: bool,
}

/// `DIM a%[10]` has no lower bound and ten elements.
/// `DIM a%[1 TO 10]` has an inclusive range.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub lower: Option<Expression>,
    pub upper: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Pixel,
    Line,
    Rectangle,
    Oval,
    Circle,
    Triangle,
    Arc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    Append,
    ReadWrite,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Unary(Rc<str>),
    Array(Rc<str>, Vec<Expression>),
    Member(Rc<str>, Vec<Rc<str>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer(i64),
    Real(f64),
    String(Rc<str>),
    Imaginary(f64),
    Variable(Rc<str>),
    Index(Rc<str>, Vec<Expression>),
    Member(Box<Expression>, Rc<str>),
    Array(Vec<Expression>),
    Structure(Vec<(Rc<str>, Expression)>),
    Function(Rc<str>, Vec<Expression>),
    Negation(Box<Expression>),
    Not(Box<Expression>),
    Power(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    DivideInt(Box<Expression>, Box<Expression>),
    Modulo(Box<Expression>, Box<Expression>),
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    Less(Box<Expression>, Box<Expression>),
    LessEqual(Box<Expression>, Box<Expression>),
    Greater(Box<Expression>, Box<Expression>),
    GreaterEqual(Box<Expression>, Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Xor(Box<Expression>, Box<Expression>),
}

/// How a statement moves the indent level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Plain,
    Opener,
    Clause,
    Closer,
}

impl Statement {
    pub fn role(&self) -> Role {
        use Statement::*;
        match self {
            If(_) | Unless(_) | While(_) | Do(_) | Until(_) | For(..) | SelectCase(_) | Try
            | Sub(..) => Role::Opener,
            ElseIf(_) | Else | Case(_) | Catch(_) | Finally => Role::Clause,
            EndIf | EndUnless | Wend | Loop(_) | Uend | Next(_) | EndSelect | EndTry
            | EndSub => Role::Closer,
            _ => Role::Plain,
        }
    }
}

impl Expression {
    pub fn var(name: &str) -> Expression {
        Expression::Variable(name.into())
    }

    pub fn string(s: &str) -> Expression {
        Expression::String(s.into())
    }

    pub fn function(name: &str, args: Vec<Expression>) -> Expression {
        Expression::Function(name.into(), args)
    }

    pub fn index(name: &str, indices: Vec<Expression>) -> Expression {
        Expression::Index(name.into(), indices)
    }
}

impl From<i64> for Expression {
    fn from(n: i64) -> Self {
        Expression::Integer(n)
    }
}

impl From<f64> for Expression {
    fn from(n: f64) -> Self {
        Expression::Real(n)
    }
}

impl Variable {
    pub fn name(&self) -> &Rc<str> {
        match self {
            Variable::Unary(name) | Variable::Array(name, _) | Variable::Member(name, _) => name,
        }
    }
}

impl From<&str> for Variable {
    fn from(name: &str) -> Self {
        Variable::Unary(name.into())
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Block::If => "IF",
            Block::While => "WHILE",
            Block::Do => "DO",
            Block::For => "FOR",
            Block::Select => "SELECT",
            Block::Sub => "SUB",
            Block::Try => "TRY",
        };
        write!(f, "{}", s)
    }
}
