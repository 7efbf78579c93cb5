use super::Address;
use std::rc::Rc;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: u16,
    line: Option<Address>,
    message: Rc<str>,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            line: None,
            message: "".into(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn line(&self) -> Option<Address> {
        self.line
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code as u16
    }

    /// Structural errors mean the program itself is malformed.
    /// They are never handed to a TRY block.
    pub fn is_structural(&self) -> bool {
        use ErrorCode::*;
        [
            LabelNotFound,
            NextWithoutFor,
            ForWithoutNext,
            WhileWithoutWend,
            WendWithoutWhile,
            DoWithoutLoop,
            LoopWithoutDo,
            UntilWithoutUend,
            UendWithoutUntil,
            IfWithoutEndIf,
            ElseIfWithoutIf,
            SelectWithoutEndSelect,
            CaseWithoutSelect,
            TryWithoutEndTry,
            SubWithoutEndSub,
            UndefinedSub,
            InternalError,
        ]
        .iter()
        .any(|code| self.is(*code))
    }

    /// The annotation is kept when the error already carries a line,
    /// so re-raised errors still point at the statement that failed.
    pub fn in_line(self, line: Address) -> Error {
        if self.line.is_some() {
            return self;
        }
        Error {
            code: self.code,
            line: Some(line),
            message: self.message,
        }
    }

    pub fn message(self, message: &str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            code: self.code,
            line: self.line,
            message: message.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.message
    }

    /// The message if there is one, otherwise the code description.
    /// This is what a CATCH variable receives.
    pub fn description(&self) -> String {
        if self.message.is_empty() {
            code_str(self.code).to_string()
        } else {
            self.message.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorCode {
    Break = 1,
    SyntaxError = 2,
    IllegalFunctionCall = 5,
    Overflow = 6,
    OutOfMemory = 7,
    LabelNotFound = 8,
    SubscriptOutOfRange = 9,
    DivisionByZero = 11,
    TypeMismatch = 13,
    NextWithoutFor = 20,
    ForWithoutNext = 21,
    WhileWithoutWend = 22,
    WendWithoutWhile = 23,
    DoWithoutLoop = 24,
    LoopWithoutDo = 25,
    UntilWithoutUend = 26,
    UendWithoutUntil = 27,
    IfWithoutEndIf = 28,
    ElseIfWithoutIf = 29,
    SelectWithoutEndSelect = 30,
    CaseWithoutSelect = 31,
    UnknownOperator = 32,
    TryWithoutEndTry = 33,
    SubWithoutEndSub = 34,
    UndefinedSub = 35,
    WrongNumberOfArguments = 36,
    Thrown = 40,
    InternalError = 51,
    BadFileNumber = 52,
    FileNotFound = 53,
    BadFileMode = 54,
}

fn code_str(code: u16) -> &'static str {
    match code {
        1 => "BREAK",
        2 => "SYNTAX ERROR",
        5 => "ILLEGAL FUNCTION CALL",
        6 => "OVERFLOW",
        7 => "OUT OF MEMORY",
        8 => "UNDEFINED LABEL",
        9 => "SUBSCRIPT OUT OF RANGE",
        11 => "DIVISION BY ZERO",
        13 => "TYPE MISMATCH",
        20 => "NEXT WITHOUT FOR",
        21 => "FOR WITHOUT NEXT",
        22 => "WHILE WITHOUT WEND",
        23 => "WEND WITHOUT WHILE",
        24 => "DO WITHOUT LOOP",
        25 => "LOOP WITHOUT DO",
        26 => "UNTIL WITHOUT UEND",
        27 => "UEND WITHOUT UNTIL",
        28 => "IF WITHOUT END IF",
        29 => "ELSEIF WITHOUT IF",
        30 => "SELECT WITHOUT END SELECT",
        31 => "CASE WITHOUT SELECT",
        32 => "UNKNOWN OPERATOR",
        33 => "TRY WITHOUT END TRY",
        34 => "SUB WITHOUT END SUB",
        35 => "UNDEFINED SUB",
        36 => "WRONG NUMBER OF ARGUMENTS",
        40 => "UNHANDLED EXCEPTION",
        51 => "INTERNAL ERROR",
        52 => "BAD FILE NUMBER",
        53 => "FILE NOT FOUND",
        54 => "BAD FILE MODE",
        _ => "",
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let code_str = code_str(self.code);
        let mut suffix = String::new();
        if let Some(line) = self.line {
            suffix.push_str(&format!(" LINE {}", line + 1));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        if code_str.is_empty() {
            if suffix.is_empty() {
                write!(f, "PROGRAM ERROR {}", self.code)
            } else {
                write!(f, "PROGRAM ERROR {} IN{}", self.code, suffix)
            }
        } else if suffix.is_empty() {
            write!(f, "{}", code_str)
        } else if self.line.is_none() {
            write!(f, "{}{}", code_str, suffix)
        } else {
            write!(f, "{} IN{}", code_str, suffix)
        }
    }
}
