use super::operation::{complex_exp, complex_ln};
use super::{Machine, Val, ValType};
use crate::error;
use crate::lang::Error;
use chrono::Timelike;
use std::convert::TryFrom;
use std::ops::RangeInclusive;

type Result<T> = std::result::Result<T, Error>;

pub struct Function {}

impl Function {
    pub fn arity(func_name: &str) -> Option<RangeInclusive<usize>> {
        let arity = match func_name {
            "RND" | "INKEY$" | "TIMER" | "TIME$" | "DATE$" => 0..=0,
            "ABS" | "SGN" | "INT" | "FIX" | "SQRT" | "SQR" | "EXP" | "LOG" | "SIN" | "COS"
            | "TAN" | "ATN" | "REAL" | "IMAG" | "CONJ" | "ARG" | "LEN" | "UCASE$" | "LCASE$"
            | "TRIM$" | "STR$" | "VAL" | "CHR$" | "ASC" | "KEYDOWN" | "EOF" | "TELL" => 1..=1,
            "ROUND" | "LBOUND" | "UBOUND" => 1..=2,
            "LEFT$" | "RIGHT$" => 2..=2,
            "MID$" => 2..=3,
            "INSTR" => 2..=3,
            _ => return None,
        };
        Some(arity)
    }

    pub fn call(m: &mut Machine, func_name: &str, args: Vec<Val>) -> Result<Val> {
        let name = func_name.to_ascii_uppercase();
        let arity = match Function::arity(&name) {
            Some(arity) => arity,
            None => {
                return Err(error!(IllegalFunctionCall; &format!("Unknown function {}", func_name)))
            }
        };
        if !arity.contains(&args.len()) {
            return Err(error!(WrongNumberOfArguments; &format!(
                "{} expects {} to {} arguments",
                name,
                arity.start(),
                arity.end()
            )));
        }
        let argc = args.len();
        let mut args = args.into_iter();
        let mut arg = || args.next().unwrap_or(Val::Integer(0));
        match name.as_str() {
            "RND" => Ok(Val::Real(m.context.random())),
            "INKEY$" => Ok(Val::String(m.context.keys().last_key().into())),
            "KEYDOWN" => {
                let key = string(arg())?;
                Ok(truth(m.context.keys().is_down(&key)))
            }
            "TIMER" => {
                let now = chrono::Local::now();
                let seconds = now.num_seconds_from_midnight() as f64;
                Ok(Val::Real(seconds + now.nanosecond() as f64 / 1e9))
            }
            "TIME$" => Ok(Val::String(
                chrono::Local::now().format("%H:%M:%S").to_string().into(),
            )),
            "DATE$" => Ok(Val::String(
                chrono::Local::now().format("%Y-%m-%d").to_string().into(),
            )),
            "EOF" => {
                let handle = i64::try_from(arg())?;
                Ok(truth(m.host.fs().eof(handle)?))
            }
            "TELL" => {
                let handle = i64::try_from(arg())?;
                Ok(Val::Integer(m.host.fs().tell(handle)? as i64))
            }
            "ABS" => Function::abs(arg()),
            "SGN" => Function::sgn(arg()),
            "INT" => Function::int(arg()),
            "FIX" => Ok(Val::Integer(i64::try_from(arg())?)),
            "ROUND" => {
                let n = arg().to_f64()?;
                let places = i64::try_from(arg())?;
                Function::round(n, places)
            }
            "SQRT" | "SQR" => Function::sqrt(arg()),
            "EXP" => Function::exp(arg()),
            "LOG" => Function::log(arg()),
            "SIN" => Function::sin(arg()),
            "COS" => Function::cos(arg()),
            "TAN" => Ok(Val::Real(arg().to_f64()?.tan())),
            "ATN" => Ok(Val::Real(arg().to_f64()?.atan())),
            "REAL" => Ok(Val::Real(arg().to_complex()?.0)),
            "IMAG" => Ok(Val::Real(arg().to_complex()?.1)),
            "CONJ" => {
                let (re, im) = arg().to_complex()?;
                Ok(Val::Complex(re, -im))
            }
            "ARG" => {
                let (re, im) = arg().to_complex()?;
                Ok(Val::Real(im.atan2(re)))
            }
            "LEN" => match arg() {
                Val::String(s) => Ok(Val::Integer(s.chars().count() as i64)),
                Val::Array(a) => Ok(Val::Integer(a.len() as i64)),
                v => Err(type_error("LEN", &v)),
            },
            "LBOUND" | "UBOUND" => {
                let array = match arg() {
                    Val::Array(a) => a,
                    v => return Err(type_error(&name, &v)),
                };
                let axis = usize::try_from(arg())?.max(1);
                let (lower, upper) = array.bounds(axis)?;
                Ok(Val::Integer(if name == "LBOUND" { lower } else { upper }))
            }
            "UCASE$" => Ok(Val::String(string(arg())?.to_uppercase().into())),
            "LCASE$" => Ok(Val::String(string(arg())?.to_lowercase().into())),
            "TRIM$" => Ok(Val::String(string(arg())?.trim().into())),
            "STR$" => Ok(Val::String(arg().to_string().into())),
            "VAL" => Ok(Function::val(&string(arg())?)),
            "CHR$" => {
                let code = i64::try_from(arg())?;
                match u32::try_from(code).ok().and_then(std::char::from_u32) {
                    Some(ch) => Ok(Val::String(ch.to_string().into())),
                    None => Err(error!(IllegalFunctionCall; "Invalid character code")),
                }
            }
            "ASC" => match string(arg())?.chars().next() {
                Some(ch) => Ok(Val::Integer(ch as i64)),
                None => Err(error!(IllegalFunctionCall; "ASC of empty string")),
            },
            "LEFT$" => {
                let s = string(arg())?;
                let n = usize::try_from(arg())?;
                Ok(Val::String(s.chars().take(n).collect::<String>().into()))
            }
            "RIGHT$" => {
                let s = string(arg())?;
                let n = usize::try_from(arg())?;
                let len = s.chars().count();
                Ok(Val::String(s.chars().skip(len.saturating_sub(n)).collect::<String>().into()))
            }
            "MID$" => {
                let s = string(arg())?;
                let start = usize::try_from(arg())?;
                if start < 1 {
                    return Err(error!(IllegalFunctionCall; "MID$ start must be at least 1"));
                }
                let len = if argc == 3 {
                    usize::try_from(arg())?
                } else {
                    usize::max_value()
                };
                let taken: String = s.chars().skip(start - 1).take(len).collect();
                Ok(Val::String(taken.into()))
            }
            "INSTR" => {
                let haystack = string(arg())?;
                let needle = string(arg())?;
                let start = if argc == 3 {
                    usize::try_from(arg())?.max(1)
                } else {
                    1
                };
                let chars: Vec<char> = haystack.chars().collect();
                let tail: String = chars.iter().skip(start - 1).collect();
                Ok(Val::Integer(match tail.find(needle.as_str()) {
                    Some(byte) => (start + tail[..byte].chars().count()) as i64,
                    None => 0,
                }))
            }
            _ => Err(error!(InternalError; "FUNCTION TABLE")),
        }
    }

    pub fn abs(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            Integer(n) => Ok(Integer(n.checked_abs().unwrap_or(i64::max_value()))),
            Real(n) => Ok(Real(n.abs())),
            Complex(re, im) => Ok(Real(re.hypot(im))),
            v => Err(type_error("ABS", &v)),
        }
    }

    pub fn sgn(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            Integer(n) => Ok(Integer(n.signum())),
            Real(n) if n.is_nan() => Ok(Real(n)),
            Real(n) if n == 0.0 => Ok(Integer(0)),
            Real(n) => Ok(Integer(if n > 0.0 { 1 } else { -1 })),
            v => Err(type_error("SGN", &v)),
        }
    }

    pub fn int(val: Val) -> Result<Val> {
        match val {
            Val::Integer(n) => Ok(Val::Integer(n)),
            v => Val::Real(v.to_f64()?.floor()).coerce(ValType::Integer),
        }
    }

    pub fn round(n: f64, places: i64) -> Result<Val> {
        if places <= 0 {
            return Val::Real(n.round()).coerce(ValType::Integer);
        }
        let factor = 10f64.powi(places.min(15) as i32);
        Ok(Val::Real((n * factor).round() / factor))
    }

    /// Negative reals have no real square root; the result turns complex.
    pub fn sqrt(val: Val) -> Result<Val> {
        match val {
            Val::Complex(re, im) => {
                let (lr, li) = complex_ln((re, im));
                let (r, i) = complex_exp((lr / 2.0, li / 2.0));
                Ok(Val::Complex(r, i))
            }
            v => {
                let n = v.to_f64()?;
                if n < 0.0 {
                    Ok(Val::Complex(0.0, (-n).sqrt()))
                } else {
                    Ok(Val::Real(n.sqrt()))
                }
            }
        }
    }

    pub fn exp(val: Val) -> Result<Val> {
        match val {
            Val::Complex(re, im) => {
                let (r, i) = complex_exp((re, im));
                Ok(Val::Complex(r, i))
            }
            v => Ok(Val::Real(v.to_f64()?.exp())),
        }
    }

    /// `LOG(0)` is -Infinity; negative arguments go complex.
    pub fn log(val: Val) -> Result<Val> {
        match val {
            Val::Complex(re, im) => {
                let (r, i) = complex_ln((re, im));
                Ok(Val::Complex(r, i))
            }
            v => {
                let n = v.to_f64()?;
                if n < 0.0 {
                    let (r, i) = complex_ln((n, 0.0));
                    Ok(Val::Complex(r, i))
                } else {
                    Ok(Val::Real(n.ln()))
                }
            }
        }
    }

    pub fn sin(val: Val) -> Result<Val> {
        match val {
            Val::Complex(a, b) => Ok(Val::Complex(a.sin() * b.cosh(), a.cos() * b.sinh())),
            v => Ok(Val::Real(v.to_f64()?.sin())),
        }
    }

    pub fn cos(val: Val) -> Result<Val> {
        match val {
            Val::Complex(a, b) => Ok(Val::Complex(a.cos() * b.cosh(), -(a.sin() * b.sinh()))),
            v => Ok(Val::Real(v.to_f64()?.cos())),
        }
    }

    /// Leading numeric text; anything unparsable is zero.
    pub fn val(s: &str) -> Val {
        let s = s.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Val::Integer(n);
        }
        let mut end = 0;
        for (i, _) in s.char_indices().chain(std::iter::once((s.len(), ' '))) {
            if s[..i].parse::<f64>().is_ok() {
                end = i;
            }
        }
        match s[..end].parse::<f64>() {
            Ok(n) if n.fract() == 0.0 && n.abs() < 9.0e15 && !s[..end].contains('.') => {
                Val::Integer(n as i64)
            }
            Ok(n) => Val::Real(n),
            Err(_) => Val::Integer(0),
        }
    }
}

fn truth(b: bool) -> Val {
    Val::Integer(if b { super::operation::TRUE } else { super::operation::FALSE })
}

fn string(val: Val) -> Result<String> {
    match val {
        Val::String(s) => Ok(s.to_string()),
        v => Err(error!(TypeMismatch; &format!("Expected STRING, got {}", v.val_type()))),
    }
}

fn type_error(func_name: &str, val: &Val) -> Error {
    error!(TypeMismatch; &format!("{} does not accept {}", func_name, val.val_type()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_of_negative_is_complex() {
        assert_eq!(Function::sqrt(Val::Real(-4.0)), Ok(Val::Complex(0.0, 2.0)));
        assert_eq!(Function::sqrt(Val::Integer(9)), Ok(Val::Real(3.0)));
    }

    #[test]
    fn test_log_edges() {
        assert_eq!(Function::log(Val::Integer(0)), Ok(Val::Real(f64::NEG_INFINITY)));
        match Function::log(Val::Real(-1.0)) {
            Ok(Val::Complex(re, im)) => {
                assert_eq!(re, 0.0);
                assert!((im - std::f64::consts::PI).abs() < 1e-12);
            }
            v => panic!("{:?}", v),
        }
        assert_eq!(Function::exp(Val::Integer(1000)), Ok(Val::Real(f64::INFINITY)));
    }

    #[test]
    fn test_int_and_sgn() {
        assert_eq!(Function::int(Val::Real(-2.5)), Ok(Val::Integer(-3)));
        assert_eq!(Function::sgn(Val::Real(-0.1)), Ok(Val::Integer(-1)));
        assert_eq!(Function::abs(Val::Complex(3.0, 4.0)), Ok(Val::Real(5.0)));
        assert!(Function::abs(Val::from("x")).is_err());
    }

    #[test]
    fn test_val() {
        assert_eq!(Function::val("42"), Val::Integer(42));
        assert_eq!(Function::val(" 2.5kg"), Val::Real(2.5));
        assert_eq!(Function::val("abc"), Val::Integer(0));
    }
}
