use super::Val;
use crate::error;
use crate::lang::Error;
use std::cmp::Ordering;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// Comparisons and logic produce -1 for true and 0 for false.
pub const TRUE: i64 = -1;
pub const FALSE: i64 = 0;

pub struct Operation {}

/// Both operands lifted to the higher rung of Integer -> Real -> Complex.
enum Pair {
    Integer(i64, i64),
    Real(f64, f64),
    Complex((f64, f64), (f64, f64)),
}

fn promote(lhs: &Val, rhs: &Val) -> Result<Pair> {
    use Val::*;
    match (lhs, rhs) {
        (Integer(l), Integer(r)) => Ok(Pair::Integer(*l, *r)),
        (Complex(..), _) | (_, Complex(..)) => {
            Ok(Pair::Complex(lhs.to_complex()?, rhs.to_complex()?))
        }
        _ => Ok(Pair::Real(lhs.to_f64()?, rhs.to_f64()?)),
    }
}

fn bool_val(b: bool) -> Val {
    Val::Integer(if b { TRUE } else { FALSE })
}

/// Past 64 bits the integer keeps going at floating point precision.
fn degrade(checked: Option<i64>, approx: f64) -> i64 {
    checked.unwrap_or(approx as i64)
}

pub fn complex_mul(l: (f64, f64), r: (f64, f64)) -> (f64, f64) {
    (l.0 * r.0 - l.1 * r.1, l.0 * r.1 + l.1 * r.0)
}

pub fn complex_div(l: (f64, f64), r: (f64, f64)) -> (f64, f64) {
    let d = r.0 * r.0 + r.1 * r.1;
    ((l.0 * r.0 + l.1 * r.1) / d, (l.1 * r.0 - l.0 * r.1) / d)
}

pub fn complex_exp(z: (f64, f64)) -> (f64, f64) {
    let m = z.0.exp();
    (m * z.1.cos(), m * z.1.sin())
}

pub fn complex_ln(z: (f64, f64)) -> (f64, f64) {
    (z.0.hypot(z.1).ln(), z.1.atan2(z.0))
}

fn complex_pow(base: (f64, f64), exp: (f64, f64)) -> (f64, f64) {
    if base == (0.0, 0.0) {
        return if exp == (0.0, 0.0) { (1.0, 0.0) } else { (0.0, 0.0) };
    }
    complex_exp(complex_mul(exp, complex_ln(base)))
}

fn complex_val(z: (f64, f64)) -> Val {
    Val::Complex(z.0, z.1)
}

impl Operation {
    pub fn negate(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            Integer(n) => Ok(Integer(degrade(n.checked_neg(), -(n as f64)))),
            Real(n) => Ok(Real(-n)),
            Complex(re, im) => Ok(Complex(-re, -im)),
            v => Err(error!(TypeMismatch; &format!("Cannot convert {} to number", v.val_type()))),
        }
    }

    pub fn not(val: Val) -> Result<Val> {
        match val {
            Val::Integer(n) => Ok(Val::Integer(!n)),
            v => Err(error!(TypeMismatch; &format!("NOT requires INTEGER, got {}", v.val_type()))),
        }
    }

    /// `+` concatenates when either side is a string.
    pub fn sum(lhs: Val, rhs: Val) -> Result<Val> {
        if let (Val::String(_), _) | (_, Val::String(_)) = (&lhs, &rhs) {
            return Ok(Val::String(format!("{}{}", lhs, rhs).into()));
        }
        Ok(match promote(&lhs, &rhs)? {
            Pair::Integer(l, r) => Val::Integer(degrade(l.checked_add(r), l as f64 + r as f64)),
            Pair::Real(l, r) => Val::Real(l + r),
            Pair::Complex(l, r) => complex_val((l.0 + r.0, l.1 + r.1)),
        })
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(match promote(&lhs, &rhs)? {
            Pair::Integer(l, r) => Val::Integer(degrade(l.checked_sub(r), l as f64 - r as f64)),
            Pair::Real(l, r) => Val::Real(l - r),
            Pair::Complex(l, r) => complex_val((l.0 - r.0, l.1 - r.1)),
        })
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(match promote(&lhs, &rhs)? {
            Pair::Integer(l, r) => Val::Integer(degrade(l.checked_mul(r), l as f64 * r as f64)),
            Pair::Real(l, r) => Val::Real(l * r),
            Pair::Complex(l, r) => complex_val(complex_mul(l, r)),
        })
    }

    /// Integer by integer stays integer (truncating); a real operand makes
    /// the result real and follows IEEE-754 for zero divisors.
    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        match promote(&lhs, &rhs)? {
            Pair::Integer(l, r) => Operation::integer_quotient(l, r),
            Pair::Real(l, r) => Ok(Val::Real(l / r)),
            Pair::Complex(l, r) => {
                if r == (0.0, 0.0) {
                    Err(error!(DivisionByZero))
                } else {
                    Ok(complex_val(complex_div(l, r)))
                }
            }
        }
    }

    pub fn divide_int(lhs: Val, rhs: Val) -> Result<Val> {
        match promote(&lhs, &rhs)? {
            Pair::Integer(l, r) => Operation::integer_quotient(l, r),
            Pair::Real(l, r) => {
                if r == 0.0 {
                    return Err(error!(DivisionByZero));
                }
                let q = (l / r).trunc();
                if q.is_finite() {
                    Ok(Val::Integer(q as i64))
                } else {
                    Err(error!(Overflow))
                }
            }
            Pair::Complex(..) => Err(error!(TypeMismatch; "Integer division of COMPLEX")),
        }
    }

    fn integer_quotient(l: i64, r: i64) -> Result<Val> {
        if r == 0 {
            return Err(error!(DivisionByZero));
        }
        Ok(Val::Integer(degrade(l.checked_div(r), (l as f64 / r as f64).trunc())))
    }

    pub fn modulo(lhs: Val, rhs: Val) -> Result<Val> {
        match promote(&lhs, &rhs)? {
            Pair::Integer(l, r) => match l.checked_rem(r) {
                Some(n) => Ok(Val::Integer(n)),
                None if r == 0 => Err(error!(DivisionByZero)),
                None => Ok(Val::Integer(0)),
            },
            Pair::Real(l, r) => Ok(Val::Real(l % r)),
            Pair::Complex(..) => Err(error!(TypeMismatch; "MOD of COMPLEX")),
        }
    }

    /// Integer powers stay integer for non-negative exponents.
    pub fn power(lhs: Val, rhs: Val) -> Result<Val> {
        match promote(&lhs, &rhs)? {
            Pair::Integer(l, r) => {
                if r >= 0 {
                    let checked = u32::try_from(r).ok().and_then(|e| l.checked_pow(e));
                    Ok(Val::Integer(degrade(checked, (l as f64).powf(r as f64))))
                } else {
                    Ok(Val::Real((l as f64).powf(r as f64)))
                }
            }
            Pair::Real(l, r) => Ok(Val::Real(l.powf(r))),
            Pair::Complex(l, r) => Ok(complex_val(complex_pow(l, r))),
        }
    }

    pub fn equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(bool_val(lhs.compare(&rhs)? == Some(Ordering::Equal)))
    }

    pub fn not_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(bool_val(lhs.compare(&rhs)? != Some(Ordering::Equal)))
    }

    fn ordered(lhs: &Val, rhs: &Val) -> Result<Option<Ordering>> {
        if let (Val::Complex(..), _) | (_, Val::Complex(..)) = (lhs, rhs) {
            return Err(error!(TypeMismatch; "COMPLEX values are not ordered"));
        }
        lhs.compare(rhs)
    }

    pub fn less(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(bool_val(Operation::ordered(&lhs, &rhs)? == Some(Ordering::Less)))
    }

    pub fn less_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(bool_val(matches!(
            Operation::ordered(&lhs, &rhs)?,
            Some(Ordering::Less) | Some(Ordering::Equal)
        )))
    }

    pub fn greater(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(bool_val(Operation::ordered(&lhs, &rhs)? == Some(Ordering::Greater)))
    }

    pub fn greater_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(bool_val(matches!(
            Operation::ordered(&lhs, &rhs)?,
            Some(Ordering::Greater) | Some(Ordering::Equal)
        )))
    }

    fn logical(lhs: Val, rhs: Val, name: &str, f: fn(i64, i64) -> i64) -> Result<Val> {
        match (lhs, rhs) {
            (Val::Integer(l), Val::Integer(r)) => Ok(Val::Integer(f(l, r))),
            (l, r) => Err(error!(TypeMismatch; &format!(
                "{} requires INTEGER operands, got {} and {}",
                name,
                l.val_type(),
                r.val_type()
            ))),
        }
    }

    pub fn and(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::logical(lhs, rhs, "AND", |l, r| l & r)
    }

    pub fn or(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::logical(lhs, rhs, "OR", |l, r| l | r)
    }

    pub fn xor(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::logical(lhs, rhs, "XOR", |l, r| l ^ r)
    }
}
