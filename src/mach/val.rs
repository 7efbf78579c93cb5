use super::MAX_ARRAY_LEN;
use crate::error;
use crate::lang::ident::{self, Sigil};
use crate::lang::Error;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Runtime value
///
/// Every variable's type is fixed by its sigil. Integers are 64 bits but
/// arithmetic degrades to floating point precision instead of trapping.

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Integer(i64),
    Real(f64),
    String(Rc<str>),
    Complex(f64, f64),
    Array(Box<Array>),
    Structure(HashMap<String, Val>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValType {
    Integer,
    Real,
    String,
    Complex,
    Array,
    Structure,
}

/// One axis of a dimensioned array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    pub lower: i64,
    pub length: usize,
    pub stride: usize,
}

/// Row-major flat storage. Without dimensions the array is a dynamic
/// zero-based list that grows and shrinks from either end.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    element: ValType,
    items: Vec<Val>,
    dims: Vec<Dimension>,
}

impl ValType {
    pub fn of(sigil: Sigil) -> ValType {
        match sigil {
            Sigil::Integer => ValType::Integer,
            Sigil::Real => ValType::Real,
            Sigil::String => ValType::String,
            Sigil::Complex => ValType::Complex,
            Sigil::None => ValType::Structure,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValType::Integer | ValType::Real | ValType::Complex)
    }
}

impl std::fmt::Display for ValType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            ValType::Integer => "INTEGER",
            ValType::Real => "REAL",
            ValType::String => "STRING",
            ValType::Complex => "COMPLEX",
            ValType::Array => "ARRAY",
            ValType::Structure => "STRUCTURE",
        };
        write!(f, "{}", s)
    }
}

impl Val {
    pub fn default_for(sigil: Sigil) -> Val {
        Val::zero(ValType::of(sigil))
    }

    /// Zero value for a full variable name, array names included.
    pub fn default_for_name(name: &str) -> Val {
        let sigil = Sigil::of(name);
        if ident::is_array(name) {
            Val::Array(Box::new(Array::dynamic(ValType::of(sigil))))
        } else {
            Val::default_for(sigil)
        }
    }

    pub fn zero(val_type: ValType) -> Val {
        match val_type {
            ValType::Integer => Val::Integer(0),
            ValType::Real => Val::Real(0.0),
            ValType::String => Val::String("".into()),
            ValType::Complex => Val::Complex(0.0, 0.0),
            ValType::Array => Val::Array(Box::new(Array::dynamic(ValType::Integer))),
            ValType::Structure => Val::Structure(HashMap::new()),
        }
    }

    pub fn val_type(&self) -> ValType {
        match self {
            Val::Integer(_) => ValType::Integer,
            Val::Real(_) => ValType::Real,
            Val::String(_) => ValType::String,
            Val::Complex(..) => ValType::Complex,
            Val::Array(_) => ValType::Array,
            Val::Structure(_) => ValType::Structure,
        }
    }

    pub fn coerce(self, target: ValType) -> Result<Val> {
        use Val::*;
        if self.val_type() == target {
            return Ok(self);
        }
        match (self, target) {
            (Integer(n), ValType::Real) => Ok(Real(n as f64)),
            (Integer(n), ValType::Complex) => Ok(Complex(n as f64, 0.0)),
            (Real(n), ValType::Integer) => Ok(Integer(real_to_integer(n)?)),
            (Real(n), ValType::Complex) => Ok(Complex(n, 0.0)),
            (Complex(re, im), ValType::Real) if im == 0.0 => Ok(Real(re)),
            (Complex(re, im), ValType::Integer) if im == 0.0 => Ok(Integer(real_to_integer(re)?)),
            (String(_), t) if t.is_numeric() => {
                Err(error!(TypeMismatch; "Cannot convert STRING to number"))
            }
            (v, t) => Err(error!(TypeMismatch; &format!("Cannot convert {} to {}", v.val_type(), t))),
        }
    }

    /// `None` means unordered: a NaN is involved, or two complex values differ.
    pub fn compare(&self, other: &Val) -> Result<Option<Ordering>> {
        use Val::*;
        match (self, other) {
            (String(l), String(r)) => Ok(Some(l.cmp(r))),
            (Integer(l), Integer(r)) => Ok(Some(l.cmp(r))),
            (Complex(..), _) | (_, Complex(..)) => {
                let (lr, li) = self.to_complex()?;
                let (rr, ri) = other.to_complex()?;
                if lr == rr && li == ri {
                    Ok(Some(Ordering::Equal))
                } else {
                    Ok(None)
                }
            }
            (Integer(_), Real(_)) | (Real(_), Integer(_)) | (Real(_), Real(_)) => {
                Ok(self.to_f64()?.partial_cmp(&other.to_f64()?))
            }
            (String(_), _) | (_, String(_)) => {
                Err(error!(TypeMismatch; "Cannot compare STRING with number"))
            }
            (l, r) => Err(error!(TypeMismatch; &format!(
                "Cannot compare {} with {}",
                l.val_type(),
                r.val_type()
            ))),
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Val::Integer(n) => Ok(*n as f64),
            Val::Real(n) => Ok(*n),
            Val::Complex(re, im) if *im == 0.0 => Ok(*re),
            Val::String(_) => Err(error!(TypeMismatch; "Cannot convert STRING to number")),
            v => Err(error!(TypeMismatch; &format!("Cannot convert {} to REAL", v.val_type()))),
        }
    }

    pub fn to_complex(&self) -> Result<(f64, f64)> {
        match self {
            Val::Complex(re, im) => Ok((*re, *im)),
            v => Ok((v.to_f64()?, 0.0)),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Val::Integer(n) => *n == 0,
            Val::Real(n) => *n == 0.0,
            Val::Complex(re, im) => *re == 0.0 && *im == 0.0,
            Val::String(s) => s.is_empty(),
            Val::Array(a) => a.is_empty(),
            Val::Structure(s) => s.is_empty(),
        }
    }
}

fn real_to_integer(n: f64) -> Result<i64> {
    if n.is_finite() {
        Ok(n.trunc() as i64)
    } else {
        Err(error!(Overflow; "Cannot convert non-finite REAL to INTEGER"))
    }
}

/// JavaScript-like number text: whole reals print without a fraction.
pub fn format_real(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn format_complex(re: f64, im: f64) -> String {
    if im < 0.0 || (im == 0.0 && im.is_sign_negative()) {
        format!("{}-{}i", format_real(re), format_real(-im))
    } else {
        format!("{}+{}i", format_real(re), format_real(im))
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::Integer(n) => write!(f, "{}", n),
            Val::Real(n) => write!(f, "{}", format_real(*n)),
            Val::String(s) => write!(f, "{}", s),
            Val::Complex(re, im) => write!(f, "{}", format_complex(*re, *im)),
            Val::Array(a) => {
                write!(f, "[")?;
                for (i, item) in a.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Val::Structure(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, k) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", k, map[*k])?;
                }
                if keys.is_empty() {
                    write!(f, "}}")
                } else {
                    write!(f, " }}")
                }
            }
        }
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::String(s.into())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::String(s.into())
    }
}

impl TryFrom<Val> for i64 {
    type Error = Error;

    fn try_from(val: Val) -> std::result::Result<Self, Self::Error> {
        match val.coerce(ValType::Integer)? {
            Val::Integer(n) => Ok(n),
            _ => Err(error!(InternalError; "INTEGER COERCION")),
        }
    }
}

impl TryFrom<Val> for f64 {
    type Error = Error;

    fn try_from(val: Val) -> std::result::Result<Self, Self::Error> {
        val.to_f64()
    }
}

impl TryFrom<Val> for usize {
    type Error = Error;

    fn try_from(val: Val) -> std::result::Result<Self, Self::Error> {
        let n = i64::try_from(val)?;
        usize::try_from(n).map_err(|_| error!(IllegalFunctionCall; "Negative value not allowed"))
    }
}

impl Array {
    pub fn dynamic(element: ValType) -> Array {
        Array {
            element,
            items: vec![],
            dims: vec![],
        }
    }

    /// Builds a zero-filled array from `(lower, length)` pairs.
    pub fn dimensioned(element: ValType, bounds: &[(i64, usize)]) -> Result<Array> {
        let mut dims: Vec<Dimension> = bounds
            .iter()
            .map(|&(lower, length)| Dimension {
                lower,
                length,
                stride: 1,
            })
            .collect();
        let mut stride = 1usize;
        for dim in dims.iter_mut().rev() {
            dim.stride = stride;
            stride = stride
                .checked_mul(dim.length)
                .ok_or_else(|| error!(OutOfMemory; "Array too large"))?;
        }
        if stride > MAX_ARRAY_LEN {
            return Err(error!(OutOfMemory; "Array too large"));
        }
        Ok(Array {
            element,
            items: vec![Val::zero(element); stride],
            dims,
        })
    }

    pub fn from_items(element: ValType, items: Vec<Val>) -> Result<Array> {
        let items = items
            .into_iter()
            .map(|v| v.coerce(element))
            .collect::<Result<Vec<Val>>>()?;
        Ok(Array {
            element,
            items,
            dims: vec![],
        })
    }

    pub fn element(&self) -> ValType {
        self.element
    }

    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn is_dynamic(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Val] {
        &self.items
    }

    /// Re-types the elements, used when an array is stored under a sigil.
    pub fn retype(self, element: ValType) -> Result<Array> {
        if self.element == element {
            return Ok(self);
        }
        let items = self
            .items
            .into_iter()
            .map(|v| v.coerce(element))
            .collect::<Result<Vec<Val>>>()?;
        Ok(Array {
            element,
            items,
            dims: self.dims,
        })
    }

    pub fn flat_index(&self, indices: &[i64]) -> Result<usize> {
        if self.dims.is_empty() {
            if indices.len() != 1 {
                return Err(error!(SubscriptOutOfRange; "Wrong number of subscripts"));
            }
            return usize::try_from(indices[0])
                .map_err(|_| error!(SubscriptOutOfRange; "Negative subscript"));
        }
        if indices.len() != self.dims.len() {
            return Err(error!(SubscriptOutOfRange; "Wrong number of subscripts"));
        }
        let mut flat = 0usize;
        for (index, dim) in indices.iter().zip(&self.dims) {
            let offset = match index.checked_sub(dim.lower) {
                Some(offset) if offset >= 0 && (offset as u64) < dim.length as u64 => offset,
                _ => {
                    return Err(error!(SubscriptOutOfRange; &format!("Index {} out of bounds", index)))
                }
            };
            flat += offset as usize * dim.stride;
        }
        Ok(flat)
    }

    pub fn get(&self, indices: &[i64]) -> Result<Val> {
        let flat = self.flat_index(indices)?;
        match self.items.get(flat) {
            Some(val) => Ok(val.clone()),
            None => Err(error!(SubscriptOutOfRange; &format!("Index {} out of bounds", flat))),
        }
    }

    /// Dynamic arrays grow to fit a write; dimensioned arrays never do.
    pub fn set(&mut self, indices: &[i64], val: Val) -> Result<()> {
        let val = val.coerce(self.element)?;
        let flat = self.flat_index(indices)?;
        if flat >= self.items.len() {
            if !self.dims.is_empty() {
                return Err(error!(SubscriptOutOfRange));
            }
            if flat >= MAX_ARRAY_LEN {
                return Err(error!(OutOfMemory; "Array too large"));
            }
            self.items.resize(flat + 1, Val::zero(self.element));
        }
        self.items[flat] = val;
        Ok(())
    }

    fn require_dynamic(&self) -> Result<()> {
        if self.dims.is_empty() {
            Ok(())
        } else {
            Err(error!(IllegalFunctionCall; "Array has fixed dimensions"))
        }
    }

    fn require_room(&self) -> Result<()> {
        if self.items.len() >= MAX_ARRAY_LEN {
            Err(error!(OutOfMemory; "Array too large"))
        } else {
            Ok(())
        }
    }

    pub fn push(&mut self, val: Val) -> Result<()> {
        self.require_dynamic()?;
        self.require_room()?;
        self.items.push(val.coerce(self.element)?);
        Ok(())
    }

    pub fn unshift(&mut self, val: Val) -> Result<()> {
        self.require_dynamic()?;
        self.require_room()?;
        self.items.insert(0, val.coerce(self.element)?);
        Ok(())
    }

    /// Removing from an empty array yields the element zero value.
    pub fn pop(&mut self) -> Result<Val> {
        self.require_dynamic()?;
        Ok(self.items.pop().unwrap_or_else(|| Val::zero(self.element)))
    }

    pub fn shift(&mut self) -> Result<Val> {
        self.require_dynamic()?;
        if self.items.is_empty() {
            Ok(Val::zero(self.element))
        } else {
            Ok(self.items.remove(0))
        }
    }

    /// Inclusive `(lower, upper)` of an axis, 1-based axis number.
    pub fn bounds(&self, axis: usize) -> Result<(i64, i64)> {
        if self.dims.is_empty() {
            if axis != 1 {
                return Err(error!(SubscriptOutOfRange; "No such dimension"));
            }
            return Ok((0, self.items.len() as i64 - 1));
        }
        match axis.checked_sub(1).and_then(|a| self.dims.get(a)) {
            Some(dim) => Ok((dim.lower, dim.lower.saturating_add(dim.length as i64 - 1))),
            None => Err(error!(SubscriptOutOfRange; "No such dimension")),
        }
    }
}
