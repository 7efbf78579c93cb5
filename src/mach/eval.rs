use super::{Array, Function, Machine, Operation, Val, ValType};
use crate::error;
use crate::lang::ast::Expression;
use crate::lang::{ident, Error};
use std::collections::HashMap;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

impl<'a> Machine<'a> {
    pub fn eval(&mut self, expr: &Expression) -> Result<Val> {
        use Expression::*;
        match expr {
            Integer(n) => Ok(Val::Integer(*n)),
            Real(n) => Ok(Val::Real(*n)),
            String(s) => Ok(Val::String(s.clone())),
            Imaginary(n) => Ok(Val::Complex(0.0, *n)),
            Variable(name) => Ok(self.context.get(name)),
            Index(name, indices) => {
                let indices = self.indices(indices)?;
                let name = array_name(name, indices.len());
                self.context.element(&name, &indices)
            }
            Member(expr, field) => match self.eval(expr)? {
                Val::Structure(mut fields) => match fields.remove(&ident::key(field)) {
                    Some(val) => Ok(val),
                    None => Err(error!(IllegalFunctionCall; &format!("No member {}", field))),
                },
                v => Err(error!(TypeMismatch; &format!("{} has no members", v.val_type()))),
            },
            Array(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<Vec<Val>>>()?;
                let element = element_type(&items);
                Ok(Val::Array(Box::new(self::Array::from_items(element, items)?)))
            }
            Structure(fields) => {
                let mut map = HashMap::new();
                for (name, expr) in fields {
                    map.insert(ident::key(name), self.eval(expr)?);
                }
                Ok(Val::Structure(map))
            }
            Function(name, args) => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<Val>>>()?;
                self::Function::call(self, name, args)
            }
            Negation(e) => Operation::negate(self.eval(e)?),
            Not(e) => Operation::not(self.eval(e)?),
            Power(l, r) => self.binary(l, r, Operation::power),
            Multiply(l, r) => self.binary(l, r, Operation::multiply),
            Divide(l, r) => self.binary(l, r, Operation::divide),
            DivideInt(l, r) => self.binary(l, r, Operation::divide_int),
            Modulo(l, r) => self.binary(l, r, Operation::modulo),
            Add(l, r) => self.binary(l, r, Operation::sum),
            Subtract(l, r) => self.binary(l, r, Operation::subtract),
            Equal(l, r) => self.binary(l, r, Operation::equal),
            NotEqual(l, r) => self.binary(l, r, Operation::not_equal),
            Less(l, r) => self.binary(l, r, Operation::less),
            LessEqual(l, r) => self.binary(l, r, Operation::less_equal),
            Greater(l, r) => self.binary(l, r, Operation::greater),
            GreaterEqual(l, r) => self.binary(l, r, Operation::greater_equal),
            And(l, r) => self.binary(l, r, Operation::and),
            Or(l, r) => self.binary(l, r, Operation::or),
            Xor(l, r) => self.binary(l, r, Operation::xor),
        }
    }

    fn binary<F>(&mut self, lhs: &Expression, rhs: &Expression, op: F) -> Result<Val>
    where
        F: Fn(Val, Val) -> Result<Val>,
    {
        let lhs = self.eval(lhs)?;
        let rhs = self.eval(rhs)?;
        op(lhs, rhs)
    }

    pub fn eval_integer(&mut self, expr: &Expression) -> Result<i64> {
        i64::try_from(self.eval(expr)?)
    }

    pub fn eval_real(&mut self, expr: &Expression) -> Result<f64> {
        self.eval(expr)?.to_f64()
    }

    pub fn eval_string(&mut self, expr: &Expression) -> Result<std::string::String> {
        match self.eval(expr)? {
            Val::String(s) => Ok(s.to_string()),
            v => Err(error!(TypeMismatch; &format!("Expected STRING, got {}", v.val_type()))),
        }
    }

    pub fn indices(&mut self, indices: &[Expression]) -> Result<Vec<i64>> {
        indices.iter().map(|i| self.eval_integer(i)).collect()
    }
}

/// Array storage names carry their rank suffix; accept them bare too.
pub fn array_name(name: &str, rank: usize) -> String {
    if ident::is_array(name) {
        name.to_string()
    } else {
        format!("{}[{}]", name, ",".repeat(rank.saturating_sub(1)))
    }
}

/// Widest type among literal items: STRING if any, else the numeric ladder.
fn element_type(items: &[Val]) -> ValType {
    let mut element = match items.first() {
        Some(v) => v.val_type(),
        None => return ValType::Integer,
    };
    for item in items.iter().skip(1) {
        element = match (element, item.val_type()) {
            (ValType::Integer, ValType::Real) => ValType::Real,
            (ValType::Integer, ValType::Complex) | (ValType::Real, ValType::Complex) => {
                ValType::Complex
            }
            (ValType::String, _) | (_, ValType::String) => ValType::String,
            (current, _) => current,
        };
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_name() {
        assert_eq!(array_name("a%", 1), "a%[]");
        assert_eq!(array_name("g#", 2), "g#[,]");
        assert_eq!(array_name("s$[]", 1), "s$[]");
    }

    #[test]
    fn test_element_type() {
        assert_eq!(element_type(&[]), ValType::Integer);
        assert_eq!(
            element_type(&[Val::Integer(1), Val::Real(2.5)]),
            ValType::Real
        );
        assert_eq!(
            element_type(&[Val::Real(1.0), Val::Complex(0.0, 1.0)]),
            ValType::Complex
        );
    }
}
