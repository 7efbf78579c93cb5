use super::{Machine, Result, Status};
use crate::error;
use crate::lang::ast::{Axis, Expression, Variable};
use crate::lang::ident::{self, Sigil};
use crate::mach::eval::array_name;
use crate::mach::{Array, Val, ValType};
use std::collections::HashMap;
use std::rc::Rc;

impl<'a> Machine<'a> {
    pub(super) fn r#let(&mut self, var: &Variable, expr: &Expression) -> Result<Status> {
        let value = self.eval(expr)?;
        self.assign(var, value)?;
        Ok(Status::Next)
    }

    pub(super) fn local(&mut self, name: &str, init: Option<&Expression>) -> Result<Status> {
        let value = match init {
            Some(expr) => self.eval(expr)?,
            None => Val::default_for_name(name),
        };
        self.context.set(name, value, true)?;
        Ok(Status::Next)
    }

    pub(super) fn dim(&mut self, name: &str, axes: &[Axis]) -> Result<Status> {
        let mut bounds = Vec::with_capacity(axes.len());
        for axis in axes {
            let upper = self.eval_integer(&axis.upper)?;
            let (lower, length) = match &axis.lower {
                Some(lower) => {
                    let lower = self.eval_integer(lower)?;
                    let length = upper
                        .checked_sub(lower)
                        .and_then(|n| n.checked_add(1))
                        .ok_or_else(|| error!(OutOfMemory; "Array too large"))?;
                    (lower, length)
                }
                None => (0, upper),
            };
            if length < 0 {
                return Err(error!(SubscriptOutOfRange; "Negative array size"));
            }
            bounds.push((lower, length as usize));
        }
        let name = array_name(name, axes.len());
        let element = ValType::of(Sigil::of(&name));
        let array = Array::dimensioned(element, &bounds)?;
        let is_local = self.context.has_local(&name);
        self.context.set(&name, Val::Array(Box::new(array)), is_local)?;
        Ok(Status::Next)
    }

    pub(super) fn swap(&mut self, a: &Variable, b: &Variable) -> Result<Status> {
        let va = self.read(a)?;
        let vb = self.read(b)?;
        if va.val_type() != vb.val_type() {
            return Err(error!(TypeMismatch; "SWAP needs two values of the same type"));
        }
        self.assign(a, vb)?;
        self.assign(b, va)?;
        Ok(Status::Next)
    }

    pub(super) fn push(&mut self, name: &str, expr: &Expression) -> Result<Status> {
        let value = self.eval(expr)?;
        self.array_mut(name)?.push(value)?;
        Ok(Status::Next)
    }

    pub(super) fn unshift(&mut self, name: &str, expr: &Expression) -> Result<Status> {
        let value = self.eval(expr)?;
        self.array_mut(name)?.unshift(value)?;
        Ok(Status::Next)
    }

    pub(super) fn pop(&mut self, name: &str, var: &Variable) -> Result<Status> {
        let value = self.array_mut(name)?.pop()?;
        self.assign(var, value)?;
        Ok(Status::Next)
    }

    pub(super) fn shift(&mut self, name: &str, var: &Variable) -> Result<Status> {
        let value = self.array_mut(name)?.shift()?;
        self.assign(var, value)?;
        Ok(Status::Next)
    }

    /// Store into a scalar, an array element or a structure member.
    /// Plain names write the current call's local when one exists.
    pub fn assign(&mut self, var: &Variable, value: Val) -> Result<()> {
        match var {
            Variable::Unary(name) => {
                let is_local = self.context.has_local(name);
                self.context.set(name, value, is_local)
            }
            Variable::Array(name, indices) => {
                let indices = self.indices(indices)?;
                let name = array_name(name, indices.len());
                self.array_mut(&name)?.set(&indices, value)
            }
            Variable::Member(name, fields) => {
                let mut slot = self.context.slot_mut(name)?;
                let (last, path) = match fields.split_last() {
                    Some(split) => split,
                    None => return Err(error!(InternalError; "EMPTY MEMBER PATH")),
                };
                for field in path {
                    slot = member_mut(slot, field)?;
                }
                match slot {
                    Val::Structure(map) => {
                        map.insert(ident::key(last), value);
                        Ok(())
                    }
                    v => Err(error!(TypeMismatch; &format!("{} has no members", v.val_type()))),
                }
            }
        }
    }

    /// Current value of an assignable location.
    pub fn read(&mut self, var: &Variable) -> Result<Val> {
        match var {
            Variable::Unary(name) => Ok(self.context.get(name)),
            Variable::Array(name, indices) => {
                let indices = self.indices(indices)?;
                let name = array_name(name, indices.len());
                self.context.element(&name, &indices)
            }
            Variable::Member(name, fields) => {
                let mut val = self.context.get(name);
                for field in fields {
                    val = match val {
                        Val::Structure(mut map) => match map.remove(&ident::key(field)) {
                            Some(v) => v,
                            None => {
                                return Err(error!(IllegalFunctionCall; &format!("No member {}", field)))
                            }
                        },
                        v => {
                            return Err(error!(TypeMismatch; &format!("{} has no members", v.val_type())))
                        }
                    };
                }
                Ok(val)
            }
        }
    }

    fn array_mut(&mut self, name: &str) -> Result<&mut Array> {
        let name = array_name(name, 1);
        match self.context.slot_mut(&name)? {
            Val::Array(array) => Ok(array),
            v => Err(error!(TypeMismatch; &format!("{} is not an array", v.val_type()))),
        }
    }
}

fn member_mut<'v>(slot: &'v mut Val, field: &Rc<str>) -> Result<&'v mut Val> {
    match slot {
        Val::Structure(map) => Ok(map
            .entry(ident::key(field))
            .or_insert_with(|| Val::Structure(HashMap::new()))),
        v => Err(error!(TypeMismatch; &format!("{} has no members", v.val_type()))),
    }
}
