use super::{Machine, Result, Status};
use crate::error;
use crate::lang::ast::{Expression, Statement};
use crate::mach::frame::{FrameState, TryPhase};
use crate::mach::{Address, Val};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

fn is_try(s: &Statement) -> bool {
    *s == Statement::Try
}

impl<'a> Machine<'a> {
    fn label(&self, label: &str) -> Result<Address> {
        match self.program.label_index(label) {
            Some(index) => Ok(index),
            None => Err(error!(LabelNotFound; &format!("Label '{}' not found", label))),
        }
    }

    pub(super) fn goto(&mut self, label: &str) -> Result<Status> {
        Ok(Status::Goto(self.label(label)?))
    }

    pub(super) fn gosub(&mut self, label: &str) -> Result<Status> {
        let target = self.label(label)?;
        self.context.push_frame(Some(self.pc() + 1), HashMap::new())?;
        debug!(line = self.pc(), to = target, depth = self.context.depth(), "GOSUB");
        Ok(Status::Goto(target))
    }

    /// A SUB met in straight-line flow is skipped.
    pub(super) fn sub(&mut self) -> Result<Status> {
        let pc = self.pc();
        match self.closer(pc, |s| *s == Statement::EndSub) {
            Some(end) => Ok(Status::Goto(end + 1)),
            None => Err(error!(SubWithoutEndSub)),
        }
    }

    /// Arguments are evaluated in the caller's scope. A BYREF parameter
    /// given a plain variable aliases it; given anything else it gets a copy.
    pub(super) fn call(&mut self, name: &str, args: &[Expression]) -> Result<Status> {
        let pc = self.pc();
        let start = match self.program.sub_index(name) {
            Some(start) => start,
            None => return Err(error!(UndefinedSub; &format!("SUB {} not defined", name))),
        };
        let params = match self.statement(start)? {
            Statement::Sub(_, params) => params,
            _ => return Err(error!(InternalError; "NOT A SUB")),
        };
        if params.len() != args.len() {
            return Err(error!(WrongNumberOfArguments; &format!(
                "{} expects {} arguments, got {}",
                name,
                params.len(),
                args.len()
            )));
        }
        let end = match self.closer(start, |s| *s == Statement::EndSub) {
            Some(end) => end,
            None => return Err(error!(SubWithoutEndSub)),
        };
        let mut by_ref: HashMap<String, Rc<str>> = HashMap::new();
        let mut by_val: Vec<(Rc<str>, Val)> = vec![];
        for (param, arg) in params.iter().zip(args) {
            match arg {
                Expression::Variable(target) if param.by_ref => {
                    by_ref.insert(param.name.to_string(), target.clone());
                }
                _ => by_val.push((param.name.clone(), self.eval(arg)?)),
            }
        }
        self.context.push_frame(Some(pc + 1), by_ref)?;
        for (param, val) in by_val {
            self.context.set(&param, val, true)?;
        }
        self.enter(start, end, FrameState::Sub)?;
        debug!(line = pc, sub = name, depth = self.context.depth(), "CALL");
        Ok(Status::Goto(start + 1))
    }

    pub(super) fn r#try(&mut self) -> Result<Status> {
        let pc = self.pc();
        let end = match self.closer(pc, |s| *s == Statement::EndTry) {
            Some(end) => end,
            None => return Err(error!(TryWithoutEndTry)),
        };
        let catch = self.closer(pc, |s| matches!(s, Statement::Catch(_)));
        let finally = self.closer(pc, |s| *s == Statement::Finally);
        self.enter(
            pc,
            end,
            FrameState::Try {
                phase: TryPhase::Body,
                catch,
                finally,
                pending: None,
            },
        )?;
        Ok(Status::Next)
    }

    /// Reached only when the TRY body finished without error.
    pub(super) fn catch(&mut self) -> Result<Status> {
        let pc = self.pc();
        let start = match self.opener(pc, is_try) {
            Some(start) => start,
            None => return Err(error!(TryWithoutEndTry; "CATCH WITHOUT TRY")),
        };
        match self.frame_at(start).and_then(|i| self.frames.get(i)) {
            Some(frame) => match &frame.state {
                FrameState::Try {
                    finally: Some(finally),
                    ..
                } => Ok(Status::Goto(*finally)),
                _ => Ok(Status::Goto(frame.end)),
            },
            None => match self.closer(start, |s| *s == Statement::EndTry) {
                Some(end) => Ok(Status::Goto(end)),
                None => Err(error!(TryWithoutEndTry)),
            },
        }
    }

    pub(super) fn finally(&mut self) -> Result<Status> {
        let pc = self.pc();
        if let Some(start) = self.opener(pc, is_try) {
            if let Some(index) = self.frame_at(start) {
                if let Some(frame) = self.frames.get_mut(index) {
                    if let FrameState::Try { phase, .. } = &mut frame.state {
                        *phase = TryPhase::Finally;
                    }
                }
            }
        }
        Ok(Status::Next)
    }

    /// Closes the TRY and re-raises any error that was waiting on FINALLY.
    pub(super) fn end_try(&mut self) -> Result<Status> {
        let pc = self.pc();
        let frame = match self.opener(pc, is_try) {
            Some(start) => self.leave(start),
            None => None,
        };
        match frame.map(|f| f.state) {
            Some(FrameState::Try {
                pending: Some(error),
                ..
            }) => Err(error),
            _ => Ok(Status::Next),
        }
    }

    pub(super) fn throw(&mut self, expr: &Expression) -> Result<Status> {
        let message = self.eval(expr)?.to_string();
        Err(error!(Thrown; &message))
    }
}
