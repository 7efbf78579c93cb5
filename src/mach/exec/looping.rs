use super::{Machine, Result, Status};
use crate::error;
use crate::lang::ast::{Block, Condition, Expression, Statement};
use crate::lang::ErrorCode;
use crate::mach::frame::FrameState;
use crate::mach::{Address, Operation, Val};
use std::rc::Rc;
use tracing::debug;

fn is_while(s: &Statement) -> bool {
    matches!(s, Statement::While(_) | Statement::Until(_))
}

fn is_wend(s: &Statement) -> bool {
    matches!(s, Statement::Wend | Statement::Uend)
}

fn is_do(s: &Statement) -> bool {
    matches!(s, Statement::Do(_))
}

fn is_loop(s: &Statement) -> bool {
    matches!(s, Statement::Loop(_))
}

fn is_for(s: &Statement) -> bool {
    matches!(s, Statement::For(..))
}

impl<'a> Machine<'a> {
    /// WHILE and UNTIL. UNTIL runs its body while the condition is zero.
    pub(super) fn r#while(&mut self, cond: &Expression, until: bool) -> Result<Status> {
        let pc = self.pc();
        let end = match self.closer(pc, is_wend) {
            Some(end) => end,
            None if until => return Err(error!(UntilWithoutUend)),
            None => return Err(error!(WhileWithoutWend)),
        };
        if self.condition(cond)? != until {
            self.enter(pc, end, FrameState::While { until })?;
            Ok(Status::Next)
        } else {
            self.leave(pc);
            Ok(Status::Goto(end + 1))
        }
    }

    /// WEND and UEND look back at the opening line to re-test it.
    pub(super) fn wend(&mut self) -> Result<Status> {
        let pc = self.pc();
        let until = matches!(self.statement(pc)?, Statement::Uend);
        let code = if until {
            ErrorCode::UendWithoutUntil
        } else {
            ErrorCode::WendWithoutWhile
        };
        let start = self.loop_frame(pc, is_while, code)?;
        let again = match self.statement(start)? {
            Statement::While(cond) => self.condition(cond)?,
            Statement::Until(cond) => !self.condition(cond)?,
            _ => false,
        };
        self.repeat_or_leave(start, again)
    }

    pub(super) fn r#do(&mut self, cond: &Condition) -> Result<Status> {
        let pc = self.pc();
        let end = match self.closer(pc, is_loop) {
            Some(end) => end,
            None => return Err(error!(DoWithoutLoop)),
        };
        if self.test(cond)? {
            self.enter(pc, end, FrameState::Do)?;
            Ok(Status::Next)
        } else {
            self.leave(pc);
            Ok(Status::Goto(end + 1))
        }
    }

    /// A pre-test on the DO line and a post-test on the LOOP line must
    /// both hold to go around again.
    pub(super) fn r#loop(&mut self, cond: &Condition) -> Result<Status> {
        let pc = self.pc();
        let start = self.loop_frame(pc, is_do, ErrorCode::LoopWithoutDo)?;
        let mut again = self.test(cond)?;
        if again {
            if let Statement::Do(pre) = self.statement(start)? {
                again = self.test(pre)?;
            }
        }
        self.repeat_or_leave(start, again)
    }

    fn test(&mut self, cond: &Condition) -> Result<bool> {
        match cond {
            Condition::Always => Ok(true),
            Condition::While(expr) => self.condition(expr),
            Condition::Until(expr) => Ok(!self.condition(expr)?),
        }
    }

    pub(super) fn r#for(
        &mut self,
        var: &Rc<str>,
        from: &Expression,
        to: &Expression,
        step: Option<&Expression>,
    ) -> Result<Status> {
        let pc = self.pc();
        let next = match self.closer(pc, |s| next_matches(s, var)) {
            Some(next) => next,
            None => return Err(error!(ForWithoutNext)),
        };
        let start = numeric(self.eval(from)?)?;
        let end = numeric(self.eval(to)?)?;
        let step = match step {
            Some(expr) => numeric(self.eval(expr)?)?,
            None => Val::Integer(1),
        };
        if !in_range(&start, &end, &step)? {
            self.leave(pc);
            return Ok(Status::Goto(next + 1));
        }
        let is_local = self.context.has_local(var);
        self.context.set(var, start.clone(), is_local)?;
        let assigned = self.context.peek(var);
        self.enter(
            pc,
            next,
            FrameState::For {
                var: var.clone(),
                start: start.clone(),
                end,
                step,
                counter: start,
                assigned,
            },
        )?;
        Ok(Status::Next)
    }

    pub(super) fn next(&mut self, var: Option<&str>) -> Result<Status> {
        let pc = self.pc();
        let start = match self.opener(pc, is_for) {
            Some(start) => start,
            None => return Err(error!(NextWithoutFor)),
        };
        if let (Some(name), Statement::For(for_var, ..)) = (var, self.statement(start)?) {
            if !for_var.eq_ignore_ascii_case(name) {
                return Err(error!(NextWithoutFor; &format!("NEXT {} does not close FOR {}", name, for_var)));
            }
        }
        let index = match self.frame_at(start) {
            Some(index) => index,
            None => return Err(error!(NextWithoutFor)),
        };
        self.frames.truncate(index + 1);
        let (var, end, step, counter, assigned) = match self.frames.get(index).map(|f| &f.state) {
            Some(FrameState::For {
                var,
                end,
                step,
                counter,
                assigned,
                ..
            }) => (var.clone(), end.clone(), step.clone(), counter.clone(), assigned.clone()),
            _ => return Err(error!(InternalError; "NOT A FOR FRAME")),
        };
        let current = self.context.get(&var);
        let counter = if current == assigned { counter } else { numeric(current)? };
        let value = Operation::sum(counter.clone(), step.clone())?;
        // Integer overflow saturates, so a stuck counter ends the loop.
        let stalled = value == counter && step.to_f64()? != 0.0;
        let again = !stalled && in_range(&value, &end, &step)?;
        let is_local = self.context.has_local(&var);
        self.context.set(&var, value.clone(), is_local)?;
        let assigned = self.context.peek(&var);
        if let Some(FrameState::For {
            counter: c,
            assigned: a,
            ..
        }) = self.frames.get_mut(index).map(|f| &mut f.state)
        {
            *c = value;
            *a = assigned;
        }
        self.repeat_or_leave(start, again)
    }

    /// Find the frame a loop closer belongs to and drop anything nested above it.
    fn loop_frame<F>(&mut self, pc: Address, pred: F, code: ErrorCode) -> Result<Address>
    where
        F: Fn(&Statement) -> bool,
    {
        let start = match self.opener(pc, pred) {
            Some(start) => start,
            None => return Err(crate::lang::Error::new(code)),
        };
        match self.frame_at(start) {
            Some(index) => {
                self.frames.truncate(index + 1);
                Ok(start)
            }
            None => Err(crate::lang::Error::new(code)),
        }
    }

    fn repeat_or_leave(&mut self, start: Address, again: bool) -> Result<Status> {
        if again {
            Ok(Status::Goto(start + 1))
        } else {
            self.leave(start);
            Ok(Status::Next)
        }
    }

    /// EXIT pops through the nearest frame of `kind` and resumes after its
    /// closer. EXIT SUB runs END SUB so the call returns normally.
    pub(super) fn exit(&mut self, kind: Block, name: Option<&str>) -> Result<Status> {
        let index = match self.target(kind, name) {
            Some(index) => index,
            None => {
                debug!(line = self.pc(), %kind, "EXIT outside any matching block");
                return Ok(Status::Next);
            }
        };
        let end = match self.frames.get(index) {
            Some(frame) => frame.end,
            None => return Err(error!(InternalError; "FRAME VANISHED")),
        };
        if kind == Block::Sub {
            self.frames.truncate(index + 1);
            return Ok(Status::Goto(end));
        }
        self.frames.truncate(index);
        Ok(Status::Goto(end + 1))
    }

    /// CONTINUE resumes at the closer, which re-tests or steps the loop.
    pub(super) fn r#continue(&mut self, kind: Block, name: Option<&str>) -> Result<Status> {
        let index = match self.target(kind, name) {
            Some(index) => index,
            None => {
                debug!(line = self.pc(), %kind, "CONTINUE outside any matching block");
                return Ok(Status::Next);
            }
        };
        self.frames.truncate(index + 1);
        match self.frames.get(index) {
            Some(frame) => Ok(Status::Goto(frame.end)),
            None => Err(error!(InternalError; "FRAME VANISHED")),
        }
    }

    /// Nearest frame of `kind` in the current call; a name selects a FOR
    /// loop by its variable.
    fn target(&self, kind: Block, name: Option<&str>) -> Option<usize> {
        let depth = self.context.depth();
        self.frames.rposition(|f| {
            if f.call_depth != depth || f.kind() != kind {
                return false;
            }
            match (name, &f.state) {
                (Some(name), FrameState::For { var, .. }) => var.eq_ignore_ascii_case(name),
                _ => true,
            }
        })
    }
}

fn next_matches(s: &Statement, var: &str) -> bool {
    match s {
        Statement::Next(None) => true,
        Statement::Next(Some(name)) => name.eq_ignore_ascii_case(var),
        _ => false,
    }
}

fn numeric(val: Val) -> Result<Val> {
    match val {
        Val::Integer(_) | Val::Real(_) => Ok(val),
        v => Err(error!(TypeMismatch; &format!("FOR needs numbers, got {}", v.val_type()))),
    }
}

/// Whether `value` has not yet passed `end` in the direction of `step`.
/// A zero step counts as ascending.
fn in_range(value: &Val, end: &Val, step: &Val) -> Result<bool> {
    let descending = step.to_f64()? < 0.0;
    let value = value.to_f64()?;
    let end = end.to_f64()?;
    Ok(if descending { value >= end } else { value <= end })
}
