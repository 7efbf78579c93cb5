use super::{Machine, Result, Status};
use crate::error;
use crate::lang::ast::{CaseTest, Expression, Statement};
use crate::mach::frame::FrameState;
use crate::mach::{Address, Val};
use std::cmp::Ordering;

fn is_if(s: &Statement) -> bool {
    matches!(s, Statement::If(_))
}

fn is_if_or_unless(s: &Statement) -> bool {
    matches!(s, Statement::If(_) | Statement::Unless(_))
}

fn is_if_end(s: &Statement) -> bool {
    matches!(s, Statement::EndIf | Statement::EndUnless)
}

fn is_if_clause(s: &Statement) -> bool {
    matches!(
        s,
        Statement::ElseIf(_) | Statement::Else | Statement::EndIf | Statement::EndUnless
    )
}

fn is_case_clause(s: &Statement) -> bool {
    matches!(s, Statement::Case(_) | Statement::EndSelect)
}

impl<'a> Machine<'a> {
    /// IF and UNLESS. The frame is pushed either way so later clauses
    /// can see whether a branch was taken.
    pub(super) fn r#if(&mut self, cond: &Expression, unless: bool) -> Result<Status> {
        let pc = self.pc();
        let end = match self.closer(pc, is_if_end) {
            Some(end) => end,
            None => return Err(error!(IfWithoutEndIf)),
        };
        let taken = self.condition(cond)? != unless;
        self.enter(pc, end, FrameState::If { branch_taken: taken })?;
        if taken {
            return Ok(Status::Next);
        }
        match self.closer(pc, is_if_clause) {
            Some(clause) => Ok(Status::Goto(clause)),
            None => Ok(Status::Goto(end)),
        }
    }

    pub(super) fn else_if(&mut self, cond: &Expression) -> Result<Status> {
        let pc = self.pc();
        let start = match self.opener(pc, is_if) {
            Some(start) => start,
            None => return Err(error!(ElseIfWithoutIf)),
        };
        let (index, end) = match self.if_frame(start)? {
            Ok(found) => found,
            Err(end) => return Ok(Status::Goto(end)),
        };
        if self.branch_taken(index) {
            return Ok(Status::Goto(end));
        }
        if self.condition(cond)? {
            self.take_branch(index);
            return Ok(Status::Next);
        }
        match self.closer(pc, is_if_clause) {
            Some(clause) => Ok(Status::Goto(clause)),
            None => Ok(Status::Goto(end)),
        }
    }

    pub(super) fn r#else(&mut self) -> Result<Status> {
        let pc = self.pc();
        let start = match self.opener(pc, is_if_or_unless) {
            Some(start) => start,
            None => return Err(error!(ElseIfWithoutIf; "ELSE WITHOUT IF")),
        };
        let (index, end) = match self.if_frame(start)? {
            Ok(found) => found,
            Err(end) => return Ok(Status::Goto(end)),
        };
        if self.branch_taken(index) {
            return Ok(Status::Goto(end));
        }
        self.take_branch(index);
        Ok(Status::Next)
    }

    pub(super) fn end_if(&mut self) -> Result<Status> {
        let pc = self.pc();
        if let Some(start) = self.opener(pc, is_if_or_unless) {
            self.leave(start);
        }
        Ok(Status::Next)
    }

    /// Frame index and END IF line for the IF opened at `start`. Without a
    /// frame, as after a GOTO into the block, the inner `Err` carries the
    /// END IF line so the caller can leave the block.
    fn if_frame(&self, start: Address) -> Result<std::result::Result<(usize, Address), Address>> {
        match self.frame_at(start) {
            Some(index) => match self.frames.get(index) {
                Some(frame) => Ok(Ok((index, frame.end))),
                None => Err(error!(InternalError; "FRAME VANISHED")),
            },
            None => match self.closer(start, is_if_end) {
                Some(end) => Ok(Err(end)),
                None => Err(error!(IfWithoutEndIf)),
            },
        }
    }

    fn branch_taken(&self, index: usize) -> bool {
        match self.frames.get(index).map(|f| &f.state) {
            Some(FrameState::If { branch_taken }) => *branch_taken,
            _ => false,
        }
    }

    fn take_branch(&mut self, index: usize) {
        if let Some(frame) = self.frames.get_mut(index) {
            frame.state = FrameState::If { branch_taken: true };
        }
    }

    pub(super) fn select_case(&mut self, expr: &Expression) -> Result<Status> {
        let pc = self.pc();
        let end = match self.closer(pc, |s| *s == Statement::EndSelect) {
            Some(end) => end,
            None => return Err(error!(SelectWithoutEndSelect)),
        };
        let selector = self.eval(expr)?;
        self.enter(
            pc,
            end,
            FrameState::Select {
                selector,
                matched: false,
            },
        )?;
        match self.closer(pc, is_case_clause) {
            Some(clause) => Ok(Status::Goto(clause)),
            None => Ok(Status::Goto(end)),
        }
    }

    pub(super) fn case(&mut self, tests: &[CaseTest]) -> Result<Status> {
        let pc = self.pc();
        let start = match self.opener(pc, |s| matches!(s, Statement::SelectCase(_))) {
            Some(start) => start,
            None => return Err(error!(CaseWithoutSelect)),
        };
        let index = match self.frame_at(start) {
            Some(index) => index,
            None => {
                return match self.closer(start, |s| *s == Statement::EndSelect) {
                    Some(end) => Ok(Status::Goto(end)),
                    None => Err(error!(SelectWithoutEndSelect)),
                }
            }
        };
        let (selector, matched, end) = match self.frames.get(index) {
            Some(frame) => match &frame.state {
                FrameState::Select { selector, matched } => (selector.clone(), *matched, frame.end),
                _ => return Err(error!(InternalError; "NOT A SELECT FRAME")),
            },
            None => return Err(error!(InternalError; "FRAME VANISHED")),
        };
        if matched {
            return Ok(Status::Goto(end));
        }
        let mut hit = false;
        for test in tests {
            if self.case_matches(&selector, test)? {
                hit = true;
                break;
            }
        }
        if hit {
            if let Some(frame) = self.frames.get_mut(index) {
                if let FrameState::Select { matched, .. } = &mut frame.state {
                    *matched = true;
                }
            }
            return Ok(Status::Next);
        }
        match self.closer(pc, is_case_clause) {
            Some(clause) => Ok(Status::Goto(clause)),
            None => Ok(Status::Goto(end)),
        }
    }

    fn case_matches(&mut self, selector: &Val, test: &CaseTest) -> Result<bool> {
        match test {
            CaseTest::Else => Ok(true),
            CaseTest::Value(values) => {
                for expr in values {
                    let value = self.eval(expr)?;
                    if selector.compare(&value)? == Some(Ordering::Equal) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            CaseTest::Range(low, high) => {
                let low = self.eval(low)?;
                let high = self.eval(high)?;
                let above = matches!(
                    selector.compare(&low)?,
                    Some(Ordering::Greater) | Some(Ordering::Equal)
                );
                let below = matches!(
                    selector.compare(&high)?,
                    Some(Ordering::Less) | Some(Ordering::Equal)
                );
                Ok(above && below)
            }
            CaseTest::Relational(op, expr) => {
                let value = self.eval(expr)?;
                let ordering = selector.compare(&value)?;
                match op.as_ref() {
                    "=" => Ok(ordering == Some(Ordering::Equal)),
                    "<>" => Ok(ordering != Some(Ordering::Equal)),
                    "<" => Ok(ordering == Some(Ordering::Less)),
                    ">" => Ok(ordering == Some(Ordering::Greater)),
                    "<=" => Ok(matches!(ordering, Some(Ordering::Less) | Some(Ordering::Equal))),
                    ">=" => Ok(matches!(
                        ordering,
                        Some(Ordering::Greater) | Some(Ordering::Equal)
                    )),
                    _ => Err(error!(UnknownOperator; &format!("Unknown CASE operator '{}'", op))),
                }
            }
        }
    }

    pub(super) fn end_select(&mut self) -> Result<Status> {
        let pc = self.pc();
        if let Some(start) = self.opener(pc, |s| matches!(s, Statement::SelectCase(_))) {
            self.leave(start);
        }
        Ok(Status::Next)
    }
}
