use super::frame::{self, Frame, FrameState, Frames};
use super::{block, Address, Context, Program, Val};
use crate::error;
use crate::host::Host;
use crate::lang::ast::{Expression, Statement};
use crate::lang::Error;
use std::time::Duration;

mod assign;
mod branch;
mod io;
mod jump;
mod looping;

type Result<T> = std::result::Result<T, Error>;

/// What the driver does after a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Next,
    Goto(Address),
    Return,
    End,
}

/// ## Machine
///
/// Borrowed view of one session for the duration of a single statement.

pub struct Machine<'a> {
    pub program: &'a Program,
    pub context: &'a mut Context,
    pub frames: &'a mut Frames,
    pub host: &'a mut Host,
    pub sleep: Option<Duration>,
}

impl<'a> Machine<'a> {
    pub fn new(
        program: &'a Program,
        context: &'a mut Context,
        frames: &'a mut Frames,
        host: &'a mut Host,
    ) -> Machine<'a> {
        Machine {
            program,
            context,
            frames,
            host,
            sleep: None,
        }
    }

    pub fn pc(&self) -> Address {
        self.context.pc()
    }

    pub fn execute(&mut self, statement: &Statement) -> Result<Status> {
        use Statement::*;
        match statement {
            Rem(_) | Label(_) => Ok(Status::Next),
            Let(var, expr) => self.r#let(var, expr),
            Local(name, init) => self.local(name, init.as_ref()),
            Dim(name, axes) => self.dim(name, axes),
            Swap(a, b) => self.swap(a, b),
            Push(name, expr) => self.push(name, expr),
            Pop(name, var) => self.pop(name, var),
            Shift(name, var) => self.shift(name, var),
            Unshift(name, expr) => self.unshift(name, expr),
            Print(items) => self.print(items),

            If(cond) => self.r#if(cond, false),
            Unless(cond) => self.r#if(cond, true),
            ElseIf(cond) => self.else_if(cond),
            Else => self.r#else(),
            EndIf | EndUnless => self.end_if(),
            While(cond) => self.r#while(cond, false),
            Until(cond) => self.r#while(cond, true),
            Wend | Uend => self.wend(),
            Do(cond) => self.r#do(cond),
            Loop(cond) => self.r#loop(cond),
            For(var, from, to, step) => self.r#for(var, from, to, step.as_ref()),
            Next(var) => self.next(var.as_deref()),
            SelectCase(expr) => self.select_case(expr),
            Case(tests) => self.case(tests),
            EndSelect => self.end_select(),
            Try => self.r#try(),
            Catch(_) => self.catch(),
            Finally => self.finally(),
            EndTry => self.end_try(),
            Throw(expr) => self.throw(expr),
            Exit(kind, name) => self.exit(*kind, name.as_deref()),
            Continue(kind, name) => self.r#continue(*kind, name.as_deref()),

            Goto(label) => self.goto(label),
            Gosub(label) => self.gosub(label),
            Return | EndSub => Ok(Status::Return),
            Sub(..) => self.sub(),
            Call(name, args) => self.call(name, args),
            End => Ok(Status::End),

            Randomize(seed) => self.randomize(seed.as_ref()),
            Sleep(seconds) => self.sleep(seconds),
            View(target) => self.view(target),
            Color(fg, bg) => self.color(fg, bg.as_ref()),
            Locate(row, col) => self.locate(row, col),
            Cls => self.cls(),
            Draw(shape, args, filled) => self.draw(*shape, args, *filled),
            Tempo(bpm) => self.tempo(bpm),
            Volume(level) => self.volume(level),
            Voice(index) => self.voice(index),
            Play(voice, mml) => self.play(voice, mml),
            PlayStop => self.play_stop(),
            Open(path, mode, var) => self.open(path, *mode, var),
            Close(handle) => self.close(handle),
            ReadBytes(handle, count, var) => self.read_bytes(handle, count, var),
            WriteBytes(handle, data) => self.write_bytes(handle, data),
            Seek(handle, pos) => self.seek(handle, pos),
            ReadFile(path, var) => self.read_file(path, var),
            WriteFile(path, data) => self.write_file(path, data),
        }
    }

    /// Conditions must be INTEGER; nonzero is true.
    pub fn condition(&mut self, expr: &Expression) -> Result<bool> {
        match self.eval(expr)? {
            Val::Integer(n) => Ok(n != 0),
            v => Err(error!(TypeMismatch; &format!("Condition must be INTEGER, got {}", v.val_type()))),
        }
    }

    pub fn statement(&self, index: Address) -> Result<&'a Statement> {
        match self.program.get(index) {
            Some(statement) => Ok(statement),
            None => Err(error!(InternalError; "LINE OUT OF RANGE")),
        }
    }

    fn closer<F>(&self, start: Address, pred: F) -> Option<Address>
    where
        F: Fn(&Statement) -> bool,
    {
        block::closer(self.program, start, pred)
    }

    fn opener<F>(&self, at: Address, pred: F) -> Option<Address>
    where
        F: Fn(&Statement) -> bool,
    {
        block::opener(self.program, at, pred)
    }

    fn enter(&mut self, start: Address, end: Address, state: FrameState) -> Result<()> {
        let call_depth = self.context.depth();
        frame::enter(
            self.frames,
            Frame {
                start,
                end,
                call_depth,
                state,
            },
        )
    }

    /// Index into the frame stack of the frame opened at `start`.
    fn frame_at(&self, start: Address) -> Option<usize> {
        frame::find(self.frames, start, self.context.depth())
    }

    fn leave(&mut self, start: Address) -> Option<Frame> {
        frame::leave(self.frames, start, self.context.depth())
    }
}
