use super::{Address, Stack, Val, MAX_CONTROL_DEPTH};
use crate::lang::ast::Block;
use crate::lang::Error;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Control frames
///
/// One entry per active block construct. `start` is the opening line,
/// `end` the line holding its closing keyword. `call_depth` is the
/// context's call depth when the frame was entered; frames deeper than
/// the current call depth are discarded on return.

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub start: Address,
    pub end: Address,
    pub call_depth: usize,
    pub state: FrameState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameState {
    If {
        branch_taken: bool,
    },
    /// `until` marks an UNTIL..UEND loop.
    While {
        until: bool,
    },
    Do,
    /// `counter` is the unconverted running value; `assigned` is what
    /// was last stored in the variable, so a body that assigns the
    /// variable moves the counter too.
    For {
        var: Rc<str>,
        start: Val,
        end: Val,
        step: Val,
        counter: Val,
        assigned: Val,
    },
    Select {
        selector: Val,
        matched: bool,
    },
    Sub,
    Try {
        phase: TryPhase,
        catch: Option<Address>,
        finally: Option<Address>,
        pending: Option<Error>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryPhase {
    Body,
    Catch,
    Finally,
}

impl Frame {
    pub fn kind(&self) -> Block {
        match self.state {
            FrameState::If { .. } => Block::If,
            FrameState::While { .. } => Block::While,
            FrameState::Do => Block::Do,
            FrameState::For { .. } => Block::For,
            FrameState::Select { .. } => Block::Select,
            FrameState::Sub => Block::Sub,
            FrameState::Try { .. } => Block::Try,
        }
    }
}

pub type Frames = Stack<Frame>;

pub fn new_frames() -> Frames {
    Stack::new("TOO MANY NESTED BLOCKS", MAX_CONTROL_DEPTH)
}

/// Push a frame. Re-entering a construct, as a GOTO loop does, first
/// drops the stale frame for the same line and everything above it.
pub fn enter(frames: &mut Frames, frame: Frame) -> Result<()> {
    if let Some(index) = find(frames, frame.start, frame.call_depth) {
        frames.truncate(index);
    }
    frames.push(frame)
}

/// Topmost frame opened at `start` within call depth `call_depth`.
pub fn find(frames: &Frames, start: Address, call_depth: usize) -> Option<usize> {
    frames.rposition(|f| f.start == start && f.call_depth == call_depth)
}

/// Drop the frame opened at `start` and everything above it.
pub fn leave(frames: &mut Frames, start: Address, call_depth: usize) -> Option<Frame> {
    let index = find(frames, start, call_depth)?;
    let frame = frames.get(index).cloned();
    frames.truncate(index);
    frame
}

/// Drop frames belonging to calls deeper than `call_depth`.
pub fn unwind_calls(frames: &mut Frames, call_depth: usize) {
    let keep = frames
        .rposition(|f| f.call_depth <= call_depth)
        .map_or(0, |i| i + 1);
    frames.truncate(keep);
}
