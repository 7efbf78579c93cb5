/*!
## Rust Machine Module

This Rust module is the EduBASIC execution engine. It steps a flat,
indent-structured program one statement at a time, keeping block
constructs on a control frame stack.

*/

pub use crate::lang::Address;

/// Nested SUB and GOSUB calls.
pub const MAX_CALL_DEPTH: usize = 1000;
/// Active block constructs across all calls.
pub const MAX_CONTROL_DEPTH: usize = 4000;
/// Elements in one array.
pub const MAX_ARRAY_LEN: usize = 1 << 20;
/// Bytes in one file.
pub const MAX_FILE_LEN: usize = 16 << 20;

mod block;
mod context;
mod eval;
mod exec;
mod frame;
mod function;
mod operation;
mod program;
mod runtime;
mod stack;
mod val;

pub use context::Context;
pub use context::KeyState;
pub use exec::Machine;
pub use exec::Status;
pub use frame::Frame;
pub use frame::FrameState;
pub use frame::TryPhase;
pub use function::Function;
pub use operation::Operation;
pub use operation::{FALSE, TRUE};
pub use program::Program;
pub use runtime::Event;
pub use runtime::Runtime;
pub use runtime::Step;
pub use stack::Stack;
pub use val::Array;
pub use val::Dimension;
pub use val::Val;
pub use val::ValType;
