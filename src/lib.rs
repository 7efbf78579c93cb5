//! # EduBASIC
//!
//! The execution engine of EduBASIC, a line-oriented BASIC for learners:
//! typed values, labels with GOTO and GOSUB, structured blocks, SUBs with
//! by-reference parameters, and TRY/CATCH.
//!
//! The engine steps one statement at a time so an editor can pause,
//! inspect and single-step a program. Parsing, drawing, sound and files
//! belong to the host; see the [`host`] traits.
//!
//! Run the `edubasic` binary for a demonstration in the terminal.
//! Set `RUST_LOG=edubasic=debug` to watch calls, returns and recovered
//! errors.

#[path = "doc/introduction.rs"]
#[allow(non_snake_case)]
pub mod _Introduction;

pub mod host;
pub mod lang;
pub mod mach;
pub mod term;
