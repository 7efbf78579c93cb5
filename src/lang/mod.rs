/*!
# Rust Language Module

This Rust module defines the boundary with the EduBASIC parser:
the statement tree, variable naming rules, and errors.

*/

/// Index of a line in the flat program.
pub type Address = usize;

#[macro_use]
mod error;
pub mod ident;
mod line;

pub use error::Error;
pub use error::ErrorCode;
pub use line::indent;
pub use line::Line;

pub mod ast;
