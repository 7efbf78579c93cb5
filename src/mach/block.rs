use super::{Address, Program};
use crate::lang::ast::{Role, Statement};

// Block boundaries come from indent levels. An opener, its clauses and its
// closer share one indent; the body sits deeper. Scanning stops at the
// first shallower line or at a same-indent line that is not a clause.

/// Next line after `start` at the same indent satisfying `pred`.
pub fn closer<F>(program: &Program, start: Address, pred: F) -> Option<Address>
where
    F: Fn(&Statement) -> bool,
{
    let base = program.indent(start)?;
    let mut index = start + 1;
    while let Some(line) = program.line(index) {
        if line.indent() < base {
            return None;
        }
        if line.indent() == base {
            let statement = line.statement();
            if pred(statement) {
                return Some(index);
            }
            if statement.role() != Role::Clause {
                return None;
            }
        }
        index += 1;
    }
    None
}

/// Nearest line before `at` at the same indent satisfying `pred`.
pub fn opener<F>(program: &Program, at: Address, pred: F) -> Option<Address>
where
    F: Fn(&Statement) -> bool,
{
    let base = program.indent(at)?;
    let mut index = at;
    while index > 0 {
        index -= 1;
        let line = program.line(index)?;
        if line.indent() < base {
            return None;
        }
        if line.indent() == base {
            let statement = line.statement();
            if pred(statement) {
                return Some(index);
            }
            if statement.role() != Role::Clause {
                return None;
            }
        }
    }
    None
}
