use super::Address;
use crate::lang::ast::Statement;
use crate::lang::{ident, indent, Line};
use std::collections::HashMap;

/// ## Program
///
/// A flat list of lines plus a label index. Editing operations keep
/// the label index in step with the shifted line numbers.

#[derive(Debug, Clone, Default)]
pub struct Program {
    lines: Vec<Line>,
    labels: HashMap<String, Address>,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    /// Build from parsed statements, computing indent levels.
    pub fn from_statements(statements: Vec<Statement>) -> Program {
        Program::from_lines(indent(statements))
    }

    pub fn from_lines(lines: Vec<Line>) -> Program {
        let mut program = Program {
            lines,
            labels: HashMap::new(),
        };
        program.rebuild_label_map();
        program
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: Address) -> Option<&Statement> {
        self.lines.get(index).map(Line::statement)
    }

    pub fn line(&self, index: Address) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn indent(&self, index: Address) -> Option<usize> {
        self.lines.get(index).map(Line::indent)
    }

    /// Insert before `index`; an index past the end appends.
    pub fn insert(&mut self, index: Address, line: Line) {
        let index = index.min(self.lines.len());
        for addr in self.labels.values_mut() {
            if *addr >= index {
                *addr += 1;
            }
        }
        let label = line.label().map(ident::key);
        self.lines.insert(index, line);
        if let Some(key) = label {
            match self.labels.get(&key) {
                Some(&existing) if existing < index => {}
                _ => {
                    self.labels.insert(key, index);
                }
            }
        }
    }

    pub fn append(&mut self, line: Line) {
        self.insert(self.lines.len(), line);
    }

    /// Remove a line. Out of range is a no-op.
    pub fn delete(&mut self, index: Address) -> Option<Line> {
        if index >= self.lines.len() {
            return None;
        }
        let line = self.lines.remove(index);
        if line.label().is_some() {
            self.rebuild_label_map();
        } else {
            for addr in self.labels.values_mut() {
                if *addr > index {
                    *addr -= 1;
                }
            }
        }
        Some(line)
    }

    pub fn replace(&mut self, index: Address, line: Line) -> Option<Line> {
        let slot = self.lines.get_mut(index)?;
        let old = std::mem::replace(slot, line);
        if old.label().is_some() || self.lines[index].label().is_some() {
            self.rebuild_label_map();
        }
        Some(old)
    }

    pub fn label_index(&self, name: &str) -> Option<Address> {
        self.labels.get(&ident::key(name)).copied()
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains_key(&ident::key(name))
    }

    /// The first line carrying each label wins.
    pub fn rebuild_label_map(&mut self) {
        self.labels.clear();
        for (index, line) in self.lines.iter().enumerate() {
            if let Some(label) = line.label() {
                self.labels.entry(ident::key(label)).or_insert(index);
            }
        }
    }

    /// Line holding `SUB name`.
    pub fn sub_index(&self, name: &str) -> Option<Address> {
        self.lines.iter().position(|line| match line.statement() {
            Statement::Sub(sub_name, _) => sub_name.eq_ignore_ascii_case(name),
            _ => false,
        })
    }
}
