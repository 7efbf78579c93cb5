use super::ast::Statement;

/// One program line: a statement and the indent level the parser
/// assigned to it. Indent levels start at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    indent: usize,
    statement: Statement,
}

impl Line {
    pub fn new(indent: usize, statement: Statement) -> Line {
        Line { indent, statement }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn into_statement(self) -> Statement {
        self.statement
    }

    pub fn label(&self) -> Option<&str> {
        match &self.statement {
            Statement::Label(name) => Some(name),
            _ => None,
        }
    }
}

/// Assigns indent levels from each statement's block role, the way the
/// parser lays out a well-formed program.
pub fn indent(statements: Vec<Statement>) -> Vec<Line> {
    use super::ast::Role;
    let mut level = 0usize;
    let mut lines = Vec::with_capacity(statements.len());
    for statement in statements {
        let indent = match statement.role() {
            Role::Plain => level,
            Role::Opener => {
                level += 1;
                level - 1
            }
            Role::Clause => level.saturating_sub(1),
            Role::Closer => {
                level = level.saturating_sub(1);
                level
            }
        };
        lines.push(Line::new(indent, statement));
    }
    lines
}
