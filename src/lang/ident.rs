// Used by the engine to type variables from their spelling.

/// The trailing character of a variable name fixes its type.
/// Array names carry a rank suffix after the sigil: `scores%[]`, `grid#[,]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sigil {
    Integer,
    Real,
    String,
    Complex,
    None,
}

impl Sigil {
    pub fn of(name: &str) -> Sigil {
        match base_name(name).chars().last() {
            Some('%') => Sigil::Integer,
            Some('#') => Sigil::Real,
            Some('$') => Sigil::String,
            Some('&') => Sigil::Complex,
            _ => Sigil::None,
        }
    }

    pub fn as_char(self) -> Option<char> {
        match self {
            Sigil::Integer => Some('%'),
            Sigil::Real => Some('#'),
            Sigil::String => Some('$'),
            Sigil::Complex => Some('&'),
            Sigil::None => None,
        }
    }
}

pub fn is_array(name: &str) -> bool {
    name.ends_with(']') && name.contains('[')
}

/// Number of axes named by the rank suffix; zero for scalars.
pub fn rank(name: &str) -> usize {
    if !is_array(name) {
        return 0;
    }
    match name.rfind('[') {
        Some(open) => name[open..].matches(',').count() + 1,
        None => 0,
    }
}

/// The name without its rank suffix.
pub fn base_name(name: &str) -> &str {
    if is_array(name) {
        if let Some(open) = name.rfind('[') {
            return &name[..open];
        }
    }
    name
}

/// Lookup key; names are case-insensitive.
pub fn key(name: &str) -> String {
    name.to_ascii_uppercase()
}
