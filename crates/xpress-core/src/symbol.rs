use crate::{Interner, Name};

/// Where a declaration or reference came from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Location {
    pub file: Name,
    pub line: u32,
}

impl Location {
    pub fn new(file: Name, line: u32) -> Self {
        Self { file, line }
    }

    /// Render as `file:line`.
    pub fn render(&self, interner: &Interner) -> String {
        format!("{}:{}", interner.resolve(self.file), self.line)
    }
}

/// A name plus the location it was written at.
///
/// Used both as a dictionary key (through `name`) and as the anchor for
/// diagnostics (through `loc`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol {
    pub name: Name,
    pub loc: Location,
}

impl Symbol {
    pub fn new(name: Name, loc: Location) -> Self {
        Self { name, loc }
    }
}
