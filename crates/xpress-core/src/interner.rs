//! String interning for names and file paths.
//!
//! Converts strings into cheap integer handles (`Name`). EXPRESS identifiers
//! are case-insensitive, so `intern_ident` folds to ASCII lowercase before
//! interning; `intern` keeps the string exactly as given.

use indexmap::IndexSet;

/// A lightweight handle to an interned string.
///
/// Comparing two names is O(1). Names are ordered by insertion order,
/// not lexicographically. Use `Interner::resolve` for the text.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Name(u32);

impl Name {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// String interner. Deduplicates strings and returns `Name` handles.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    strings: IndexSet<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string verbatim.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(index) = self.strings.get_index_of(s) {
            return Name(index as u32);
        }

        let (index, _) = self.strings.insert_full(s.to_owned());
        Name(index as u32)
    }

    /// Intern an identifier, folding it to lowercase first.
    pub fn intern_ident(&mut self, s: &str) -> Name {
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            self.intern(&s.to_ascii_lowercase())
        } else {
            self.intern(s)
        }
    }

    /// Find an identifier without interning it.
    pub fn get_ident(&self, s: &str) -> Option<Name> {
        self.strings
            .get_index_of(s.to_ascii_lowercase().as_str())
            .map(|index| Name(index as u32))
    }

    /// Resolve a name back to its string.
    ///
    /// # Panics
    /// Panics if the name was not created by this interner.
    #[inline]
    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.0 as usize]
    }

    #[inline]
    pub fn try_resolve(&self, name: Name) -> Option<&str> {
        self.strings.get_index(name.0 as usize).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
