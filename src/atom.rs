//! Interned identifier names

use rustc_hash::FxHashSet;
use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

/// An identifier name.
///
/// Equality and hashing are by content; clones share a single allocation
/// via `Rc<str>`, so an `Atom` is cheap to copy into the dictionaries the
/// analyzer builds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(Rc<str>);

impl Atom {
    pub fn new(name: &str) -> Self {
        Atom(Rc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        Atom::new(name)
    }
}

impl Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Deduplication table for atoms.
///
/// Interning a name twice hands back a clone of the first allocation, so
/// every occurrence of an identifier in a script shares one `Rc<str>`.
#[derive(Debug, Default)]
pub struct AtomTable {
    atoms: FxHashSet<Atom>,
}

impl AtomTable {
    pub fn new() -> Self {
        AtomTable {
            atoms: FxHashSet::default(),
        }
    }

    /// Intern a name, returning a shared `Atom`
    pub fn intern(&mut self, name: &str) -> Atom {
        if let Some(atom) = self.atoms.get(name) {
            return atom.clone();
        }
        let atom = Atom::new(name);
        self.atoms.insert(atom.clone());
        atom
    }
}
