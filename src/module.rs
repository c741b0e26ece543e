//! Runtime module record
//!
//! A [`Module`] is the runtime counterpart of `OpKind::Module`: ordered
//! field slots, the analyzer-built name→slot dictionary (shared by
//! `Rc`), and the module's side-effecting elements.

use crate::atom::Atom;
use crate::meaning::Operation;
use crate::value::{Closure, Value};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
pub struct Module {
    pub dictionary: Rc<IndexMap<Atom, usize>>,
    pub slots: Rc<Vec<Value>>,
    pub elements: Vec<Rc<Operation>>,
}

impl Module {
    pub fn new(
        dictionary: Rc<IndexMap<Atom, usize>>,
        slots: Vec<Value>,
        elements: Vec<Rc<Operation>>,
    ) -> Self {
        Module {
            dictionary,
            slots: Rc::new(slots),
            elements,
        }
    }

    /// Fetch a slot value. A raw lambda slot is promoted to a closure
    /// over this module's slots, which is what makes recursive and
    /// mutually recursive fields work at runtime.
    pub fn get(&self, slot: usize) -> Value {
        match &self.slots[slot] {
            Value::Lambda(lambda) => Value::Closure(Rc::new(Closure {
                lambda: lambda.clone(),
                env: self.slots.clone(),
            })),
            value => value.clone(),
        }
    }

    /// Resolve a field by name through the dictionary
    pub fn field(&self, name: &str) -> Option<Value> {
        self.dictionary.get(name).map(|&slot| self.get(slot))
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, &slot)) in self.dictionary.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}={}", name, self.get(slot))?;
        }
        write!(f, "}}")
    }
}
