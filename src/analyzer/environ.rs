//! The environ chain: lexical scopes and name resolution
//!
//! Scopes form a stack; each kind carries its own resolution policy and
//! the stack is walked innermost-first. A scope also owns the frame
//! slot counters: `frame_nslots` is the current live slot count,
//! `frame_maxslots` the high-water mark that becomes the frame size.

use super::Analyzer;
use crate::atom::Atom;
use crate::error::{Error, Result};
use crate::meaning::{Meaning, OpKind, Operation};
use crate::phrase::Phrase;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// One lexical scope with its frame counters
pub(crate) struct Scope {
    pub kind: ScopeKind,
    /// Slots currently allocated in the enclosing frame
    pub frame_nslots: usize,
    /// High-water mark of frame slots
    pub frame_maxslots: usize,
}

pub(crate) enum ScopeKind {
    /// Root scope, resolving through the builtin namespace
    Builtin,
    /// Module field scope: names resolve to module slot references
    Module {
        dictionary: Rc<IndexMap<Atom, usize>>,
        /// Per slot: whether the definiens is a lambda, i.e. a
        /// recursive function binding
        recursive: Vec<bool>,
    },
    /// Lambda parameter scope; owns the closure's capture list
    Lambda {
        params: FxHashMap<Atom, usize>,
        nonlocal_dictionary: FxHashMap<Atom, usize>,
        nonlocal_exprs: Vec<Rc<Operation>>,
        recursive: bool,
    },
    /// `let` binding scope
    Let { bindings: FxHashMap<Atom, usize> },
    /// `for` iteration variable scope
    For { name: Atom, slot: usize },
}

impl Scope {
    pub fn builtin() -> Self {
        Scope {
            kind: ScopeKind::Builtin,
            frame_nslots: 0,
            frame_maxslots: 0,
        }
    }
}

impl<'a> Analyzer<'a> {
    // === Scope management ===

    /// A module analyzes its slot thunks and elements in a fresh frame
    pub(crate) fn push_module_scope(
        &mut self,
        dictionary: Rc<IndexMap<Atom, usize>>,
        recursive: Vec<bool>,
    ) {
        self.scopes.push(Scope {
            kind: ScopeKind::Module {
                dictionary,
                recursive,
            },
            frame_nslots: 0,
            frame_maxslots: 0,
        });
    }

    /// A lambda starts a fresh frame with its parameters in slots
    /// `0..nargs`
    pub(crate) fn push_lambda_scope(&mut self, params: FxHashMap<Atom, usize>, recursive: bool) {
        let nslots = params.len();
        self.scopes.push(Scope {
            kind: ScopeKind::Lambda {
                params,
                nonlocal_dictionary: FxHashMap::default(),
                nonlocal_exprs: Vec::new(),
                recursive,
            },
            frame_nslots: nslots,
            frame_maxslots: nslots,
        });
    }

    /// A `let` extends the enclosing frame with its bindings
    pub(crate) fn push_let_scope(&mut self, bindings: FxHashMap<Atom, usize>) {
        let frame_nslots = self.current_nslots() + bindings.len();
        let frame_maxslots = self.current_maxslots().max(frame_nslots);
        self.scopes.push(Scope {
            kind: ScopeKind::Let { bindings },
            frame_nslots,
            frame_maxslots,
        });
    }

    /// A `for` extends the enclosing frame with the iteration variable
    pub(crate) fn push_for_scope(&mut self, name: Atom, slot: usize) {
        let frame_nslots = self.current_nslots() + 1;
        let frame_maxslots = self.current_maxslots().max(frame_nslots);
        self.scopes.push(Scope {
            kind: ScopeKind::For { name, slot },
            frame_nslots,
            frame_maxslots,
        });
    }

    pub(crate) fn pop_scope(&mut self) -> Scope {
        match self.scopes.pop() {
            Some(scope) => scope,
            None => unreachable!("scope stack underflow"),
        }
    }

    /// Pop a `let`/`for` scope, writing its high-water mark back into
    /// the parent: both share one activation frame.
    pub(crate) fn pop_scope_absorb(&mut self) {
        let child = self.pop_scope();
        if let Some(parent) = self.scopes.last_mut() {
            parent.frame_maxslots = child.frame_maxslots;
        }
    }

    pub(crate) fn current_nslots(&self) -> usize {
        self.scopes.last().map(|s| s.frame_nslots).unwrap_or(0)
    }

    pub(crate) fn current_maxslots(&self) -> usize {
        self.scopes.last().map(|s| s.frame_maxslots).unwrap_or(0)
    }

    // === Name resolution ===

    /// Resolve an identifier against the scope chain; exhaustion raises
    /// `"<name>: not defined"` at the identifier.
    pub(crate) fn lookup(&mut self, id: &Rc<Phrase>, atom: &Atom) -> Result<Meaning> {
        self.lookup_below(self.scopes.len(), id, atom)
    }

    /// Resolve against the scopes below `top` (exclusive), innermost
    /// first
    fn lookup_below(&mut self, top: usize, id: &Rc<Phrase>, atom: &Atom) -> Result<Meaning> {
        let mut depth = top;
        while depth > 0 {
            depth -= 1;
            if let Some(meaning) = self.single_lookup(depth, id, atom)? {
                return Ok(meaning);
            }
        }
        Err(Error::not_defined(atom.clone(), id.location().clone()))
    }

    /// Resolve in a single scope; `None` means "ask the parent"
    fn single_lookup(
        &mut self,
        depth: usize,
        id: &Rc<Phrase>,
        atom: &Atom,
    ) -> Result<Option<Meaning>> {
        match &self.scopes[depth].kind {
            ScopeKind::Builtin => Ok(self
                .namespace
                .get(atom)
                .map(|builtin| builtin.to_meaning(id))),
            ScopeKind::Module {
                dictionary,
                recursive,
            } => match dictionary.get(atom) {
                Some(&slot) => {
                    let kind = if recursive[slot] {
                        OpKind::NonlocalFunctionRef(slot)
                    } else {
                        OpKind::ModuleRef(slot)
                    };
                    Ok(Some(Meaning::Op(Operation::new(kind, id.clone()))))
                }
                None => Ok(None),
            },
            ScopeKind::Let { bindings } => Ok(bindings
                .get(atom)
                .map(|&slot| Meaning::Op(Operation::new(OpKind::LetRef(slot), id.clone())))),
            ScopeKind::For { name, slot } => {
                if name == atom {
                    Ok(Some(Meaning::Op(Operation::new(
                        OpKind::LetRef(*slot),
                        id.clone(),
                    ))))
                } else {
                    Ok(None)
                }
            }
            ScopeKind::Lambda { .. } => self.lambda_lookup(depth, id, atom),
        }
    }

    /// Lambda scope policy.
    ///
    /// Parameters resolve to `ArgRef`. In recursive mode everything
    /// else falls through to the parent chain, so the enclosing module
    /// scope can resolve the function's own name and its siblings.
    /// In non-recursive mode the result is definitive: a repeat capture
    /// reuses its nonlocal slot, and a fresh name is resolved through
    /// the parent chain: a constant is inlined verbatim, any other
    /// operation is recorded in the capture list.
    fn lambda_lookup(
        &mut self,
        depth: usize,
        id: &Rc<Phrase>,
        atom: &Atom,
    ) -> Result<Option<Meaning>> {
        if let ScopeKind::Lambda {
            params,
            nonlocal_dictionary,
            recursive,
            ..
        } = &self.scopes[depth].kind
        {
            if let Some(&slot) = params.get(atom) {
                return Ok(Some(Meaning::Op(Operation::new(
                    OpKind::ArgRef(slot),
                    id.clone(),
                ))));
            }
            if *recursive {
                return Ok(None);
            }
            if let Some(&slot) = nonlocal_dictionary.get(atom) {
                return Ok(Some(Meaning::Op(Operation::new(
                    OpKind::NonlocalRef(slot),
                    id.clone(),
                ))));
            }
        }

        let meaning = self.lookup_below(depth, id, atom)?;
        match meaning {
            // constants are inlined, never captured
            Meaning::Op(op) if op.is_constant() => Ok(Some(Meaning::Op(op))),
            Meaning::Op(op) => {
                if let ScopeKind::Lambda {
                    nonlocal_dictionary,
                    nonlocal_exprs,
                    ..
                } = &mut self.scopes[depth].kind
                {
                    let slot = nonlocal_exprs.len();
                    log::trace!("capturing {} into nonlocal slot {}", atom, slot);
                    nonlocal_dictionary.insert(atom.clone(), slot);
                    nonlocal_exprs.push(op);
                    Ok(Some(Meaning::Op(Operation::new(
                        OpKind::NonlocalRef(slot),
                        id.clone(),
                    ))))
                } else {
                    Ok(Some(Meaning::Op(op)))
                }
            }
            other => Ok(Some(other)),
        }
    }
}
