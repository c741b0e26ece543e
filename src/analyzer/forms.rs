//! `let` and `for` analysis

use super::Analyzer;
use crate::atom::Atom;
use crate::error::{Error, Result};
use crate::meaning::{Meaning, OpKind, Operation};
use crate::phrase::Phrase;
use crate::value::Value;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::rc::Rc;

impl<'a> Analyzer<'a> {
    /// Analyze `let (def, ...) body`.
    ///
    /// Bindings are mutually recursive. Each gets a fresh slot in the
    /// enclosing frame, allocated from the current slot count in
    /// textual order; every definiens becomes a thunk in the pre-sized
    /// values array. Lazy evaluation with cycle detection is the
    /// evaluator's responsibility.
    pub(crate) fn analyze_let(
        &mut self,
        ph: &Rc<Phrase>,
        args: &Rc<Phrase>,
        body: &Rc<Phrase>,
    ) -> Result<Meaning> {
        let parens = match args.as_paren() {
            Some(parens) => parens,
            None => return Err(Error::malformed_argument("let", args.location().clone())),
        };

        // phase 1: a dictionary of bindings, one fresh slot each
        let first_slot = self.current_nslots();
        let mut bound: IndexMap<Atom, (usize, Rc<Phrase>)> = IndexMap::new();
        let mut slot = first_slot;
        for arg in &parens.args {
            let def = match self.analyze_def(&arg.expr)? {
                Some(def) => def,
                None => return Err(Error::not_a_definition(arg.expr.location().clone())),
            };
            if bound.contains_key(&def.name) {
                return Err(Error::multiply_defined(def.name, def.name_location));
            }
            bound.insert(def.name, (slot, def.definiens));
            slot += 1;
        }

        // phase 2: analyze definientia and body in the binding scope
        let lookup: FxHashMap<Atom, usize> = bound
            .iter()
            .map(|(name, (slot, _))| (name.clone(), *slot))
            .collect();
        self.push_let_scope(lookup);
        let mut values = vec![Value::Null; bound.len()];
        for (slot, phrase) in bound.values() {
            let expr = self.analyze_op(phrase)?;
            values[slot - first_slot] = Value::Thunk(expr);
        }
        let body = self.analyze_op(body)?;
        self.pop_scope_absorb();

        Ok(Meaning::Op(Operation::new(
            OpKind::Let {
                first_slot,
                values,
                body,
            },
            ph.clone(),
        )))
    }

    /// Analyze `for (name = list) body`.
    ///
    /// The argument must be a paren phrase holding exactly one
    /// definition whose left side is an identifier. The list is
    /// analyzed in the outer scope; the body sees only the iteration
    /// variable on top of it.
    pub(crate) fn analyze_for(
        &mut self,
        ph: &Rc<Phrase>,
        args: &Rc<Phrase>,
        body: &Rc<Phrase>,
    ) -> Result<Meaning> {
        let parens = match args.as_paren() {
            Some(parens) => parens,
            None => return Err(Error::malformed_argument("for", args.location().clone())),
        };
        if parens.args.len() != 1 {
            return Err(Error::malformed_argument("for", args.location().clone()));
        }
        let defexpr = &parens.args[0].expr;
        let (left, right) = match &**defexpr {
            Phrase::Definition { left, right, .. } => (left, right),
            _ => {
                return Err(Error::structural(
                    "for: not a definition",
                    defexpr.location().clone(),
                ))
            }
        };
        let name = match left.as_identifier() {
            Some(atom) => atom.clone(),
            None => {
                return Err(Error::structural(
                    "for: not an identifier",
                    left.location().clone(),
                ))
            }
        };

        let list = self.analyze_op(right)?;

        let slot = self.current_nslots();
        self.push_for_scope(name, slot);
        let body = self.analyze_op(body)?;
        self.pop_scope_absorb();

        Ok(Meaning::Op(Operation::new(
            OpKind::For { slot, list, body },
            ph.clone(),
        )))
    }
}
