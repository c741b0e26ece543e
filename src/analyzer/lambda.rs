//! Lambda analysis

use super::environ::ScopeKind;
use super::Analyzer;
use crate::atom::Atom;
use crate::error::{Error, Result};
use crate::meaning::{Meaning, OpKind, Operation};
use crate::phrase::Phrase;
use rustc_hash::FxHashMap;
use std::rc::Rc;

impl<'a> Analyzer<'a> {
    /// Analyze `left -> right`.
    ///
    /// The left side is a single identifier (slot 0) or a paren phrase
    /// of identifiers, one slot each in order. The body is analyzed in
    /// a lambda scope whose lookup policy assembles the nonlocal
    /// capture list; the recursion flag comes from the
    /// definition-collection side table.
    pub(crate) fn analyze_lambda(
        &mut self,
        ph: &Rc<Phrase>,
        left: &Rc<Phrase>,
        right: &Rc<Phrase>,
    ) -> Result<Meaning> {
        // phase 1: parameter dictionary
        let mut params: FxHashMap<Atom, usize> = FxHashMap::default();
        match &**left {
            Phrase::Identifier { atom, .. } => {
                params.insert(atom.clone(), 0);
            }
            Phrase::Paren(delimited) => {
                for (slot, arg) in delimited.args.iter().enumerate() {
                    match arg.expr.as_identifier() {
                        Some(atom) => {
                            params.insert(atom.clone(), slot);
                        }
                        None => return Err(Error::not_a_parameter(arg.expr.location().clone())),
                    }
                }
            }
            _ => return Err(Error::not_a_parameter(left.location().clone())),
        }
        let nargs = params.len();

        // phase 2: analyze the body in the parameter scope
        let recursive = self.is_marked_recursive(ph);
        self.push_lambda_scope(params, recursive);
        let body = self.analyze_op(right)?;
        let scope = self.pop_scope();
        let nonlocals = match scope.kind {
            ScopeKind::Lambda { nonlocal_exprs, .. } => nonlocal_exprs,
            _ => Vec::new(),
        };
        log::trace!(
            "lambda nargs={} nslots={} captures={}",
            nargs,
            scope.frame_maxslots,
            nonlocals.len()
        );
        Ok(Meaning::Op(Operation::new(
            OpKind::Lambda {
                body,
                nonlocals,
                nargs,
                nslots: scope.frame_maxslots,
            },
            ph.clone(),
        )))
    }
}
