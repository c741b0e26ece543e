//! Ordered definition collection; module and record analysis

use super::{Analyzer, Definition};
use crate::atom::Atom;
use crate::error::{Error, Result};
use crate::meaning::{Meaning, OpKind, Operation};
use crate::phrase::{DelimitedPhrase, Phrase};
use crate::value::{Lambda, Value};
use indexmap::IndexMap;
use std::rc::Rc;

/// Definitions in insertion order with the parallel list of definiens
/// phrases. Slot indices are dense, `0..N-1`, assigned in textual
/// order.
pub(crate) struct Bindings {
    dictionary: IndexMap<Atom, usize>,
    slot_phrases: Vec<Rc<Phrase>>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings {
            dictionary: IndexMap::new(),
            slot_phrases: Vec::new(),
        }
    }

    /// Add a definition, rejecting duplicate names. A lambda definiens
    /// is marked recursive so its later analysis lets the module scope
    /// resolve the name first.
    pub fn add_definition(&mut self, def: Definition, analyzer: &mut Analyzer<'_>) -> Result<()> {
        if self.dictionary.contains_key(&def.name) {
            return Err(Error::multiply_defined(def.name, def.name_location));
        }
        let slot = self.slot_phrases.len();
        self.dictionary.insert(def.name, slot);
        if def.definiens.is_lambda() {
            analyzer.mark_recursive(&def.definiens);
        }
        self.slot_phrases.push(def.definiens);
        Ok(())
    }

    pub fn is_recursive_function(&self, slot: usize) -> bool {
        self.slot_phrases[slot].is_lambda()
    }

    pub fn len(&self) -> usize {
        self.slot_phrases.len()
    }
}

/// The statements of a module body: the items of a semicolon phrase,
/// or the body itself
fn statements(body: &Rc<Phrase>) -> Vec<Rc<Phrase>> {
    match &**body {
        Phrase::Semicolons { args, .. } => args.iter().map(|a| a.expr.clone()).collect(),
        _ => vec![body.clone()],
    }
}

/// A recursive module binding stores the raw lambda, closed over the
/// module's slots at access time
fn lambda_value(expr: &Rc<Operation>) -> Value {
    match &expr.kind {
        OpKind::Lambda {
            body,
            nargs,
            nslots,
            ..
        } => Value::Lambda(Rc::new(Lambda {
            body: body.clone(),
            nargs: *nargs,
            nslots: *nslots,
        })),
        _ => Value::Thunk(expr.clone()),
    }
}

impl<'a> Analyzer<'a> {
    /// Module analysis.
    ///
    /// Phase 1 collects definitions into a [`Bindings`] dictionary and
    /// the remaining statements into the ordered element list. Phase 2
    /// analyzes every slot and element inside the module's field scope:
    /// lambda bindings become raw lambda values, everything else a
    /// thunk.
    pub(crate) fn analyze_module_phrase(
        &mut self,
        ph: &Rc<Phrase>,
        body: &Rc<Phrase>,
    ) -> Result<Meaning> {
        let mut fields = Bindings::new();
        let mut element_phrases: Vec<Rc<Phrase>> = Vec::new();
        for statement in statements(body) {
            match self.analyze_def(&statement)? {
                Some(def) => fields.add_definition(def, self)?,
                None => element_phrases.push(statement),
            }
        }
        log::debug!(
            "module with {} fields, {} elements",
            fields.len(),
            element_phrases.len()
        );

        let dictionary = Rc::new(fields.dictionary.clone());
        let recursive: Vec<bool> = (0..fields.len())
            .map(|slot| fields.is_recursive_function(slot))
            .collect();
        self.push_module_scope(dictionary.clone(), recursive.clone());

        let mut slots = Vec::with_capacity(fields.len());
        for (slot, phrase) in fields.slot_phrases.iter().enumerate() {
            let expr = self.analyze_op(phrase)?;
            if recursive[slot] {
                slots.push(lambda_value(&expr));
            } else {
                slots.push(Value::Thunk(expr));
            }
        }
        let mut elements = Vec::with_capacity(element_phrases.len());
        for phrase in &element_phrases {
            elements.push(self.analyze_op(phrase)?);
        }

        let scope = self.pop_scope();
        Ok(Meaning::Op(Operation::new(
            OpKind::Module {
                dictionary,
                slots,
                elements,
                frame_nslots: scope.frame_maxslots,
            },
            ph.clone(),
        )))
    }

    /// Record analysis: every element must be a definition; duplicates
    /// are rejected. Unlike a module, a record introduces no scope, so
    /// field initializers see only the outer environment.
    pub(crate) fn analyze_record(
        &mut self,
        ph: &Rc<Phrase>,
        delimited: &DelimitedPhrase,
    ) -> Result<Meaning> {
        let mut fields: IndexMap<Atom, Rc<Operation>> = IndexMap::new();
        for arg in &delimited.args {
            match self.analyze_def(&arg.expr)? {
                Some(def) => {
                    if fields.contains_key(&def.name) {
                        return Err(Error::multiply_defined(def.name, def.name_location));
                    }
                    let op = self.analyze_op(&def.definiens)?;
                    fields.insert(def.name, op);
                }
                None => return Err(Error::not_a_definition(arg.expr.location().clone())),
            }
        }
        Ok(Meaning::Op(Operation::new(
            OpKind::Record { fields },
            ph.clone(),
        )))
    }
}
