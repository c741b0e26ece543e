//! Semantic analysis
//!
//! Converts the phrase tree into the Meaning IR by:
//! 1. Resolving every identifier to a slot-indexed reference node
//! 2. Computing closure captures (with constant inlining)
//! 3. Laying out activation frames via the scope counters
//! 4. Collecting module/record/`let` definitions in textual order
//!
//! Analysis is single-pass over each phrase, but binding constructs are
//! internally two-phase: definitions are collected first, then every
//! definiens and element is analyzed inside the binding scope.

mod bindings;
mod environ;
mod forms;
mod lambda;

use crate::atom::Atom;
use crate::builtin::Namespace;
use crate::error::{Error, Result};
use crate::meaning::{Argv, Meaning, OpKind, Operation};
use crate::phrase::{Phrase, PhraseArg};
use crate::source::Location;
use crate::token::{Token, TokenKind};
use crate::value::Value;
use environ::Scope;
use rustc_hash::FxHashSet;
use std::rc::Rc;

/// A name bound to a definiens phrase, produced by `analyze_def`
#[derive(Debug, Clone)]
pub struct Definition {
    pub name: Atom,
    pub name_location: Location,
    pub definiens: Rc<Phrase>,
}

/// Analyze a program (or any phrase) as a single expression under the
/// builtin scope
pub fn analyze_program(program: &Rc<Phrase>, namespace: &Namespace) -> Result<Rc<Operation>> {
    Analyzer::new(namespace).analyze_op(program)
}

/// Analyze a module phrase under the builtin scope
pub fn analyze_module(module: &Rc<Phrase>, namespace: &Namespace) -> Result<Rc<Operation>> {
    Analyzer::new(namespace).analyze_op(module)
}

/// The analysis context: the scope stack plus the recursion side table
pub struct Analyzer<'a> {
    namespace: &'a Namespace,
    scopes: Vec<Scope>,
    /// Lambda definiens phrases marked recursive during definition
    /// collection, keyed by phrase identity. The phrase tree itself
    /// stays immutable.
    recursive_lambdas: FxHashSet<usize>,
}

impl<'a> Analyzer<'a> {
    pub fn new(namespace: &'a Namespace) -> Self {
        Analyzer {
            namespace,
            scopes: vec![Scope::builtin()],
            recursive_lambdas: FxHashSet::default(),
        }
    }

    pub(crate) fn mark_recursive(&mut self, phrase: &Rc<Phrase>) {
        self.recursive_lambdas.insert(Rc::as_ptr(phrase) as usize);
    }

    pub(crate) fn is_marked_recursive(&self, phrase: &Rc<Phrase>) -> bool {
        self.recursive_lambdas
            .contains(&(Rc::as_ptr(phrase) as usize))
    }

    /// Analyze a phrase into its meaning
    pub fn analyze(&mut self, ph: &Rc<Phrase>) -> Result<Meaning> {
        match &**ph {
            Phrase::Identifier { atom, .. } => self.lookup(ph, atom),

            Phrase::Numeral(location) => {
                // strict: the entire lexeme must parse
                let num: f64 = location
                    .range()
                    .parse()
                    .map_err(|_| Error::structural("invalid numeral", location.clone()))?;
                Ok(Meaning::Op(Operation::new(
                    OpKind::Constant(Value::Num(num)),
                    ph.clone(),
                )))
            }

            Phrase::StringLit(location) => {
                // the lexeme includes the surrounding quotes
                let text = location.range();
                let inner = &text[1..text.len() - 1];
                Ok(Meaning::Op(Operation::new(
                    OpKind::Constant(Value::Str(Rc::from(inner))),
                    ph.clone(),
                )))
            }

            Phrase::Empty(_) => Ok(Meaning::Op(Operation::new(
                OpKind::Sequence(Vec::new()),
                ph.clone(),
            ))),

            Phrase::Unary { op, arg, .. } => {
                let arg = self.analyze_op(arg)?;
                let kind = match op.kind {
                    TokenKind::Not => OpKind::Not(arg),
                    _ => OpKind::Prefix { op: op.kind, arg },
                };
                Ok(Meaning::Op(Operation::new(kind, ph.clone())))
            }

            Phrase::Binary {
                left, op, right, ..
            } => self.analyze_binary(ph, left, *op, right),

            Phrase::Paren(delimited) => self.analyze_sequence_like(ph, &delimited.args),
            Phrase::Commas { args, .. } => self.analyze_sequence_like(ph, args),

            Phrase::Semicolons { args, .. } => {
                if args.len() == 1 {
                    Ok(Meaning::Op(self.analyze_op(&args[0].expr)?))
                } else {
                    Err(Error::unimplemented("; phrase", ph.location().clone()))
                }
            }

            Phrase::Bracket(delimited) => {
                let mut elements = Vec::with_capacity(delimited.args.len());
                for arg in &delimited.args {
                    elements.push(self.analyze_op(&arg.expr)?);
                }
                Ok(Meaning::Op(Operation::new(OpKind::List(elements), ph.clone())))
            }

            Phrase::Brace(delimited) => self.analyze_record(ph, delimited),

            Phrase::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                let cond = self.analyze_op(cond)?;
                let then = self.analyze_op(then)?;
                let kind = match otherwise {
                    None => OpKind::If { cond, then },
                    Some(otherwise) => OpKind::IfElse {
                        cond,
                        then,
                        otherwise: self.analyze_op(otherwise)?,
                    },
                };
                Ok(Meaning::Op(Operation::new(kind, ph.clone())))
            }

            Phrase::Range {
                first, last, step, ..
            } => {
                let first = self.analyze_op(first)?;
                let last = self.analyze_op(last)?;
                let step = match step {
                    Some(step) => Some(self.analyze_op(step)?),
                    None => None,
                };
                Ok(Meaning::Op(Operation::new(
                    OpKind::RangeGen { first, last, step },
                    ph.clone(),
                )))
            }

            Phrase::Lambda { left, right, .. } => self.analyze_lambda(ph, left, right),
            Phrase::Let { args, body, .. } => self.analyze_let(ph, args, body),
            Phrase::For { args, body, .. } => self.analyze_for(ph, args, body),

            Phrase::Definition { .. } => Err(Error::not_an_operation(ph.location().clone())),

            Phrase::Call { function, args, .. } => {
                let function = self.analyze(function)?;
                match function {
                    Meaning::Op(op) => {
                        let argv = self.analyze_args(args)?;
                        Ok(Meaning::Op(Operation::new(
                            OpKind::Call {
                                function: op,
                                arg_phrase: args.clone(),
                                argv,
                            },
                            ph.clone(),
                        )))
                    }
                    Meaning::Meta(meta) => meta.call(ph, args, self),
                }
            }

            Phrase::Program { body, .. } => self.analyze(body),
            Phrase::Module { body, .. } => self.analyze_module_phrase(ph, body),
        }
    }

    /// Analyze a phrase that must yield an evaluable operation
    pub fn analyze_op(&mut self, ph: &Rc<Phrase>) -> Result<Rc<Operation>> {
        match self.analyze(ph)? {
            Meaning::Op(op) => Ok(op),
            Meaning::Meta(_) => Err(Error::not_an_operation(ph.location().clone())),
        }
    }

    /// Paren/comma phrases: a single unseparated element analyzes as
    /// itself; anything else is a sequence.
    fn analyze_sequence_like(&mut self, ph: &Rc<Phrase>, args: &[PhraseArg]) -> Result<Meaning> {
        if args.len() == 1 && args[0].separator.is_missing() {
            return Ok(Meaning::Op(self.analyze_op(&args[0].expr)?));
        }
        let mut elements = Vec::with_capacity(args.len());
        for arg in args {
            elements.push(self.analyze_op(&arg.expr)?);
        }
        Ok(Meaning::Op(Operation::new(
            OpKind::Sequence(elements),
            ph.clone(),
        )))
    }

    fn analyze_binary(
        &mut self,
        ph: &Rc<Phrase>,
        left: &Rc<Phrase>,
        op: Token,
        right: &Rc<Phrase>,
    ) -> Result<Meaning> {
        let kind = match op.kind {
            TokenKind::And => OpKind::And {
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
            TokenKind::Or => OpKind::Or {
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
            TokenKind::Equal => OpKind::Equal {
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
            TokenKind::NotEqual => OpKind::NotEqual {
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
            TokenKind::Less => OpKind::Less {
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
            TokenKind::Greater => OpKind::Greater {
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
            TokenKind::LessOrEqual => OpKind::LessOrEqual {
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
            TokenKind::GreaterOrEqual => OpKind::GreaterOrEqual {
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
            TokenKind::Power => OpKind::Power {
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
            TokenKind::Dot => return self.analyze_dot(ph, left, right),
            _ => OpKind::Infix {
                op: op.kind,
                left: self.analyze_op(left)?,
                right: self.analyze_op(right)?,
            },
        };
        Ok(Meaning::Op(Operation::new(kind, ph.clone())))
    }

    /// `expr.name` selects a field; `expr.[index]` indexes. The bracket
    /// form requires exactly one unseparated element.
    fn analyze_dot(
        &mut self,
        ph: &Rc<Phrase>,
        left: &Rc<Phrase>,
        right: &Rc<Phrase>,
    ) -> Result<Meaning> {
        if let Some(atom) = right.as_identifier() {
            let field = atom.clone();
            let expr = self.analyze_op(left)?;
            return Ok(Meaning::Op(Operation::new(
                OpKind::Dot { expr, field },
                ph.clone(),
            )));
        }
        if let Phrase::Bracket(delimited) = &**right {
            if delimited.args.len() == 1 && delimited.args[0].separator.is_missing() {
                let index = self.analyze_op(&delimited.args[0].expr)?;
                let expr = self.analyze_op(left)?;
                return Ok(Meaning::Op(Operation::new(
                    OpKind::At { expr, index },
                    ph.clone(),
                )));
            }
            return Err(Error::not_an_expression(ph.location().clone()));
        }
        Err(Error::invalid_after_dot(right.location().clone()))
    }

    /// Expand a call's argument phrase: a paren phrase contributes one
    /// argument per element, anything else is a single argument.
    pub fn analyze_args(&mut self, args: &Rc<Phrase>) -> Result<Argv> {
        let mut argv = Argv::new();
        if let Phrase::Paren(delimited) = &**args {
            for arg in &delimited.args {
                argv.push(self.analyze_op(&arg.expr)?);
            }
        } else {
            argv.push(self.analyze_op(args)?);
        }
        Ok(argv)
    }

    /// Interpret a phrase as a definition, if it is one.
    ///
    /// `f(x) = body` is sugar for `f = (x) -> body`.
    pub fn analyze_def(&mut self, ph: &Rc<Phrase>) -> Result<Option<Definition>> {
        let (left, right) = match &**ph {
            Phrase::Definition { left, right, .. } => (left, right),
            _ => return Ok(None),
        };

        if let Phrase::Identifier { atom, location } = &**left {
            return Ok(Some(Definition {
                name: atom.clone(),
                name_location: location.clone(),
                definiens: right.clone(),
            }));
        }

        if let Phrase::Call { function, args, .. } = &**left {
            return match &**function {
                Phrase::Identifier { atom, location } => {
                    let lambda_location = args.location().ending_at(right.location().token());
                    let definiens = Rc::new(Phrase::Lambda {
                        left: args.clone(),
                        right: right.clone(),
                        location: lambda_location,
                    });
                    Ok(Some(Definition {
                        name: atom.clone(),
                        name_location: location.clone(),
                        definiens,
                    }))
                }
                _ => Err(Error::not_an_identifier(function.location().clone())),
            };
        }

        Err(Error::invalid_definiendum(left.location().clone()))
    }
}
