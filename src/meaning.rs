//! The intermediate representation
//!
//! Analyzing a phrase yields a [`Meaning`]: either an [`Operation`] the
//! evaluator can run, or a [`Metafunction`] that exists only at
//! analysis time. Every operation keeps its source phrase as a
//! diagnostic back-pointer; the phrase tree is shared immutably.
//!
//! Slot layout contract for the evaluator: argument slots occupy
//! `0..nargs`, locals follow immediately, and `nslots` (the high-water
//! mark of the analysis) is the frame size. Reference nodes name their
//! target by slot index and kind.

use crate::analyzer::Analyzer;
use crate::atom::Atom;
use crate::error::Result;
use crate::phrase::Phrase;
use crate::token::TokenKind;
use crate::value::Value;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::rc::Rc;

/// Call-argument vector; calls are short in practice
pub type Argv = SmallVec<[Rc<Operation>; 4]>;

/// Result of analyzing a phrase
#[derive(Clone)]
pub enum Meaning {
    Op(Rc<Operation>),
    Meta(Rc<dyn Metafunction>),
}

impl Meaning {
    pub fn as_op(&self) -> Option<&Rc<Operation>> {
        match self {
            Meaning::Op(op) => Some(op),
            Meaning::Meta(_) => None,
        }
    }
}

/// A compile-time-only callable, such as `echo`.
///
/// Its call hook runs during analysis, consuming the call phrase and
/// producing the meaning of the whole call.
pub trait Metafunction {
    fn call(
        &self,
        call: &Rc<Phrase>,
        args: &Rc<Phrase>,
        env: &mut Analyzer<'_>,
    ) -> Result<Meaning>;
}

/// An evaluable IR node together with its source phrase
#[derive(Debug)]
pub struct Operation {
    pub kind: OpKind,
    pub source: Rc<Phrase>,
}

impl Operation {
    pub fn new(kind: OpKind, source: Rc<Phrase>) -> Rc<Operation> {
        Rc::new(Operation { kind, source })
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, OpKind::Constant(_))
    }
}

/// The operation variants
#[derive(Debug)]
pub enum OpKind {
    /// A pre-boxed constant value
    Constant(Value),

    Not(Rc<Operation>),
    Prefix {
        op: TokenKind,
        arg: Rc<Operation>,
    },
    Infix {
        op: TokenKind,
        left: Rc<Operation>,
        right: Rc<Operation>,
    },
    And {
        left: Rc<Operation>,
        right: Rc<Operation>,
    },
    Or {
        left: Rc<Operation>,
        right: Rc<Operation>,
    },
    Equal {
        left: Rc<Operation>,
        right: Rc<Operation>,
    },
    NotEqual {
        left: Rc<Operation>,
        right: Rc<Operation>,
    },
    Less {
        left: Rc<Operation>,
        right: Rc<Operation>,
    },
    Greater {
        left: Rc<Operation>,
        right: Rc<Operation>,
    },
    LessOrEqual {
        left: Rc<Operation>,
        right: Rc<Operation>,
    },
    GreaterOrEqual {
        left: Rc<Operation>,
        right: Rc<Operation>,
    },
    Power {
        left: Rc<Operation>,
        right: Rc<Operation>,
    },

    /// Field selection `expr.name`
    Dot {
        expr: Rc<Operation>,
        field: Atom,
    },
    /// Indexing `expr.[index]`
    At {
        expr: Rc<Operation>,
        index: Rc<Operation>,
    },

    If {
        cond: Rc<Operation>,
        then: Rc<Operation>,
    },
    IfElse {
        cond: Rc<Operation>,
        then: Rc<Operation>,
        otherwise: Rc<Operation>,
    },
    /// Frame-local lazy bindings; `values` holds one thunk per slot in
    /// slot order starting at `first_slot`
    Let {
        first_slot: usize,
        values: Vec<Value>,
        body: Rc<Operation>,
    },
    For {
        slot: usize,
        list: Rc<Operation>,
        body: Rc<Operation>,
    },
    RangeGen {
        first: Rc<Operation>,
        last: Rc<Operation>,
        step: Option<Rc<Operation>>,
    },
    List(Vec<Rc<Operation>>),
    Sequence(Vec<Rc<Operation>>),
    /// Record fields in textual order; initializers see only the outer
    /// scope
    Record {
        fields: IndexMap<Atom, Rc<Operation>>,
    },
    /// A function literal with its captured nonlocals in slot order
    Lambda {
        body: Rc<Operation>,
        nonlocals: Vec<Rc<Operation>>,
        nargs: usize,
        nslots: usize,
    },
    Call {
        function: Rc<Operation>,
        arg_phrase: Rc<Phrase>,
        argv: Argv,
    },
    Module {
        dictionary: Rc<IndexMap<Atom, usize>>,
        slots: Vec<Value>,
        elements: Vec<Rc<Operation>>,
        frame_nslots: usize,
    },
    /// Side-effecting action: print the argument values
    Echo {
        argv: Argv,
    },

    // === References, classified by the innermost enclosing binder ===
    /// Parameter of the enclosing lambda
    ArgRef(usize),
    /// `let` or `for` binding in the current frame
    LetRef(usize),
    /// Lazily evaluated module field
    ModuleRef(usize),
    /// Captured outer value in the enclosing closure's nonlocal list
    NonlocalRef(usize),
    /// Recursive function field of the enclosing module
    NonlocalFunctionRef(usize),
}
