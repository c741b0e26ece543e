//! Concrete syntax tree
//!
//! A [`Phrase`] is a node of the parse tree. Every variant reaches a
//! [`Location`] spanning its first to last consumed token; phrases are
//! immutable once built and shared by `Rc` into the IR as diagnostic
//! back-pointers.

use crate::atom::Atom;
use crate::source::Location;
use crate::token::Token;
use std::rc::Rc;

/// One element of a separated sequence.
///
/// The separator is the comma/semicolon token after the element; a
/// `Missing` separator marks "no separator after the last element".
#[derive(Debug, Clone)]
pub struct PhraseArg {
    pub expr: Rc<Phrase>,
    pub separator: Token,
}

/// Body of a parenthesized, bracketed or braced phrase
#[derive(Debug, Clone)]
pub struct DelimitedPhrase {
    pub open: Token,
    pub args: Vec<PhraseArg>,
    pub close: Token,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub enum Phrase {
    // === Leaves ===
    Identifier {
        atom: Atom,
        location: Location,
    },
    Numeral(Location),
    StringLit(Location),
    /// Zero-width phrase produced where a list context is empty
    Empty(Location),

    // === Operators ===
    Unary {
        op: Token,
        arg: Rc<Phrase>,
        location: Location,
    },
    Binary {
        left: Rc<Phrase>,
        op: Token,
        right: Rc<Phrase>,
        location: Location,
    },

    // === Delimited ===
    Paren(DelimitedPhrase),
    /// Also known as the list phrase
    Bracket(DelimitedPhrase),
    /// Also known as the record phrase
    Brace(DelimitedPhrase),

    // === Separated sequences ===
    Commas {
        args: Vec<PhraseArg>,
        location: Location,
    },
    Semicolons {
        args: Vec<PhraseArg>,
        location: Location,
    },

    // === Control ===
    If {
        cond: Rc<Phrase>,
        then: Rc<Phrase>,
        otherwise: Option<Rc<Phrase>>,
        location: Location,
    },
    For {
        /// Always a paren phrase; checked by the parser
        args: Rc<Phrase>,
        body: Rc<Phrase>,
        location: Location,
    },
    Let {
        /// Always a paren phrase; checked by the parser
        args: Rc<Phrase>,
        body: Rc<Phrase>,
        location: Location,
    },
    Lambda {
        left: Rc<Phrase>,
        right: Rc<Phrase>,
        location: Location,
    },
    Range {
        first: Rc<Phrase>,
        op: Token,
        last: Rc<Phrase>,
        step: Option<Rc<Phrase>>,
        location: Location,
    },

    // === Definition and call ===
    Definition {
        left: Rc<Phrase>,
        right: Rc<Phrase>,
        location: Location,
    },
    Call {
        function: Rc<Phrase>,
        args: Rc<Phrase>,
        /// The `<<` or `>>` token; `Missing` for a juxtaposition call
        call_tok: Token,
        location: Location,
    },

    // === Roots ===
    Program {
        body: Rc<Phrase>,
        end: Token,
        location: Location,
    },
    Module {
        body: Rc<Phrase>,
        location: Location,
    },
}

impl Phrase {
    pub fn location(&self) -> &Location {
        match self {
            Phrase::Identifier { location, .. } => location,
            Phrase::Numeral(location) => location,
            Phrase::StringLit(location) => location,
            Phrase::Empty(location) => location,
            Phrase::Unary { location, .. } => location,
            Phrase::Binary { location, .. } => location,
            Phrase::Paren(d) | Phrase::Bracket(d) | Phrase::Brace(d) => &d.location,
            Phrase::Commas { location, .. } => location,
            Phrase::Semicolons { location, .. } => location,
            Phrase::If { location, .. } => location,
            Phrase::For { location, .. } => location,
            Phrase::Let { location, .. } => location,
            Phrase::Lambda { location, .. } => location,
            Phrase::Range { location, .. } => location,
            Phrase::Definition { location, .. } => location,
            Phrase::Call { location, .. } => location,
            Phrase::Program { location, .. } => location,
            Phrase::Module { location, .. } => location,
        }
    }

    pub fn as_identifier(&self) -> Option<&Atom> {
        match self {
            Phrase::Identifier { atom, .. } => Some(atom),
            _ => None,
        }
    }

    pub fn as_paren(&self) -> Option<&DelimitedPhrase> {
        match self {
            Phrase::Paren(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self, Phrase::Lambda { .. })
    }
}
