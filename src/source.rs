//! Source scripts and locations
//!
//! A [`Script`] is shared immutable source text. A [`Location`] pairs a
//! script with a token and maps the token's byte range back to
//! (file, line, lexeme) for diagnostics.

use crate::token::{Token, TokenKind};
use std::fmt;
use std::rc::Rc;

/// Shared immutable script text
#[derive(Debug, PartialEq, Eq)]
pub struct Script {
    /// Script name, typically a file path; empty for anonymous scripts
    pub name: Rc<str>,
    pub source: Rc<str>,
}

impl Script {
    pub fn new(name: &str, source: &str) -> Rc<Script> {
        Rc::new(Script {
            name: Rc::from(name),
            source: Rc::from(source),
        })
    }
}

/// A source location: a token within a script.
///
/// Locations are attached to every phrase and every meaning, and are the
/// sole ingredient of diagnostic messages.
#[derive(Debug, Clone)]
pub struct Location {
    script: Rc<Script>,
    token: Token,
}

impl Location {
    pub fn new(script: Rc<Script>, token: Token) -> Self {
        Location { script, token }
    }

    pub fn script(&self) -> &Rc<Script> {
        &self.script
    }

    pub fn token(&self) -> Token {
        self.token
    }

    /// 1-based line number of the start of the token
    pub fn lineno(&self) -> usize {
        let mut lineno = 1;
        for byte in self.script.source[..self.token.first as usize].bytes() {
            if byte == b'\n' {
                lineno += 1;
            }
        }
        lineno
    }

    /// The lexeme: the byte range of the token within the script
    pub fn range(&self) -> &str {
        &self.script.source[self.token.first as usize..self.token.last as usize]
    }

    /// Widen this location to start at `tok`, producing a synthetic
    /// phrase token. A missing `tok` leaves the location unchanged.
    pub fn starting_at(&self, tok: Token) -> Location {
        let mut loc = self.clone();
        if tok.kind != TokenKind::Missing {
            loc.token.first_white = tok.first_white;
            loc.token.first = tok.first;
            loc.token.kind = TokenKind::Phrase;
        }
        loc
    }

    /// Widen this location to end at `tok`, producing a synthetic
    /// phrase token. A missing `tok` leaves the location unchanged.
    pub fn ending_at(&self, tok: Token) -> Location {
        let mut loc = self.clone();
        if tok.kind != TokenKind::Missing {
            loc.token.last = tok.last;
            loc.token.kind = TokenKind::Phrase;
        }
        loc
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.script.name.is_empty() {
            write!(f, "file {}, ", self.script.name)?;
        }
        write!(f, "line {}", self.lineno())?;
        match self.token.kind {
            TokenKind::End => write!(f, ", at end of script"),
            _ => write!(f, ", token {}", self.range()),
        }
    }
}
