//! Diagnostics
//!
//! Every error in the front end is an [`Error`]: a categorized kind plus
//! the most specific source [`Location`] available at the raise site.
//! Errors are fatal to the compilation in progress; nothing catches and
//! retries inside the front end.

use crate::atom::Atom;
use crate::source::Location;
use std::error::Error as StdError;
use std::fmt;

/// A fatal front-end diagnostic
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub location: Option<Location>,
}

/// Categorized error kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Scanner-level error (unterminated string, unexpected character)
    Lexical { message: String },
    /// Parser-level error (unexpected token, unmatched delimiter,
    /// missing expected phrase)
    Syntax { message: String },
    /// A phrase whose shape does not fit the position it was used in
    /// ("not a parameter", "not a definition", ...)
    Structural { message: String },
    /// Name resolution walked off the top of the scope chain
    NotDefined { name: Atom },
    /// Two definitions of the same name in one module, record or `let`
    MultiplyDefined { name: Atom },
    /// A definition or metafunction used where a runtime value is required
    NotAnOperation,
    /// Syntactically accepted construct with no meaning-level support
    Unimplemented { what: &'static str },
}

/// Result type alias for the front end
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, location: Location) -> Self {
        Error {
            kind,
            location: Some(location),
        }
    }

    /// Human-readable description without the location
    pub fn description(&self) -> String {
        match &self.kind {
            ErrorKind::Lexical { message } => message.clone(),
            ErrorKind::Syntax { message } => message.clone(),
            ErrorKind::Structural { message } => message.clone(),
            ErrorKind::NotDefined { name } => format!("{}: not defined", name),
            ErrorKind::MultiplyDefined { name } => format!("{}: multiply defined", name),
            ErrorKind::NotAnOperation => "not an operation".to_string(),
            ErrorKind::Unimplemented { what } => format!("{} not implemented", what),
        }
    }

    // === Builders, one per raise site category ===

    pub fn lexical(message: impl Into<String>, location: Location) -> Self {
        Error::new(
            ErrorKind::Lexical {
                message: message.into(),
            },
            location,
        )
    }

    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        Error::new(
            ErrorKind::Syntax {
                message: message.into(),
            },
            location,
        )
    }

    pub fn structural(message: impl Into<String>, location: Location) -> Self {
        Error::new(
            ErrorKind::Structural {
                message: message.into(),
            },
            location,
        )
    }

    pub fn not_defined(name: Atom, location: Location) -> Self {
        Error::new(ErrorKind::NotDefined { name }, location)
    }

    pub fn multiply_defined(name: Atom, location: Location) -> Self {
        Error::new(ErrorKind::MultiplyDefined { name }, location)
    }

    pub fn not_an_operation(location: Location) -> Self {
        Error::new(ErrorKind::NotAnOperation, location)
    }

    pub fn unimplemented(what: &'static str, location: Location) -> Self {
        Error::new(ErrorKind::Unimplemented { what }, location)
    }

    pub fn not_a_parameter(location: Location) -> Self {
        Error::structural("not a parameter", location)
    }

    pub fn not_a_definition(location: Location) -> Self {
        Error::structural("not a definition", location)
    }

    pub fn invalid_definiendum(location: Location) -> Self {
        Error::structural("invalid definiendum", location)
    }

    pub fn not_an_identifier(location: Location) -> Self {
        Error::structural("not an identifier", location)
    }

    pub fn not_an_expression(location: Location) -> Self {
        Error::structural("not an expression", location)
    }

    pub fn invalid_after_dot(location: Location) -> Self {
        Error::structural("invalid expression after '.'", location)
    }

    pub fn malformed_argument(keyword: &str, location: Location) -> Self {
        Error::structural(format!("{}: malformed argument", keyword), location)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())?;
        if let Some(ref loc) = self.location {
            write!(f, "\n  at {}", loc)?;
        }
        Ok(())
    }
}

impl StdError for Error {}
