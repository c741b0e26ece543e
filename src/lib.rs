//! # Burin: shape-scripting language front end
//!
//! Burin is the front end of a small pure-functional expression
//! language for geometric scripting. It turns source text into an
//! evaluable intermediate representation: a tree of typed expression
//! nodes plus the slot layout an evaluator needs to build activation
//! frames, resolve variables by index, and call first-class functions,
//! including recursive and closure-capturing ones.
//!
//! ## Quick start
//!
//! ```
//! use burin::{compile_expression, default_namespace, OpKind, Script};
//!
//! let namespace = default_namespace();
//! let ir = compile_expression(Script::new("demo", "2 + 3"), &namespace).unwrap();
//! assert!(matches!(ir.kind, OpKind::Infix { .. }));
//! ```
//!
//! ## Architecture
//!
//! Compilation runs in three stages:
//!
//! 1. **Scanner** turns source text into tokens, with one token of push-back
//! 2. **Parser** runs recursive descent with precedence climbing, emitting
//!    the phrase tree; juxtaposition is a function call
//! 3. **Analyzer** performs scope resolution and slot layout, emitting the
//!    Meaning IR with references classified by their binder
//!    (argument, `let`/`for` local, module field, captured nonlocal)
//!
//! Everything downstream of the IR (frame evaluation, arithmetic, code
//! generation) lives outside this crate.

pub mod analyzer;
pub mod atom;
pub mod builtin;
pub mod error;
pub mod meaning;
pub mod module;
pub mod parser;
pub mod phrase;
pub mod pipeline;
pub mod scanner;
pub mod source;
pub mod token;
pub mod value;

pub use analyzer::{analyze_module, analyze_program, Analyzer, Definition};
pub use atom::Atom;
pub use builtin::{default_namespace, Builtin, Namespace};
pub use error::{Error, ErrorKind, Result};
pub use meaning::{Argv, Meaning, Metafunction, OpKind, Operation};
pub use module::Module;
pub use parser::parse_program;
pub use phrase::Phrase;
pub use pipeline::{compile_expression, compile_module, parse_source};
pub use scanner::Scanner;
pub use source::{Location, Script};
pub use token::{Token, TokenKind};
pub use value::Value;
