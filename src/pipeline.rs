//! Compilation pipeline: source text → phrase tree → meaning IR
//!
//! Convenience entry points gluing scanner, parser and analyzer. A
//! script can be compiled as a single expression or as a module, where
//! its semicolon-separated statements become the module's fields and
//! elements.

use crate::analyzer;
use crate::builtin::Namespace;
use crate::error::Result;
use crate::meaning::Operation;
use crate::parser;
use crate::phrase::Phrase;
use crate::scanner::Scanner;
use crate::source::Script;
use std::rc::Rc;

/// Parse a script into its program phrase
pub fn parse_source(script: Rc<Script>) -> Result<Rc<Phrase>> {
    parser::parse_program(Scanner::new(script))
}

/// Compile a script as a single expression
pub fn compile_expression(script: Rc<Script>, namespace: &Namespace) -> Result<Rc<Operation>> {
    log::debug!("compiling expression '{}'", script.name);
    let program = parse_source(script)?;
    analyzer::analyze_program(&program, namespace)
}

/// Compile a script as a module
pub fn compile_module(script: Rc<Script>, namespace: &Namespace) -> Result<Rc<Operation>> {
    log::debug!("compiling module '{}'", script.name);
    let program = parse_source(script)?;
    let (body, location) = match &*program {
        Phrase::Program { body, location, .. } => (body.clone(), location.clone()),
        _ => (program.clone(), program.location().clone()),
    };
    let module = Rc::new(Phrase::Module { body, location });
    analyzer::analyze_module(&module, namespace)
}
