//! Builtin namespace
//!
//! The analyzer consumes a read-only map from name to [`Builtin`]. A
//! value builtin is inlined as a `Constant`; a metafunction builtin
//! runs at analysis time. The default namespace carries the numeric
//! constants, a handful of native numeric functions, and `echo`.

use crate::analyzer::Analyzer;
use crate::atom::Atom;
use crate::error::Result;
use crate::meaning::{Meaning, Metafunction, OpKind, Operation};
use crate::phrase::Phrase;
use crate::value::{NativeFn, NativeFunction, Value};
use indexmap::IndexMap;
use std::rc::Rc;

/// A builtin binding
pub enum Builtin {
    /// A constant value; analysis inlines it verbatim
    Value(Value),
    /// A compile-time callable
    Meta(Rc<dyn Metafunction>),
}

impl Builtin {
    /// The meaning of this builtin at a reference site
    pub fn to_meaning(&self, id: &Rc<Phrase>) -> Meaning {
        match self {
            Builtin::Value(value) => Meaning::Op(Operation::new(
                OpKind::Constant(value.clone()),
                id.clone(),
            )),
            Builtin::Meta(meta) => Meaning::Meta(meta.clone()),
        }
    }
}

/// Read-only map from name to builtin
pub type Namespace = IndexMap<Atom, Builtin>;

/// The meaning of the phrase `echo` in call position: analyze the
/// arguments now, emit an action that prints them later.
struct EchoMetafunction;

impl Metafunction for EchoMetafunction {
    fn call(
        &self,
        call: &Rc<Phrase>,
        args: &Rc<Phrase>,
        env: &mut Analyzer<'_>,
    ) -> Result<Meaning> {
        let argv = env.analyze_args(args)?;
        Ok(Meaning::Op(Operation::new(
            OpKind::Echo { argv },
            call.clone(),
        )))
    }
}

// === Native numeric functions ===

fn nth(args: &[Value], i: usize) -> std::result::Result<&Value, String> {
    args.get(i).ok_or_else(|| "missing argument".to_string())
}

fn builtin_sqrt(args: &[Value]) -> std::result::Result<Value, String> {
    Ok(Value::Num(nth(args, 0)?.as_num()?.sqrt()))
}

fn builtin_abs(args: &[Value]) -> std::result::Result<Value, String> {
    Ok(Value::Num(nth(args, 0)?.as_num()?.abs()))
}

fn builtin_max(args: &[Value]) -> std::result::Result<Value, String> {
    let mut best = f64::NEG_INFINITY;
    for item in nth(args, 0)?.as_list()? {
        best = best.max(item.as_num()?);
    }
    Ok(Value::Num(best))
}

fn builtin_min(args: &[Value]) -> std::result::Result<Value, String> {
    let mut best = f64::INFINITY;
    for item in nth(args, 0)?.as_list()? {
        best = best.min(item.as_num()?);
    }
    Ok(Value::Num(best))
}

fn builtin_norm(args: &[Value]) -> std::result::Result<Value, String> {
    let mut sum = 0.0;
    for item in nth(args, 0)?.as_list()? {
        let x = item.as_num()?;
        sum += x * x;
    }
    if sum.is_nan() {
        return Err("norm: domain error".to_string());
    }
    Ok(Value::Num(sum.sqrt()))
}

fn builtin_len(args: &[Value]) -> std::result::Result<Value, String> {
    Ok(Value::Num(nth(args, 0)?.as_list()?.len() as f64))
}

fn native(name: &'static str, nargs: usize, func: NativeFn) -> Builtin {
    Builtin::Value(Value::Native(Rc::new(NativeFunction { name, nargs, func })))
}

/// The default builtin namespace
pub fn default_namespace() -> Namespace {
    let mut ns = Namespace::new();
    ns.insert(Atom::new("pi"), Builtin::Value(Value::Num(std::f64::consts::PI)));
    ns.insert(Atom::new("tau"), Builtin::Value(Value::Num(std::f64::consts::TAU)));
    ns.insert(Atom::new("inf"), Builtin::Value(Value::Num(f64::INFINITY)));
    ns.insert(Atom::new("null"), Builtin::Value(Value::Null));
    ns.insert(Atom::new("false"), Builtin::Value(Value::Bool(false)));
    ns.insert(Atom::new("true"), Builtin::Value(Value::Bool(true)));
    ns.insert(Atom::new("sqrt"), native("sqrt", 1, builtin_sqrt));
    ns.insert(Atom::new("abs"), native("abs", 1, builtin_abs));
    ns.insert(Atom::new("max"), native("max", 1, builtin_max));
    ns.insert(Atom::new("min"), native("min", 1, builtin_min));
    ns.insert(Atom::new("norm"), native("norm", 1, builtin_norm));
    ns.insert(Atom::new("len"), native("len", 1, builtin_len));
    ns.insert(Atom::new("echo"), Builtin::Meta(Rc::new(EchoMetafunction)));
    ns
}
