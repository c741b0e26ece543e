//! Runtime values
//!
//! The analyzer pre-boxes constants as [`Value`]s and fills module and
//! `let` slots with thunks and raw lambdas. Evaluation itself lives
//! outside this crate; values here only need construction, equality and
//! display.

use crate::meaning::Operation;
use std::fmt;
use std::rc::Rc;

/// Native function type
pub type NativeFn = fn(&[Value]) -> std::result::Result<Value, String>;

/// A raw function produced by analysis: the body with its frame
/// geometry, not yet closed over an environment.
#[derive(Debug)]
pub struct Lambda {
    pub body: Rc<Operation>,
    pub nargs: usize,
    pub nslots: usize,
}

/// A lambda closed over the slots of its module
#[derive(Debug)]
pub struct Closure {
    pub lambda: Rc<Lambda>,
    pub env: Rc<Vec<Value>>,
}

/// A named native function
#[derive(Debug)]
pub struct NativeFunction {
    pub name: &'static str,
    pub nargs: usize,
    pub func: NativeFn,
}

/// Core value type
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Lambda(Rc<Lambda>),
    Closure(Rc<Closure>),
    /// Delayed computation placed in a slot, forced lazily by the runtime
    Thunk(Rc<Operation>),
    Native(Rc<NativeFunction>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_num(&self) -> std::result::Result<f64, String> {
        match self {
            Value::Num(n) => Ok(*n),
            _ => Err(format!("expected a number, got {}", self)),
        }
    }

    pub fn as_list(&self) -> std::result::Result<&[Value], String> {
        match self {
            Value::List(items) => Ok(items),
            _ => Err(format!("expected a list, got {}", self)),
        }
    }

    pub fn as_str(&self) -> std::result::Result<&str, String> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(format!("expected a string, got {}", self)),
        }
    }
}

impl PartialEq for Value {
    /// Plain data compares by content; functions and thunks compare by
    /// identity.
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Thunk(a), Value::Thunk(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Num(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Lambda(_) | Value::Closure(_) => write!(f, "<function>"),
            Value::Thunk(_) => write!(f, "<thunk>"),
            Value::Native(native) => write!(f, "<function {}>", native.name),
        }
    }
}
