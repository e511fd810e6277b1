//! Dynamic values of the statement IR.
//!
//! Terms are immutable and cheap to clone. Lists and match environments
//! are reference values: generated code builds them with effect calls
//! (`list_append`, `match_add`), so every alias observes the update.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use redex_ir::Term;
use redex_runtime::MatchEnv;

use crate::errors::{type_mismatch, EvalResult};

#[derive(Clone, Debug)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Str(Rc<str>),
    Term(Term),
    Match(Rc<RefCell<MatchEnv>>),
    List(Rc<RefCell<Vec<Value>>>),
    Pair(Rc<(Value, Value)>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn env(env: MatchEnv) -> Value {
        Value::Match(Rc::new(RefCell::new(env)))
    }

    pub fn pair(first: Value, second: Value) -> Value {
        Value::Pair(Rc::new((first, second)))
    }

    pub fn str(text: &str) -> Value {
        Value::Str(Rc::from(text))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::Term(_) => "term",
            Value::Match(_) => "match",
            Value::List(_) => "list",
            Value::Pair(_) => "pair",
        }
    }

    pub fn as_bool(&self) -> EvalResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(type_mismatch("bool", other)),
        }
    }

    pub fn as_int(&self) -> EvalResult<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(type_mismatch("int", other)),
        }
    }

    /// An integer used as an index or count.
    pub fn as_index(&self) -> EvalResult<usize> {
        let n = self.as_int()?;
        usize::try_from(n).map_err(|_| type_mismatch("non-negative int", self))
    }

    pub fn as_str(&self) -> EvalResult<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(type_mismatch("str", other)),
        }
    }

    pub fn as_term(&self) -> EvalResult<&Term> {
        match self {
            Value::Term(t) => Ok(t),
            other => Err(type_mismatch("term", other)),
        }
    }

    pub fn as_env(&self) -> EvalResult<&Rc<RefCell<MatchEnv>>> {
        match self {
            Value::Match(env) => Ok(env),
            other => Err(type_mismatch("match", other)),
        }
    }

    pub fn as_list(&self) -> EvalResult<&Rc<RefCell<Vec<Value>>>> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(type_mismatch("list", other)),
        }
    }

    pub fn as_pair(&self) -> EvalResult<&(Value, Value)> {
        match self {
            Value::Pair(pair) => Ok(pair),
            other => Err(type_mismatch("pair", other)),
        }
    }

    /// A list of terms, e.g. the result of a reduction relation.
    pub fn to_terms(&self) -> EvalResult<Vec<Term>> {
        self.as_list()?
            .borrow()
            .iter()
            .map(|item| item.as_term().cloned())
            .collect()
    }

    /// A list of environments, e.g. the result of a top-level matcher.
    pub fn to_envs(&self) -> EvalResult<Vec<MatchEnv>> {
        self.as_list()?
            .borrow()
            .iter()
            .map(|item| Ok(item.as_env()?.borrow().clone()))
            .collect()
    }

    /// Equality for `==`: structural on scalars and terms, identity on
    /// reference values.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Term(a), Value::Term(b)) => a == b,
            (Value::Match(a), Value::Match(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Pair(a), Value::Pair(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Term> for Value {
    fn from(term: Term) -> Self {
        Value::Term(term)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => f.write_str(s),
            Value::Term(t) => write!(f, "{t}"),
            Value::Match(env) => write!(f, "{}", env.borrow()),
            Value::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.borrow().iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Pair(pair) => write!(f, "({}, {})", pair.0, pair.1),
        }
    }
}
