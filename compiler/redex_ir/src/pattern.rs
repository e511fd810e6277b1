//! Pattern language AST.
//!
//! Patterns come out of the reader with every bare symbol left as
//! [`Pattern::Unresolved`]. Resolution against a grammar turns those into
//! [`Pattern::NonTerminal`], [`Pattern::BuiltIn`] or variable literals; later
//! preprocessing passes rewrite repetition modes and interleave
//! [`Pattern::Check`] nodes. After preprocessing a pattern is never mutated.
//!
//! `Pattern` is `Hash + Eq` by structure so code generation can memoize one
//! matching procedure per distinct pattern.

use std::fmt;
use std::rc::Rc;

use crate::term::{write_quoted, Float, Term};
use crate::Symbol;

/// Kind tag of a literal pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Boolean,
    Variable,
}

/// A literal pattern value. Matches exactly one term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Integer(i64),
    Float(Float),
    String(Rc<str>),
    Boolean(bool),
    Variable(Symbol),
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Integer(_) => LiteralKind::Integer,
            Literal::Float(_) => LiteralKind::Float,
            Literal::String(_) => LiteralKind::String,
            Literal::Boolean(_) => LiteralKind::Boolean,
            Literal::Variable(_) => LiteralKind::Variable,
        }
    }

    /// The single term this literal matches.
    pub fn to_term(&self) -> Term {
        match self {
            Literal::Integer(n) => Term::Integer(*n),
            Literal::Float(x) => Term::Float(*x),
            Literal::String(s) => Term::String(Rc::clone(s)),
            Literal::Boolean(b) => Term::Boolean(*b),
            Literal::Variable(name) => Term::Variable(name.clone()),
        }
    }
}

/// Built-in pattern kinds recognized by keyword.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltInKind {
    Number,
    Integer,
    Natural,
    Float,
    String,
    Boolean,
    Hole,
    VariableNotOtherwiseMentioned,
    VariableExcept,
}

impl BuiltInKind {
    /// Every kind, in keyword table order.
    pub const ALL: [BuiltInKind; 9] = [
        BuiltInKind::Number,
        BuiltInKind::Integer,
        BuiltInKind::Natural,
        BuiltInKind::Float,
        BuiltInKind::String,
        BuiltInKind::Boolean,
        BuiltInKind::Hole,
        BuiltInKind::VariableNotOtherwiseMentioned,
        BuiltInKind::VariableExcept,
    ];

    /// Look up the kind named by a symbol prefix.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }

    /// The surface keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            BuiltInKind::Number => "number",
            BuiltInKind::Integer => "integer",
            BuiltInKind::Natural => "natural",
            BuiltInKind::Float => "real",
            BuiltInKind::String => "string",
            BuiltInKind::Boolean => "boolean",
            BuiltInKind::Hole => "hole",
            BuiltInKind::VariableNotOtherwiseMentioned => "variable-not-otherwise-mentioned",
            BuiltInKind::VariableExcept => "variable-except",
        }
    }

    /// Whether a match of this kind records a binding.
    ///
    /// `hole` and `(variable-except ...)` only test the term.
    pub fn is_bindable(self) -> bool {
        !matches!(self, BuiltInKind::Hole | BuiltInKind::VariableExcept)
    }

    /// Whether this kind can only be written in applied form.
    pub fn requires_arguments(self) -> bool {
        matches!(self, BuiltInKind::VariableExcept)
    }
}

/// A resolved built-in pattern leaf.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuiltIn {
    pub kind: BuiltInKind,
    /// The keyword part of `symbol`.
    pub prefix: Symbol,
    /// The binding key (`number_1`).
    pub symbol: Symbol,
    /// Variables rejected by `(variable-except x ...)`.
    pub excluded: Vec<Symbol>,
}

impl BuiltIn {
    pub fn new(kind: BuiltInKind, symbol: Symbol) -> Self {
        BuiltIn {
            kind,
            prefix: Symbol::new(kind.keyword()),
            symbol,
            excluded: Vec::new(),
        }
    }

    /// `(variable-except x ...)`.
    pub fn variable_except(excluded: Vec<Symbol>) -> Self {
        let keyword = Symbol::new(BuiltInKind::VariableExcept.keyword());
        BuiltIn {
            kind: BuiltInKind::VariableExcept,
            prefix: keyword.clone(),
            symbol: keyword,
            excluded,
        }
    }
}

/// How a `Repeat` explores its repetition count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RepeatMode {
    /// Try every count; required when the following patterns may overlap.
    NonDeterministic,
    /// Consume greedily; valid only where no other split can succeed.
    Deterministic,
}

/// Synthetic equality check between two bound symbols.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstraintCheck {
    pub left: Symbol,
    pub right: Symbol,
}

/// Pattern AST.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
    Literal(Literal),
    NonTerminal {
        prefix: Symbol,
        symbol: Symbol,
    },
    BuiltIn(BuiltIn),
    Sequence(Vec<Pattern>),
    Repeat {
        inner: Box<Pattern>,
        mode: RepeatMode,
    },
    InHole {
        context: Box<Pattern>,
        contents: Box<Pattern>,
        /// Checks between symbols bound on opposite sides.
        checks: Vec<ConstraintCheck>,
    },
    /// Consumes no term; filters the frontier on binding equality.
    Check(ConstraintCheck),
    /// A bare symbol before resolution.
    Unresolved(Symbol),
}

impl Pattern {
    pub fn unresolved(text: &str) -> Pattern {
        Pattern::Unresolved(Symbol::new(text))
    }

    /// Non-deterministic repetition of `inner`; the default before rewriting.
    pub fn repeat(inner: Pattern) -> Pattern {
        Pattern::Repeat {
            inner: Box::new(inner),
            mode: RepeatMode::NonDeterministic,
        }
    }

    pub fn in_hole(context: Pattern, contents: Pattern) -> Pattern {
        Pattern::InHole {
            context: Box::new(context),
            contents: Box::new(contents),
            checks: Vec::new(),
        }
    }

    /// The symbol this leaf binds, if it is a bindable leaf.
    pub fn binding_symbol(&self) -> Option<&Symbol> {
        match self {
            Pattern::NonTerminal { symbol, .. } => Some(symbol),
            Pattern::BuiltIn(builtin) if builtin.kind.is_bindable() => Some(&builtin.symbol),
            _ => None,
        }
    }

    /// Whether this element consumes exactly one term of its parent sequence.
    ///
    /// `Repeat` consumes a variable number and `Check` consumes none.
    pub fn is_fixed_width(&self) -> bool {
        !matches!(self, Pattern::Repeat { .. } | Pattern::Check(_))
    }

    /// Every bound symbol in the pattern, in first-occurrence order.
    pub fn bound_symbols(&self) -> Vec<Symbol> {
        let mut out = Vec::new();
        self.collect_bound(&mut out);
        out
    }

    fn collect_bound(&self, out: &mut Vec<Symbol>) {
        match self {
            Pattern::NonTerminal { .. } | Pattern::BuiltIn(_) => {
                if let Some(symbol) = self.binding_symbol() {
                    if !out.contains(symbol) {
                        out.push(symbol.clone());
                    }
                }
            }
            Pattern::Sequence(items) => {
                for item in items {
                    item.collect_bound(out);
                }
            }
            Pattern::Repeat { inner, .. } => inner.collect_bound(out),
            Pattern::InHole {
                context, contents, ..
            } => {
                context.collect_bound(out);
                contents.collect_bound(out);
            }
            Pattern::Literal(_) | Pattern::Check(_) | Pattern::Unresolved(_) => {}
        }
    }

    /// Whether any `Unresolved` leaf remains.
    pub fn has_unresolved(&self) -> bool {
        match self {
            Pattern::Unresolved(_) => true,
            Pattern::Sequence(items) => items.iter().any(Pattern::has_unresolved),
            Pattern::Repeat { inner, .. } => inner.has_unresolved(),
            Pattern::InHole {
                context, contents, ..
            } => context.has_unresolved() || contents.has_unresolved(),
            Pattern::Literal(_)
            | Pattern::NonTerminal { .. }
            | Pattern::BuiltIn(_)
            | Pattern::Check(_) => false,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write_quoted(f, s),
            other => write!(f, "{}", other.to_term()),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(lit) => write!(f, "{lit}"),
            Pattern::NonTerminal { symbol, .. } | Pattern::Unresolved(symbol) => {
                write!(f, "{symbol}")
            }
            Pattern::BuiltIn(builtin) if builtin.kind == BuiltInKind::VariableExcept => {
                f.write_str("(variable-except")?;
                for excluded in &builtin.excluded {
                    write!(f, " {excluded}")?;
                }
                f.write_str(")")
            }
            Pattern::BuiltIn(builtin) => write!(f, "{}", builtin.symbol),
            Pattern::Sequence(items) => {
                f.write_str("(")?;
                let mut first = true;
                for item in items {
                    if !first {
                        f.write_str(" ")?;
                    }
                    first = false;
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Pattern::Repeat { inner, .. } => write!(f, "{inner} ..."),
            Pattern::InHole {
                context, contents, ..
            } => write!(f, "(in-hole {context} {contents})"),
            Pattern::Check(check) => write!(f, "#check({} {})", check.left, check.right),
        }
    }
}
