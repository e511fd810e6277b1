//! Term templates: the construction side of the language.
//!
//! Templates mirror patterns but describe how to build a term from a match.
//! Bare symbols stay [`Template::Symbol`] until annotation decides whether
//! each one is a pattern variable or a literal variable, and whether a
//! sequence is a metafunction application.

use std::fmt;

use crate::{Symbol, Term};

/// How a foreign call's result is inserted into the enclosing sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InsertMode {
    /// Insert the constructed term as one element.
    Append,
    /// Splice the constructed sequence's children.
    Extend,
}

/// Term template AST.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Template {
    /// A non-symbol atom (number, string, boolean, `hole`).
    Literal(Term),
    /// Pattern variable or literal variable; decided during annotation.
    Symbol(Symbol),
    Sequence(Vec<Template>),
    /// "For each bound element, construct one."
    Repeat(Box<Template>),
    /// Plug `contents` into the hole of `context`.
    InHole {
        context: Box<Template>,
        contents: Box<Template>,
    },
    /// Escape hatch into a host function.
    ForeignCall {
        function: Symbol,
        args: Vec<Template>,
        mode: InsertMode,
    },
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Template::Literal(term) => write!(f, "{term}"),
            Template::Symbol(symbol) => write!(f, "{symbol}"),
            Template::Sequence(items) => {
                f.write_str("(")?;
                write_spaced(f, items)?;
                f.write_str(")")
            }
            Template::Repeat(inner) => write!(f, "{inner} ..."),
            Template::InHole { context, contents } => {
                write!(f, "(in-hole {context} {contents})")
            }
            Template::ForeignCall {
                function,
                args,
                mode,
            } => {
                let head = match mode {
                    InsertMode::Append => "foreign-call",
                    InsertMode::Extend => "foreign-splice",
                };
                write!(f, "({head} {function}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

fn write_spaced(f: &mut fmt::Formatter<'_>, items: &[Template]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
