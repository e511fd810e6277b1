//! Template annotation.
//!
//! Decides, for every symbol in a template, whether it reads a pattern
//! variable or builds a literal variable, and for every template ellipsis
//! which bound variables drive its iteration. Metafunction applications are
//! recognized here as well: a sequence headed by an unbound symbol naming a
//! metafunction of the same specification.

use redex_diagnostic::{Diagnostic, ErrorCode};
use redex_ir::{InsertMode, Symbol, Template, Term};
use redex_patterns::DepthMap;
use redex_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;

/// A template with binding sources resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Annotated {
    Literal(Term),
    /// A pattern variable bound at ellipsis depth `depth`.
    Var { symbol: Symbol, depth: usize },
    Sequence(Vec<Annotated>),
    /// One construction per element of the `drivers`' current values.
    Repeat {
        inner: Box<Annotated>,
        drivers: Vec<Symbol>,
    },
    InHole {
        context: Box<Annotated>,
        contents: Box<Annotated>,
    },
    /// The arguments are built as one sequence term.
    Metafunction {
        function: Symbol,
        args: Vec<Annotated>,
    },
    Foreign {
        function: Symbol,
        args: Vec<Annotated>,
        mode: InsertMode,
    },
}

/// Annotate `template` against the depths of the pattern that binds it.
pub fn annotate(
    template: &Template,
    depths: &DepthMap,
    metafunctions: &FxHashSet<Symbol>,
) -> Result<Annotated, Diagnostic> {
    Annotator {
        depths,
        metafunctions,
    }
    .walk(template, 0)
}

struct Annotator<'a> {
    depths: &'a DepthMap,
    metafunctions: &'a FxHashSet<Symbol>,
}

impl Annotator<'_> {
    fn walk(&self, template: &Template, depth: usize) -> Result<Annotated, Diagnostic> {
        ensure_sufficient_stack(|| match template {
            Template::Literal(term) => Ok(Annotated::Literal(term.clone())),
            Template::Symbol(symbol) => self.symbol(symbol, depth),
            Template::Sequence(items) => {
                if let Some((Template::Symbol(head), args)) = items.split_first() {
                    if !self.depths.contains_key(head) && self.metafunctions.contains(head) {
                        return Ok(Annotated::Metafunction {
                            function: head.clone(),
                            args: self.walk_all(args, depth)?,
                        });
                    }
                }
                Ok(Annotated::Sequence(self.walk_all(items, depth)?))
            }
            Template::Repeat(inner) => {
                let inner = self.walk(inner, depth + 1)?;
                let mut drivers = Vec::new();
                collect_drivers(&inner, depth, &mut drivers);
                if drivers.is_empty() {
                    return Err(Diagnostic::error(ErrorCode::E3003).with_message(format!(
                        "too many ellipses: `{template}` iterates no variable bound under an ellipsis"
                    )));
                }
                Ok(Annotated::Repeat {
                    inner: Box::new(inner),
                    drivers,
                })
            }
            Template::InHole { context, contents } => Ok(Annotated::InHole {
                context: Box::new(self.walk(context, depth)?),
                contents: Box::new(self.walk(contents, depth)?),
            }),
            Template::ForeignCall {
                function,
                args,
                mode,
            } => Ok(Annotated::Foreign {
                function: function.clone(),
                args: self.walk_all(args, depth)?,
                mode: *mode,
            }),
        })
    }

    fn walk_all(&self, items: &[Template], depth: usize) -> Result<Vec<Annotated>, Diagnostic> {
        items.iter().map(|item| self.walk(item, depth)).collect()
    }

    fn symbol(&self, symbol: &Symbol, depth: usize) -> Result<Annotated, Diagnostic> {
        match self.depths.get(symbol) {
            None => Ok(Annotated::Literal(Term::Variable(symbol.clone()))),
            Some(&bound) if depth < bound => Err(Diagnostic::error(ErrorCode::E3002)
                .with_message(format!(
                    "`{symbol}` is bound at ellipsis depth {bound} but used at depth {depth}"
                ))
                .with_suggestion(format!(
                    "follow `{symbol}` with {} more `...`",
                    bound - depth
                ))),
            Some(&bound) => Ok(Annotated::Var {
                symbol: symbol.clone(),
                depth: bound,
            }),
        }
    }
}

/// Variables under `annotated` still holding a list at template depth `depth`.
fn collect_drivers(annotated: &Annotated, depth: usize, out: &mut Vec<Symbol>) {
    match annotated {
        Annotated::Literal(_) => {}
        Annotated::Var { symbol, depth: bound } => {
            if *bound > depth && !out.contains(symbol) {
                out.push(symbol.clone());
            }
        }
        Annotated::Repeat { inner, .. } => collect_drivers(inner, depth, out),
        Annotated::InHole { context, contents } => {
            collect_drivers(context, depth, out);
            collect_drivers(contents, depth, out);
        }
        Annotated::Sequence(items)
        | Annotated::Metafunction { args: items, .. }
        | Annotated::Foreign { args: items, .. } => {
            for item in items {
                collect_drivers(item, depth, out);
            }
        }
    }
}
