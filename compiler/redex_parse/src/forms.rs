//! Top-level form parsing.

use redex_diagnostic::Diagnostic;
use redex_ir::{
    AssertMatchEqual, AssertReductionEqual, AssertTermEqual, Contract, DefineLanguage,
    DefineMetafunction, DefineReductionRelation, ExpectedMatch, Form, MetafunctionCase,
    NonTerminalDef, RedexMatch, ReductionCase, Span, Symbol,
};

use crate::error;
use crate::reader::{Atom, SExp, SExpKind};
use crate::syntax::{pattern_items, pattern_of, template_of, term_of};

/// Parse one top-level S-expression into a form.
pub fn form_of(sexp: &SExp) -> Result<Form, Diagnostic> {
    let Some(items) = sexp.as_list() else {
        return Err(error::malformed(
            sexp.span,
            "expected a top-level form in parentheses",
        ));
    };
    let Some(head) = sexp.head_symbol() else {
        return Err(error::malformed(
            sexp.span,
            "a top-level form must start with its name",
        ));
    };
    let args = &items[1..];
    let span = sexp.span;
    match head {
        "define-language" => define_language(args, span).map(Form::DefineLanguage),
        "define-reduction-relation" => {
            define_reduction_relation(args, span).map(Form::DefineReductionRelation)
        }
        "define-metafunction" => define_metafunction(args, span).map(Form::DefineMetafunction),
        "redex-match" => redex_match(args, span).map(Form::RedexMatch),
        "redex-match-assert-equal" => assert_match_equal(args, span).map(Form::AssertMatchEqual),
        "term-let-assert-equal" => assert_term_equal(args, span).map(Form::AssertTermEqual),
        "apply-reduction-relation-assert-equal" => {
            assert_reduction_equal(args, span).map(Form::AssertReductionEqual)
        }
        "require-foreign-source" => match args {
            [SExp {
                kind: SExpKind::Atom(Atom::String(path)),
                ..
            }] => Ok(Form::RequireForeignSource {
                path: path.clone(),
                span,
            }),
            _ => Err(error::malformed(
                span,
                "`require-foreign-source` takes one string path",
            )),
        },
        other => Err(error::unknown_form(items[0].span, other)),
    }
}

fn symbol_arg(sexp: Option<&SExp>, span: Span, what: &str) -> Result<Symbol, Diagnostic> {
    sexp.and_then(SExp::as_symbol)
        .map(Symbol::new)
        .ok_or_else(|| error::malformed(sexp.map_or(span, |s| s.span), format!("expected {what}")))
}

fn list_arg<'a>(sexp: Option<&'a SExp>, span: Span, what: &str) -> Result<&'a [SExp], Diagnostic> {
    sexp.and_then(SExp::as_list)
        .ok_or_else(|| error::malformed(sexp.map_or(span, |s| s.span), format!("expected {what}")))
}

fn expect_arity(args: &[SExp], count: usize, span: Span, form: &str) -> Result<(), Diagnostic> {
    if args.len() == count {
        Ok(())
    } else {
        Err(error::malformed(
            span,
            format!(
                "`{form}` takes {count} arguments, found {}",
                args.len()
            ),
        ))
    }
}

// ── Definitions ─────────────────────────────────────────────────────

fn define_language(args: &[SExp], span: Span) -> Result<DefineLanguage, Diagnostic> {
    let name = symbol_arg(args.first(), span, "a language name")?;
    let mut non_terminals = Vec::new();
    for clause in &args[1..] {
        let items = list_arg(Some(clause), span, "a `(name ::= pattern ...)` clause")?;
        let nt_name = symbol_arg(items.first(), clause.span, "a non-terminal name")?;
        let rest = &items[1..];
        let alternatives = match rest.first() {
            Some(sep) if sep.is_symbol("::=") => &rest[1..],
            _ => rest,
        };
        if alternatives.is_empty() {
            return Err(error::malformed(
                clause.span,
                format!("non-terminal `{nt_name}` has no alternatives"),
            ));
        }
        non_terminals.push(NonTerminalDef {
            name: nt_name,
            alternatives: alternatives
                .iter()
                .map(pattern_of)
                .collect::<Result<_, _>>()?,
            span: clause.span,
        });
    }
    Ok(DefineLanguage {
        name,
        non_terminals,
        span,
    })
}

fn define_reduction_relation(
    args: &[SExp],
    span: Span,
) -> Result<DefineReductionRelation, Diagnostic> {
    let name = symbol_arg(args.first(), span, "a relation name")?;
    let language = symbol_arg(args.get(1), span, "a language name")?;
    let mut rest = args.get(2..).unwrap_or(&[]);

    let mut domain = None;
    if rest.first().is_some_and(|s| s.is_symbol("#:domain")) {
        let Some(pattern) = rest.get(1) else {
            return Err(error::malformed(span, "`#:domain` needs a pattern"));
        };
        domain = Some(pattern_of(pattern)?);
        rest = &rest[2..];
    }

    let mut cases = Vec::new();
    for case in rest {
        let items = list_arg(Some(case), span, "a `(--> pattern template)` case")?;
        if items.first().map_or(true, |head| !head.is_symbol("-->")) || !(3..=4).contains(&items.len())
        {
            return Err(error::malformed(
                case.span,
                "a reduction case has the shape `(--> pattern template [name])`",
            ));
        }
        let case_name = match items.get(3).map(|s| &s.kind) {
            None => None,
            Some(SExpKind::Atom(Atom::String(text) | Atom::Symbol(text))) => Some(text.clone()),
            Some(_) => {
                return Err(error::malformed(
                    items[3].span,
                    "a reduction case name is a string or symbol",
                ));
            }
        };
        cases.push(ReductionCase {
            pattern: pattern_of(&items[1])?,
            template: template_of(&items[2])?,
            name: case_name,
            span: case.span,
        });
    }

    Ok(DefineReductionRelation {
        name,
        language,
        domain,
        cases,
        span,
    })
}

fn define_metafunction(args: &[SExp], span: Span) -> Result<DefineMetafunction, Diagnostic> {
    let language = symbol_arg(args.first(), span, "a language name")?;
    let mut rest = args.get(1..).unwrap_or(&[]);

    // Optional `f : dom ... -> cod` header.
    let mut declared = None;
    let mut contract = None;
    if let Some(name) = rest.first().and_then(SExp::as_symbol) {
        declared = Some(Symbol::new(name));
        rest = &rest[1..];
        if rest.first().is_some_and(|s| s.is_symbol(":")) {
            let Some(arrow) = rest.iter().position(|s| s.is_symbol("->")) else {
                return Err(error::malformed(span, "metafunction contract is missing `->`"));
            };
            let Some(codomain) = rest.get(arrow + 1) else {
                return Err(error::malformed(span, "metafunction contract is missing a codomain"));
            };
            contract = Some(Contract {
                domain: pattern_items(&rest[1..arrow])?,
                codomain: pattern_of(codomain)?,
            });
            rest = &rest[arrow + 2..];
        }
    }

    let mut name = declared;
    let mut cases = Vec::new();
    for case in rest {
        let items = list_arg(Some(case), span, "a `[(f pattern ...) template]` case")?;
        let [lhs, rhs] = items else {
            return Err(error::malformed(
                case.span,
                "a metafunction case has the shape `[(f pattern ...) template]`",
            ));
        };
        let lhs_items = list_arg(Some(lhs), case.span, "`(f pattern ...)`")?;
        let case_name = symbol_arg(lhs_items.first(), lhs.span, "the metafunction name")?;
        match &name {
            Some(expected) if *expected != case_name => {
                return Err(error::malformed(
                    lhs.span,
                    format!("case is for `{case_name}`, but the metafunction is `{expected}`"),
                ));
            }
            Some(_) => {}
            None => name = Some(case_name),
        }
        cases.push(MetafunctionCase {
            args: pattern_items(&lhs_items[1..])?,
            template: template_of(rhs)?,
            span: case.span,
        });
    }

    let Some(name) = name else {
        return Err(error::malformed(span, "metafunction has no name and no cases"));
    };
    Ok(DefineMetafunction {
        name,
        language,
        contract,
        cases,
        span,
    })
}

// ── Matching and assertions ─────────────────────────────────────────

fn redex_match(args: &[SExp], span: Span) -> Result<RedexMatch, Diagnostic> {
    expect_arity(args, 3, span, "redex-match")?;
    Ok(RedexMatch {
        language: symbol_arg(args.first(), span, "a language name")?,
        pattern: pattern_of(&args[1])?,
        term: term_of(&args[2]),
        span,
    })
}

fn assert_match_equal(args: &[SExp], span: Span) -> Result<AssertMatchEqual, Diagnostic> {
    expect_arity(args, 4, span, "redex-match-assert-equal")?;
    let matches = list_arg(args.get(3), span, "a list of expected matches")?;
    let expected = matches
        .iter()
        .map(expected_match)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AssertMatchEqual {
        language: symbol_arg(args.first(), span, "a language name")?,
        pattern: pattern_of(&args[1])?,
        term: term_of(&args[2]),
        expected,
        span,
    })
}

/// `((sym term) ...)`.
fn expected_match(sexp: &SExp) -> Result<ExpectedMatch, Diagnostic> {
    let bindings = list_arg(Some(sexp), sexp.span, "a list of `(symbol term)` bindings")?;
    bindings
        .iter()
        .map(|binding| match binding.as_list() {
            Some([symbol, term]) => {
                let symbol = symbol_arg(Some(symbol), binding.span, "a bound symbol")?;
                Ok((symbol, term_of(term)))
            }
            _ => Err(error::malformed(
                binding.span,
                "a binding has the shape `(symbol term)`",
            )),
        })
        .collect()
}

fn assert_term_equal(args: &[SExp], span: Span) -> Result<AssertTermEqual, Diagnostic> {
    expect_arity(args, 4, span, "term-let-assert-equal")?;
    let pairs = list_arg(args.get(1), span, "a list of `(pattern term)` bindings")?;
    let bindings = pairs
        .iter()
        .map(|pair| match pair.as_list() {
            Some([pattern, term]) => Ok((pattern_of(pattern)?, term_of(term))),
            _ => Err(error::malformed(
                pair.span,
                "a binding has the shape `(pattern term)`",
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AssertTermEqual {
        language: symbol_arg(args.first(), span, "a language name")?,
        bindings,
        template: template_of(&args[2])?,
        expected: term_of(&args[3]),
        span,
    })
}

fn assert_reduction_equal(args: &[SExp], span: Span) -> Result<AssertReductionEqual, Diagnostic> {
    expect_arity(args, 3, span, "apply-reduction-relation-assert-equal")?;
    let expected = list_arg(args.get(2), span, "a list of expected terms")?;
    Ok(AssertReductionEqual {
        relation: symbol_arg(args.first(), span, "a relation name")?,
        term: term_of(&args[1]),
        expected: expected.iter().map(term_of).collect(),
        span,
    })
}
