//! Top-level specification forms, as produced by the reader.
//!
//! The reader guarantees syntactic well-formedness only. Everything here is
//! still unresolved: patterns contain [`Pattern::Unresolved`] leaves and
//! templates contain bare [`Template::Symbol`]s.

use crate::{Pattern, Span, Symbol, Template, Term};

/// A parsed specification file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spec {
    pub forms: Vec<Form>,
}

/// One top-level form.
#[derive(Clone, Debug, PartialEq)]
pub enum Form {
    DefineLanguage(DefineLanguage),
    DefineReductionRelation(DefineReductionRelation),
    DefineMetafunction(DefineMetafunction),
    RedexMatch(RedexMatch),
    AssertMatchEqual(AssertMatchEqual),
    AssertTermEqual(AssertTermEqual),
    AssertReductionEqual(AssertReductionEqual),
    RequireForeignSource { path: String, span: Span },
}

impl Form {
    pub fn span(&self) -> Span {
        match self {
            Form::DefineLanguage(def) => def.span,
            Form::DefineReductionRelation(def) => def.span,
            Form::DefineMetafunction(def) => def.span,
            Form::RedexMatch(form) => form.span,
            Form::AssertMatchEqual(form) => form.span,
            Form::AssertTermEqual(form) => form.span,
            Form::AssertReductionEqual(form) => form.span,
            Form::RequireForeignSource { span, .. } => *span,
        }
    }
}

/// `(define-language L (e ::= alt ...) ...)`.
#[derive(Clone, Debug, PartialEq)]
pub struct DefineLanguage {
    pub name: Symbol,
    pub non_terminals: Vec<NonTerminalDef>,
    pub span: Span,
}

/// One `(name ::= alternative ...)` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct NonTerminalDef {
    pub name: Symbol,
    pub alternatives: Vec<Pattern>,
    pub span: Span,
}

/// `(define-reduction-relation R L #:domain p (--> pattern template name) ...)`.
#[derive(Clone, Debug, PartialEq)]
pub struct DefineReductionRelation {
    pub name: Symbol,
    pub language: Symbol,
    pub domain: Option<Pattern>,
    pub cases: Vec<ReductionCase>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReductionCase {
    pub pattern: Pattern,
    pub template: Template,
    pub name: Option<String>,
    pub span: Span,
}

/// `(define-metafunction L f : dom ... -> cod [(f p ...) template] ...)`.
#[derive(Clone, Debug, PartialEq)]
pub struct DefineMetafunction {
    pub name: Symbol,
    pub language: Symbol,
    pub contract: Option<Contract>,
    pub cases: Vec<MetafunctionCase>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Contract {
    pub domain: Vec<Pattern>,
    pub codomain: Pattern,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetafunctionCase {
    /// Argument patterns, without the metafunction name.
    pub args: Vec<Pattern>,
    pub template: Template,
    pub span: Span,
}

/// `(redex-match L pattern term)`: prints the matches.
#[derive(Clone, Debug, PartialEq)]
pub struct RedexMatch {
    pub language: Symbol,
    pub pattern: Pattern,
    pub term: Term,
    pub span: Span,
}

/// Expected bindings of one match.
pub type ExpectedMatch = Vec<(Symbol, Term)>;

/// `(redex-match-assert-equal L pattern term (((sym term) ...) ...))`.
#[derive(Clone, Debug, PartialEq)]
pub struct AssertMatchEqual {
    pub language: Symbol,
    pub pattern: Pattern,
    pub term: Term,
    pub expected: Vec<ExpectedMatch>,
    pub span: Span,
}

/// `(term-let-assert-equal L ((pattern term) ...) template expected)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AssertTermEqual {
    pub language: Symbol,
    pub bindings: Vec<(Pattern, Term)>,
    pub template: Template,
    pub expected: Term,
    pub span: Span,
}

/// `(apply-reduction-relation-assert-equal R term (expected ...))`.
#[derive(Clone, Debug, PartialEq)]
pub struct AssertReductionEqual {
    pub relation: Symbol,
    pub term: Term,
    pub expected: Vec<Term>,
    pub span: Span,
}
