//! Whole-specification compilation.
//!
//! Compilation runs in two phases. The first validates every form and
//! prepares every pattern, so each language's mentioned-variables set is
//! complete before the second phase generates any code from it.

use redex_diagnostic::{Diagnostic, ErrorCode};
use redex_ir::code::{BinaryOp, Expr, Module, Operand, RuntimeFn, Stmt};
use redex_ir::{Form, Pattern, Span, Spec, Symbol, Template, Term};
use redex_patterns::{DepthMap, Language, PreparedPattern};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::annotate::annotate;
use crate::context::{assign, call_rt, effect, symbol_operand, var, CompilationContext, CompileOptions};
use crate::matcher::MatcherGen;
use crate::term::compile_template;

/// A compiled specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub module: Module,
    /// Zero-argument functions run by the driver, in source order.
    pub entries: Vec<Entry>,
    /// Reduction relation name to its `reduce_*(t)` function.
    pub relations: FxHashMap<Symbol, Symbol>,
    /// Metafunction name to its `mf_*(args)` function.
    pub metafunctions: FxHashMap<Symbol, Symbol>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// `redex-match`: returns its matches.
    Match,
    /// An assertion form: raises when it fails.
    Assertion,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub function: Symbol,
    /// The form's head and arguments, for reporting and filtering.
    pub description: String,
    pub kind: EntryKind,
    pub span: Span,
}

/// Compile a parsed specification.
#[tracing::instrument(level = "debug", skip_all, fields(forms = spec.forms.len()))]
pub fn compile_spec(spec: &Spec, options: &CompileOptions) -> Result<Program, Diagnostic> {
    let mut ctx = CompilationContext::new(options.clone());
    let mut languages = FxHashMap::default();
    let mut relations = FxHashMap::default();
    let mut metafunctions = FxHashMap::default();

    // ── Names ───────────────────────────────────────────────────────
    let mut defined: FxHashMap<Symbol, Span> = FxHashMap::default();
    for form in &spec.forms {
        let (name, kind) = match form {
            Form::DefineLanguage(def) => {
                let language = Language::new(def)?;
                languages.insert(def.name.clone(), language);
                (&def.name, "language")
            }
            Form::DefineReductionRelation(def) => {
                relations.insert(def.name.clone(), ctx.fresh_function("reduce", def.name.as_str()));
                (&def.name, "reduction relation")
            }
            Form::DefineMetafunction(def) => {
                metafunctions.insert(def.name.clone(), ctx.fresh_function("mf", def.name.as_str()));
                (&def.name, "metafunction")
            }
            _ => continue,
        };
        if let Some(previous) = defined.insert(name.clone(), form.span()) {
            return Err(Diagnostic::error(ErrorCode::E2008)
                .with_message(format!("{kind} `{name}` is defined more than once"))
                .with_label(form.span(), "redefined here")
                .with_secondary_label(previous, "first defined here"));
        }
    }

    // ── Preparation ─────────────────────────────────────────────────
    let mut prepared = Vec::with_capacity(spec.forms.len());
    for form in &spec.forms {
        prepared.push(prepare_form(form, &mut languages, &relations)?);
    }

    // ── Code generation ─────────────────────────────────────────────
    let metafunction_names: FxHashSet<Symbol> = metafunctions.keys().cloned().collect();
    let mut gen = ProgramGen {
        ctx: &mut ctx,
        languages: &languages,
        metafunctions: &metafunctions,
        metafunction_names: &metafunction_names,
        foreign_sources: Vec::new(),
        entries: Vec::new(),
    };
    for (form, item) in spec.forms.iter().zip(&prepared) {
        gen.form(item)
            .map_err(|diagnostic| diagnostic.or_label(form.span(), "in this form"))?;
    }
    let ProgramGen {
        foreign_sources,
        entries,
        ..
    } = gen;

    tracing::debug!(entries = entries.len(), "specification compiled");
    Ok(Program {
        module: Module {
            foreign_sources,
            body: ctx.into_statements(),
        },
        entries,
        relations,
        metafunctions,
    })
}

// ── Phase one ───────────────────────────────────────────────────────

enum Prepared {
    Language,
    Relation {
        name: Symbol,
        function: Symbol,
        language: Symbol,
        domain: Option<PreparedPattern>,
        cases: Vec<(PreparedPattern, Template)>,
    },
    Metafunction {
        name: Symbol,
        language: Symbol,
        domain: Option<PreparedPattern>,
        codomain: Option<PreparedPattern>,
        cases: Vec<(PreparedPattern, Template)>,
    },
    RedexMatch {
        language: Symbol,
        pattern: PreparedPattern,
        term: Term,
        description: String,
        span: Span,
    },
    AssertMatch {
        language: Symbol,
        pattern: PreparedPattern,
        term: Term,
        expected: Vec<Vec<(Symbol, Term)>>,
        description: String,
        span: Span,
    },
    AssertTerm {
        language: Symbol,
        bindings: Vec<(PreparedPattern, Term)>,
        depths: DepthMap,
        template: Template,
        expected: Term,
        description: String,
        span: Span,
    },
    AssertReduction {
        relation: Symbol,
        function: Symbol,
        term: Term,
        expected: Vec<Term>,
        description: String,
        span: Span,
    },
    ForeignSource(String),
}

fn language_mut<'a>(
    languages: &'a mut FxHashMap<Symbol, Language>,
    name: &Symbol,
    span: Span,
) -> Result<&'a mut Language, Diagnostic> {
    languages.get_mut(name).ok_or_else(|| {
        Diagnostic::error(ErrorCode::E2004)
            .with_message(format!("unknown language `{name}`"))
            .with_label(span, "used here")
    })
}

fn prepare_form(
    form: &Form,
    languages: &mut FxHashMap<Symbol, Language>,
    relations: &FxHashMap<Symbol, Symbol>,
) -> Result<Prepared, Diagnostic> {
    let span = form.span();
    let at_form = |diagnostic: Diagnostic| diagnostic.or_label(span, "in this form");
    Ok(match form {
        Form::DefineLanguage(_) => Prepared::Language,
        Form::DefineReductionRelation(def) => {
            let language = language_mut(languages, &def.language, span)?;
            let domain = def
                .domain
                .as_ref()
                .map(|domain| language.prepare(domain))
                .transpose()
                .map_err(at_form)?;
            let mut cases = Vec::with_capacity(def.cases.len());
            for case in &def.cases {
                let pattern = language
                    .prepare(&case.pattern)
                    .map_err(|diagnostic| diagnostic.or_label(case.span, "in this case"))?;
                cases.push((pattern, case.template.clone()));
            }
            let Some(function) = relations.get(&def.name).cloned() else {
                return Err(Diagnostic::internal(format!("relation `{}` was not registered", def.name)));
            };
            Prepared::Relation {
                name: def.name.clone(),
                function,
                language: def.language.clone(),
                domain,
                cases,
            }
        }
        Form::DefineMetafunction(def) => {
            let language = language_mut(languages, &def.language, span)?;
            let (domain, codomain) = match &def.contract {
                Some(contract) => (
                    Some(
                        language
                            .prepare(&Pattern::Sequence(contract.domain.clone()))
                            .map_err(at_form)?,
                    ),
                    Some(language.prepare(&contract.codomain).map_err(at_form)?),
                ),
                None => (None, None),
            };
            let mut cases = Vec::with_capacity(def.cases.len());
            for case in &def.cases {
                let pattern = language
                    .prepare(&Pattern::Sequence(case.args.clone()))
                    .map_err(|diagnostic| diagnostic.or_label(case.span, "in this case"))?;
                cases.push((pattern, case.template.clone()));
            }
            Prepared::Metafunction {
                name: def.name.clone(),
                language: def.language.clone(),
                domain,
                codomain,
                cases,
            }
        }
        Form::RedexMatch(form) => Prepared::RedexMatch {
            pattern: language_mut(languages, &form.language, span)?
                .prepare(&form.pattern)
                .map_err(at_form)?,
            language: form.language.clone(),
            term: form.term.clone(),
            description: format!("redex-match {} {} {}", form.language, form.pattern, form.term),
            span,
        },
        Form::AssertMatchEqual(form) => Prepared::AssertMatch {
            pattern: language_mut(languages, &form.language, span)?
                .prepare(&form.pattern)
                .map_err(at_form)?,
            language: form.language.clone(),
            term: form.term.clone(),
            expected: form.expected.clone(),
            description: format!(
                "redex-match-assert-equal {} {} {}",
                form.language, form.pattern, form.term
            ),
            span,
        },
        Form::AssertTermEqual(form) => {
            let language = language_mut(languages, &form.language, span)?;
            let mut bindings = Vec::with_capacity(form.bindings.len());
            let mut depths = DepthMap::default();
            for (pattern, term) in &form.bindings {
                let pattern = language.prepare(pattern).map_err(at_form)?;
                for (symbol, depth) in &pattern.depths {
                    if pattern.synthetic.contains(symbol) {
                        continue;
                    }
                    if depths.insert(symbol.clone(), *depth).is_some() {
                        return Err(Diagnostic::error(ErrorCode::E3001)
                            .with_message(format!("`{symbol}` is bound by more than one term-let pattern"))
                            .with_label(span, "in this form"));
                    }
                }
                bindings.push((pattern, term.clone()));
            }
            Prepared::AssertTerm {
                language: form.language.clone(),
                bindings,
                depths,
                template: form.template.clone(),
                expected: form.expected.clone(),
                description: format!("term-let-assert-equal {} {}", form.template, form.expected),
                span,
            }
        }
        Form::AssertReductionEqual(form) => {
            let Some(function) = relations.get(&form.relation) else {
                return Err(Diagnostic::error(ErrorCode::E3004)
                    .with_message(format!("unknown reduction relation `{}`", form.relation))
                    .with_label(span, "used here"));
            };
            Prepared::AssertReduction {
                relation: form.relation.clone(),
                function: function.clone(),
                term: form.term.clone(),
                expected: form.expected.clone(),
                description: format!(
                    "apply-reduction-relation-assert-equal {} {}",
                    form.relation, form.term
                ),
                span,
            }
        }
        Form::RequireForeignSource { path, .. } => Prepared::ForeignSource(path.clone()),
    })
}

// ── Phase two ───────────────────────────────────────────────────────

struct ProgramGen<'a> {
    ctx: &'a mut CompilationContext,
    languages: &'a FxHashMap<Symbol, Language>,
    metafunctions: &'a FxHashMap<Symbol, Symbol>,
    metafunction_names: &'a FxHashSet<Symbol>,
    foreign_sources: Vec<String>,
    entries: Vec<Entry>,
}

impl ProgramGen<'_> {
    fn form(&mut self, item: &Prepared) -> Result<(), Diagnostic> {
        match item {
            Prepared::Language => Ok(()),
            Prepared::Relation {
                name,
                function,
                language,
                domain,
                cases,
            } => self.relation(name, function, language, domain.as_ref(), cases),
            Prepared::Metafunction {
                name,
                language,
                domain,
                codomain,
                cases,
            } => self.metafunction(name, language, domain.as_ref(), codomain.as_ref(), cases),
            Prepared::RedexMatch {
                language,
                pattern,
                term,
                description,
                span,
            } => {
                let matcher = self.top_level(language, pattern)?;
                let name = self.ctx.fresh_function("redex_match", "");
                let input = self.ctx.literal(term);
                let found = self.ctx.fresh_temp("ms");
                let mut body = vec![assign(&found, Expr::call(&matcher, vec![var(&input)]))];
                if self.ctx.options.emit_prints {
                    let text = self.ctx.fresh_temp("s");
                    body.push(call_rt(&text, RuntimeFn::MatchesToString, vec![var(&found)]));
                    body.push(Stmt::Print(var(&text)));
                }
                body.push(Stmt::Return(var(&found)));
                self.entry(name, body, description, EntryKind::Match, *span);
                Ok(())
            }
            Prepared::AssertMatch {
                language,
                pattern,
                term,
                expected,
                description,
                span,
            } => {
                let matcher = self.top_level(language, pattern)?;
                let name = self.ctx.fresh_function("assert", "match");
                let input = self.ctx.literal(term);
                let (actual, wanted) = (self.ctx.fresh_temp("ms"), self.ctx.fresh_temp("expected"));
                let mut body = vec![
                    assign(&actual, Expr::call(&matcher, vec![var(&input)])),
                    call_rt(&wanted, RuntimeFn::NewList, vec![]),
                ];
                for bindings in expected {
                    let env = self.ctx.fresh_temp("m");
                    body.push(call_rt(&env, RuntimeFn::NewMatch, vec![]));
                    for (symbol, value) in bindings {
                        let value = self.ctx.literal(value);
                        body.push(effect(
                            RuntimeFn::MatchAdd,
                            vec![var(&env), symbol_operand(symbol), var(&value)],
                        ));
                    }
                    body.push(effect(RuntimeFn::ListAppend, vec![var(&wanted), var(&env)]));
                }
                let equal = self.ctx.fresh_temp("ok");
                body.push(call_rt(&equal, RuntimeFn::MatchSetsEqual, vec![var(&actual), var(&wanted)]));
                let message = self.mismatch(RuntimeFn::MatchesToString, &wanted, &actual);
                body.push(unless(&equal, message));
                body.push(Stmt::Return(Operand::none()));
                self.entry(name, body, description, EntryKind::Assertion, *span);
                Ok(())
            }
            Prepared::AssertTerm {
                language,
                bindings,
                depths,
                template,
                expected,
                description,
                span,
            } => self.assert_term(language, bindings, depths, template, expected, description, *span),
            Prepared::AssertReduction {
                relation,
                function,
                term,
                expected,
                description,
                span,
            } => {
                let name = self.ctx.fresh_function("assert", relation.as_str());
                let input = self.ctx.literal(term);
                let (actual, wanted) = (self.ctx.fresh_temp("rs"), self.ctx.fresh_temp("expected"));
                let mut body = vec![
                    assign(&actual, Expr::call(function, vec![var(&input)])),
                    call_rt(&wanted, RuntimeFn::NewList, vec![]),
                ];
                for term in expected {
                    let term = self.ctx.literal(term);
                    body.push(effect(RuntimeFn::ListAppend, vec![var(&wanted), var(&term)]));
                }
                let equal = self.ctx.fresh_temp("ok");
                body.push(call_rt(&equal, RuntimeFn::TermSetsEqual, vec![var(&actual), var(&wanted)]));
                let message = self.mismatch(RuntimeFn::TermsToString, &wanted, &actual);
                body.push(unless(&equal, message));
                body.push(Stmt::Return(Operand::none()));
                self.entry(name, body, description, EntryKind::Assertion, *span);
                Ok(())
            }
            Prepared::ForeignSource(path) => {
                self.foreign_sources.push(path.clone());
                Ok(())
            }
        }
    }

    fn top_level(&mut self, language: &Symbol, pattern: &PreparedPattern) -> Result<Symbol, Diagnostic> {
        let languages = self.languages;
        let Some(language) = languages.get(language) else {
            return Err(Diagnostic::error(ErrorCode::E2004).with_message(format!("unknown language `{language}`")));
        };
        MatcherGen::new(self.ctx, language).top_level(pattern)
    }

    fn template(&mut self, template: &Template, depths: &DepthMap) -> Result<Symbol, Diagnostic> {
        let annotated = annotate(template, depths, self.metafunction_names)?;
        compile_template(self.ctx, self.metafunctions, &annotated)
    }

    fn entry(&mut self, name: Symbol, body: Vec<Stmt>, description: &str, kind: EntryKind, span: Span) {
        self.ctx.push_function(name.clone(), Vec::new(), body);
        self.entries.push(Entry {
            function: name,
            description: description.to_owned(),
            kind,
            span,
        });
    }

    /// `def reduce_R(t)`: every case's every match, instantiated.
    fn relation(
        &mut self,
        name: &Symbol,
        function: &Symbol,
        language: &Symbol,
        domain: Option<&PreparedPattern>,
        cases: &[(PreparedPattern, Template)],
    ) -> Result<(), Diagnostic> {
        let t = Symbol::new("t");
        let out = self.ctx.fresh_temp("out");
        let mut body = vec![call_rt(&out, RuntimeFn::NewList, vec![])];
        if let Some(domain) = domain {
            let check = self.ctx.fresh_temp("ok");
            let matcher = self.top_level(language, domain)?;
            body.extend(self.matches_any(&matcher, &t, &check));
            let message = self.describe(&format!("{name}: term not in domain: "), &t);
            body.push(unless(&check, message));
        }
        for (pattern, template) in cases {
            let matcher = self.top_level(language, pattern)?;
            let builder = self.template(template, &pattern.depths)?;
            let (found, m, term) = (
                self.ctx.fresh_temp("ms"),
                self.ctx.fresh_temp("m"),
                self.ctx.fresh_temp("t"),
            );
            body.push(assign(&found, Expr::call(&matcher, vec![var(&t)])));
            body.push(Stmt::ForEach {
                targets: vec![m.clone()],
                iterable: found,
                body: vec![
                    assign(&term, Expr::call(&builder, vec![var(&m)])),
                    effect(RuntimeFn::ListAppend, vec![var(&out), var(&term)]),
                ],
            });
        }
        body.push(Stmt::Return(var(&out)));
        self.ctx.push_function(function.clone(), vec![t], body);
        Ok(())
    }

    /// `def mf_f(args)`: the first case with a match decides the result.
    fn metafunction(
        &mut self,
        name: &Symbol,
        language: &Symbol,
        domain: Option<&PreparedPattern>,
        codomain: Option<&PreparedPattern>,
        cases: &[(PreparedPattern, Template)],
    ) -> Result<(), Diagnostic> {
        let Some(function) = self.metafunctions.get(name).cloned() else {
            return Err(Diagnostic::internal(format!("metafunction `{name}` was not registered")));
        };
        let args = Symbol::new("args");
        let mut body = Vec::new();
        if let Some(domain) = domain {
            let check = self.ctx.fresh_temp("ok");
            let matcher = self.top_level(language, domain)?;
            body.extend(self.matches_any(&matcher, &args, &check));
            let message = self.describe(&format!("{name}: arguments not in domain: "), &args);
            body.push(unless(&check, message));
        }
        let codomain = codomain
            .map(|codomain| self.top_level(language, codomain))
            .transpose()?;

        for (pattern, template) in cases {
            let matcher = self.top_level(language, pattern)?;
            let builder = self.template(template, &pattern.depths)?;
            let (found, count, any, first, result) = (
                self.ctx.fresh_temp("ms"),
                self.ctx.fresh_temp("n"),
                self.ctx.fresh_temp("ok"),
                self.ctx.fresh_temp("m"),
                self.ctx.fresh_temp("r"),
            );
            let mut chosen = vec![
                call_rt(&first, RuntimeFn::ListGet, vec![var(&found), Operand::int(0)]),
                assign(&result, Expr::call(&builder, vec![var(&first)])),
            ];
            if let Some(codomain) = &codomain {
                let check = self.ctx.fresh_temp("ok");
                chosen.extend(self.matches_any(codomain, &result, &check));
                let message = self.describe(&format!("{name}: result not in codomain: "), &result);
                chosen.push(unless(&check, message));
            }
            chosen.push(Stmt::Return(var(&result)));
            body.extend([
                assign(&found, Expr::call(&matcher, vec![var(&args)])),
                call_rt(&count, RuntimeFn::ListLen, vec![var(&found)]),
                assign(&any, Expr::binary(BinaryOp::Gt, &count, Operand::int(0))),
                Stmt::If {
                    condition: var(&any),
                    then_body: chosen,
                    else_body: Vec::new(),
                },
            ]);
        }
        let (message, build) = self.describe(&format!("{name}: no clauses matched for "), &args);
        body.extend(build);
        body.push(Stmt::Raise(var(&message)));
        self.ctx.push_function(function, vec![args], body);
        Ok(())
    }

    #[allow(clippy::too_many_arguments, reason = "one parameter per field of the form")]
    fn assert_term(
        &mut self,
        language: &Symbol,
        bindings: &[(PreparedPattern, Term)],
        depths: &DepthMap,
        template: &Template,
        expected: &Term,
        description: &str,
        span: Span,
    ) -> Result<(), Diagnostic> {
        let name = self.ctx.fresh_function("assert", "term");
        let env = self.ctx.fresh_temp("m");
        let mut body = vec![call_rt(&env, RuntimeFn::NewMatch, vec![])];
        for (pattern, term) in bindings {
            let matcher = self.top_level(language, pattern)?;
            let input = self.ctx.literal(term);
            let (found, count, any, first) = (
                self.ctx.fresh_temp("ms"),
                self.ctx.fresh_temp("n"),
                self.ctx.fresh_temp("ok"),
                self.ctx.fresh_temp("m"),
            );
            body.extend([
                assign(&found, Expr::call(&matcher, vec![var(&input)])),
                call_rt(&count, RuntimeFn::ListLen, vec![var(&found)]),
                assign(&any, Expr::binary(BinaryOp::Gt, &count, Operand::int(0))),
            ]);
            let message = self.describe(
                &format!("term-let: `{}` does not match ", pattern.pattern),
                &input,
            );
            body.push(unless(&any, message));
            body.extend([
                call_rt(&first, RuntimeFn::ListGet, vec![var(&found), Operand::int(0)]),
                effect(RuntimeFn::MatchMerge, vec![var(&env), var(&first)]),
            ]);
        }
        let builder = self.template(template, depths)?;
        let (built, wanted, equal) = (
            self.ctx.fresh_temp("t"),
            self.ctx.literal(expected),
            self.ctx.fresh_temp("ok"),
        );
        body.extend([
            assign(&built, Expr::call(&builder, vec![var(&env)])),
            call_rt(&equal, RuntimeFn::TermEq, vec![var(&built), var(&wanted)]),
        ]);
        let message = self.describe(&format!("term-let: expected {expected}, got "), &built);
        body.push(unless(&equal, message));
        body.push(Stmt::Return(Operand::none()));
        self.entry(name, body, description, EntryKind::Assertion, span);
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────────

    /// `check = len(matcher(term)) > 0`.
    fn matches_any(&mut self, matcher: &Symbol, term: &Symbol, check: &Symbol) -> Vec<Stmt> {
        let (found, count) = (self.ctx.fresh_temp("ms"), self.ctx.fresh_temp("n"));
        vec![
            assign(&found, Expr::call(matcher, vec![var(term)])),
            call_rt(&count, RuntimeFn::ListLen, vec![var(&found)]),
            assign(check, Expr::binary(BinaryOp::Gt, &count, Operand::int(0))),
        ]
    }

    /// Statements computing `prefix + term_to_string(term)`.
    fn describe(&mut self, prefix: &str, term: &Symbol) -> (Symbol, Vec<Stmt>) {
        let (text, message) = (self.ctx.fresh_temp("s"), self.ctx.fresh_temp("msg"));
        (
            message.clone(),
            vec![
                call_rt(&text, RuntimeFn::TermToString, vec![var(term)]),
                assign(&message, Expr::binary(BinaryOp::Add, Operand::str(prefix), &text)),
            ],
        )
    }

    /// Statements computing `"expected X, got Y"` for two result lists.
    fn mismatch(&mut self, render: RuntimeFn, expected: &Symbol, actual: &Symbol) -> (Symbol, Vec<Stmt>) {
        let (wanted, got, head, tail, message) = (
            self.ctx.fresh_temp("s"),
            self.ctx.fresh_temp("s"),
            self.ctx.fresh_temp("msg"),
            self.ctx.fresh_temp("msg"),
            self.ctx.fresh_temp("msg"),
        );
        (
            message.clone(),
            vec![
                call_rt(&wanted, render, vec![var(expected)]),
                call_rt(&got, render, vec![var(actual)]),
                assign(&head, Expr::binary(BinaryOp::Add, Operand::str("expected "), &wanted)),
                assign(&tail, Expr::binary(BinaryOp::Add, &head, Operand::str(", got "))),
                assign(&message, Expr::binary(BinaryOp::Add, &tail, &got)),
            ],
        )
    }
}

/// `if ok: pass else: <build message>; raise message`.
fn unless(condition: &Symbol, (message, mut build): (Symbol, Vec<Stmt>)) -> Stmt {
    build.push(Stmt::Raise(var(&message)));
    Stmt::If {
        condition: var(condition),
        then_body: Vec::new(),
        else_body: build,
    }
}

#[cfg(test)]
mod tests;
