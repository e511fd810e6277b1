//! Pattern-matching code generation.
//!
//! Every distinct pattern compiles to one matching function
//!
//! ```text
//! def match_k(terms, head, tail, m) -> [(m', head'), ...]
//! ```
//!
//! which tries to match a prefix of `terms[head..tail]` and returns every
//! way it can, each with its extended environment and the index after the
//! consumed elements. An empty list means "no match". Matchers never mutate
//! the environment they are given; they copy before binding.
//!
//! Non-terminals compile to `is-a` predicates over a single term. Both
//! kinds of function are memoized per language, and the name is reserved
//! before the body is generated so that recursive grammars terminate.

use redex_diagnostic::Diagnostic;
use redex_ir::code::{BinaryOp, Expr, Lit, Operand, RuntimeFn, Stmt};
use redex_ir::{BuiltIn, BuiltInKind, ConstraintCheck, Pattern, RepeatMode, Symbol, Term};
use redex_patterns::{Language, PreparedPattern};
use redex_stack::ensure_sufficient_stack;

use crate::context::{assign, call_rt, effect, if_then, symbol_operand, var, CompilationContext};

const TERMS: &str = "terms";
const HEAD: &str = "head";
const TAIL: &str = "tail";
const ENV: &str = "m";

fn param(name: &str) -> Symbol {
    Symbol::new(name)
}

fn matcher_params() -> Vec<Symbol> {
    [TERMS, HEAD, TAIL, ENV].into_iter().map(param).collect()
}

/// Generates matchers for one language.
pub struct MatcherGen<'a> {
    ctx: &'a mut CompilationContext,
    language: &'a Language,
}

impl<'a> MatcherGen<'a> {
    pub fn new(ctx: &'a mut CompilationContext, language: &'a Language) -> Self {
        MatcherGen { ctx, language }
    }

    /// `def matches_k(t)`: every match of a prepared pattern against a
    /// whole term, with synthetic constraint symbols removed.
    pub fn top_level(&mut self, prepared: &PreparedPattern) -> Result<Symbol, Diagnostic> {
        let inner = self.matcher(&prepared.pattern)?;
        let name = self.ctx.fresh_function("matches", self.language.name().as_str());
        let t = param("t");
        let terms = param(TERMS);
        let m = param(ENV);
        let results = self.ctx.fresh_temp("rs");
        let out = self.ctx.fresh_temp("out");
        let (m1, h1, m2) = (
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("m"),
        );

        let mut per_result = vec![call_rt(&m2, RuntimeFn::MatchCopy, vec![var(&m1)])];
        for symbol in &prepared.synthetic {
            per_result.push(effect(
                RuntimeFn::MatchRemove,
                vec![var(&m2), symbol_operand(symbol)],
            ));
        }
        per_result.push(effect(RuntimeFn::ListAppend, vec![var(&out), var(&m2)]));

        let body = vec![
            call_rt(&terms, RuntimeFn::WrapTerm, vec![var(&t)]),
            call_rt(&m, RuntimeFn::NewMatch, vec![]),
            assign(
                &results,
                Expr::call(&inner, vec![var(&terms), Operand::int(0), Operand::int(1), var(&m)]),
            ),
            call_rt(&out, RuntimeFn::NewList, vec![]),
            Stmt::ForEach {
                targets: vec![m1, h1],
                iterable: results,
                body: per_result,
            },
            Stmt::Return(var(&out)),
        ];
        self.ctx.push_function(name.clone(), vec![t], body);
        Ok(name)
    }

    /// The memoized matching function for `pattern`.
    pub fn matcher(&mut self, pattern: &Pattern) -> Result<Symbol, Diagnostic> {
        let key = (self.language.name().clone(), pattern.clone());
        if let Some(name) = self.ctx.matchers.get(&key) {
            return Ok(name.clone());
        }
        let name = match pattern {
            Pattern::Literal(literal) => self.ctx.fresh_function("match_literal", &literal.to_string()),
            Pattern::BuiltIn(builtin) => self.ctx.fresh_function("match_builtin", builtin.prefix.as_str()),
            Pattern::NonTerminal { prefix, .. } => self.ctx.fresh_function("match_nt", prefix.as_str()),
            Pattern::Sequence(_) => self.ctx.fresh_function("match_sequence", ""),
            Pattern::Repeat { .. } => self.ctx.fresh_function("match_repeat", ""),
            Pattern::InHole { .. } => self.ctx.fresh_function("match_in_hole", ""),
            Pattern::Check(_) | Pattern::Unresolved(_) => {
                return Err(Diagnostic::internal(format!(
                    "no matcher can be generated for `{pattern}`"
                )));
            }
        };
        self.ctx.matchers.insert(key, name.clone());
        tracing::trace!(function = %name, %pattern, "generating matcher");

        let body = ensure_sufficient_stack(|| match pattern {
            Pattern::Sequence(items) => self.sequence_body(items),
            Pattern::Repeat { inner, mode } => self.repeat_body(inner, *mode),
            Pattern::InHole {
                context,
                contents,
                checks,
            } => self.in_hole_body(context, contents, checks),
            leaf => self.leaf_body(leaf),
        })?;
        self.ctx.push_function(name.clone(), matcher_params(), body);
        Ok(name)
    }

    /// `def isa_L_nt(t)`: whether some alternative of `non_terminal` matches.
    pub fn predicate(&mut self, non_terminal: &Symbol) -> Result<Symbol, Diagnostic> {
        let key = (self.language.name().clone(), non_terminal.clone());
        if let Some(name) = self.ctx.predicates.get(&key) {
            return Ok(name.clone());
        }
        let language = self.language;
        let Some(rule) = language.non_terminal(non_terminal.as_str()) else {
            return Err(Diagnostic::internal(format!(
                "`{non_terminal}` is not a non-terminal of `{}`",
                self.language.name()
            )));
        };
        let name = self.ctx.fresh_function(
            "isa",
            &format!("{}_{}", self.language.name(), non_terminal),
        );
        self.ctx.predicates.insert(key, name.clone());

        let t = param("t");
        let terms = param(TERMS);
        let m = param(ENV);
        let mut body = vec![
            call_rt(&terms, RuntimeFn::WrapTerm, vec![var(&t)]),
            call_rt(&m, RuntimeFn::NewMatch, vec![]),
        ];
        for alternative in &rule.alternatives {
            let matcher = self.matcher(&alternative.pattern)?;
            let (results, count, found) = (
                self.ctx.fresh_temp("rs"),
                self.ctx.fresh_temp("n"),
                self.ctx.fresh_temp("c"),
            );
            body.push(assign(
                &results,
                Expr::call(&matcher, vec![var(&terms), Operand::int(0), Operand::int(1), var(&m)]),
            ));
            body.push(call_rt(&count, RuntimeFn::ListLen, vec![var(&results)]));
            body.push(assign(&found, Expr::binary(BinaryOp::Gt, &count, Operand::int(0))));
            body.push(if_then(&found, vec![Stmt::Return(Operand::bool(true))]));
        }
        body.push(Stmt::Return(Operand::bool(false)));
        self.ctx.push_function(name.clone(), vec![t], body);
        Ok(name)
    }

    // ── Leaves ──────────────────────────────────────────────────────

    fn leaf_body(&mut self, leaf: &Pattern) -> Result<Vec<Stmt>, Diagnostic> {
        let (terms, head, tail, m) = (param(TERMS), param(HEAD), param(TAIL), param(ENV));
        let results = self.ctx.fresh_temp("results");
        let in_range = self.ctx.fresh_temp("c");
        let t = self.ctx.fresh_temp("t");
        let (m2, h2, pair) = (
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("p"),
        );

        let mut success = vec![call_rt(&m2, RuntimeFn::MatchCopy, vec![var(&m)])];
        if let Some(symbol) = leaf.binding_symbol() {
            success.push(effect(
                RuntimeFn::MatchAdd,
                vec![var(&m2), symbol_operand(symbol), var(&t)],
            ));
        }
        success.push(assign(&h2, Expr::binary(BinaryOp::Add, &head, Operand::int(1))));
        success.push(call_rt(&pair, RuntimeFn::MakePair, vec![var(&m2), var(&h2)]));
        success.push(effect(RuntimeFn::ListAppend, vec![var(&results), var(&pair)]));

        let mut in_bounds = vec![call_rt(&t, RuntimeFn::SeqGet, vec![var(&terms), var(&head)])];
        in_bounds.extend(self.leaf_test(leaf, &t, success)?);

        Ok(vec![
            call_rt(&results, RuntimeFn::NewList, vec![]),
            assign(&in_range, Expr::binary(BinaryOp::Lt, &head, &tail)),
            if_then(&in_range, in_bounds),
            Stmt::Return(var(&results)),
        ])
    }

    /// Statements testing `t` against a leaf, running `success` if it passes.
    fn leaf_test(&mut self, leaf: &Pattern, t: &Symbol, success: Vec<Stmt>) -> Result<Vec<Stmt>, Diagnostic> {
        let ok = self.ctx.fresh_temp("ok");
        let test = match leaf {
            Pattern::Literal(literal) => {
                let constant = self.ctx.literal(&literal.to_term());
                Expr::runtime(RuntimeFn::TermEq, vec![var(t), var(&constant)])
            }
            Pattern::NonTerminal { prefix, .. } => {
                let predicate = self.predicate(prefix)?;
                Expr::call(&predicate, vec![var(t)])
            }
            Pattern::BuiltIn(builtin) => match builtin.kind {
                BuiltInKind::VariableNotOtherwiseMentioned => {
                    let mentioned = self.mentioned_constant();
                    return Ok(self.variable_test(t, &mentioned, success));
                }
                BuiltInKind::VariableExcept => {
                    let excluded = self.excluded_constant(builtin);
                    return Ok(self.variable_test(t, &excluded, success));
                }
                kind => Expr::runtime(kind_test(kind), vec![var(t)]),
            },
            other => {
                return Err(Diagnostic::internal(format!("`{other}` is not a leaf pattern")));
            }
        };
        Ok(vec![assign(&ok, test), if_then(&ok, success)])
    }

    /// A variable not among the symbols of `excluded`.
    fn variable_test(&mut self, t: &Symbol, excluded: &Symbol, success: Vec<Stmt>) -> Vec<Stmt> {
        let is_variable = self.ctx.fresh_temp("v");
        let listed = self.ctx.fresh_temp("c");
        let ok = self.ctx.fresh_temp("ok");
        vec![
            call_rt(&is_variable, RuntimeFn::IsVariable, vec![var(t)]),
            if_then(
                &is_variable,
                vec![
                    call_rt(&listed, RuntimeFn::SeqContains, vec![var(excluded), var(t)]),
                    assign(&ok, Expr::binary(BinaryOp::Eq, &listed, Operand::Lit(Lit::Bool(false)))),
                    if_then(&ok, success),
                ],
            ),
        ]
    }

    /// Sequence constant of the language's mentioned variables.
    fn mentioned_constant(&mut self) -> Symbol {
        let language = self.language.name().clone();
        if let Some(name) = self.ctx.mentioned.get(&language) {
            return name.clone();
        }
        let term = Term::sequence(self.language.mentioned().iter().cloned().map(Term::Variable));
        let name = self.ctx.literal(&term);
        self.ctx.mentioned.insert(language, name.clone());
        name
    }

    fn excluded_constant(&mut self, builtin: &BuiltIn) -> Symbol {
        let term = Term::sequence(builtin.excluded.iter().cloned().map(Term::Variable));
        self.ctx.literal(&term)
    }

    // ── Sequences ───────────────────────────────────────────────────

    fn sequence_body(&mut self, items: &[Pattern]) -> Result<Vec<Stmt>, Diagnostic> {
        let (terms, head, tail, m) = (param(TERMS), param(HEAD), param(TAIL), param(ENV));
        let results = self.ctx.fresh_temp("results");
        let in_range = self.ctx.fresh_temp("c");
        let t = self.ctx.fresh_temp("t");
        let is_sequence = self.ctx.fresh_temp("s");
        let len = self.ctx.fresh_temp("n");
        let long_enough = self.ctx.fresh_temp("ok");
        let mut frontier = self.ctx.fresh_temp("frontier");

        let fixed = items.iter().filter(|item| item.is_fixed_width()).count();
        let open = items.iter().any(|item| matches!(item, Pattern::Repeat { .. }));
        let fixed = i64::try_from(fixed).unwrap_or(i64::MAX);
        let length_test = if open {
            Expr::binary(BinaryOp::Ge, &len, Operand::int(fixed))
        } else {
            Expr::binary(BinaryOp::Eq, &len, Operand::int(fixed))
        };

        let start = self.ctx.fresh_temp("p");
        let mut fold = vec![
            call_rt(&frontier, RuntimeFn::NewList, vec![]),
            call_rt(&start, RuntimeFn::MakePair, vec![var(&m), Operand::int(0)]),
            effect(RuntimeFn::ListAppend, vec![var(&frontier), var(&start)]),
        ];

        let mut remaining_fixed = fixed;
        for item in items {
            let next = self.ctx.fresh_temp("frontier");
            let (m1, h1) = (self.ctx.fresh_temp("m"), self.ctx.fresh_temp("h"));
            let step = match item {
                Pattern::Check(check) => self.check_step(check, &m1, &h1, &next),
                _ => {
                    let matcher = self.matcher(item)?;
                    let found = self.ctx.fresh_temp("rs");
                    let call = vec![
                        assign(
                            &found,
                            Expr::call(&matcher, vec![var(&t), var(&h1), var(&len), var(&m1)]),
                        ),
                        effect(RuntimeFn::ListExtend, vec![var(&next), var(&found)]),
                    ];
                    if item.is_fixed_width() {
                        // Skip entries too close to the end for what is left.
                        let (rest, room) = (self.ctx.fresh_temp("r"), self.ctx.fresh_temp("ok"));
                        let guarded = vec![
                            assign(&rest, Expr::binary(BinaryOp::Sub, &len, &h1)),
                            assign(&room, Expr::binary(BinaryOp::Ge, &rest, Operand::int(remaining_fixed))),
                            if_then(&room, call),
                        ];
                        remaining_fixed -= 1;
                        guarded
                    } else {
                        call
                    }
                }
            };
            fold.push(call_rt(&next, RuntimeFn::NewList, vec![]));
            fold.push(Stmt::ForEach {
                targets: vec![m1, h1],
                iterable: frontier.clone(),
                body: step,
            });
            frontier = next;
        }

        let (m1, h1, done, h2, pair) = (
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("done"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("p"),
        );
        fold.push(assign(&h2, Expr::binary(BinaryOp::Add, &head, Operand::int(1))));
        fold.push(Stmt::ForEach {
            targets: vec![m1.clone(), h1.clone()],
            iterable: frontier,
            body: vec![
                assign(&done, Expr::binary(BinaryOp::Eq, &h1, &len)),
                if_then(
                    &done,
                    vec![
                        call_rt(&pair, RuntimeFn::MakePair, vec![var(&m1), var(&h2)]),
                        effect(RuntimeFn::ListAppend, vec![var(&results), var(&pair)]),
                    ],
                ),
            ],
        });

        Ok(vec![
            call_rt(&results, RuntimeFn::NewList, vec![]),
            assign(&in_range, Expr::binary(BinaryOp::Lt, &head, &tail)),
            if_then(
                &in_range,
                vec![
                    call_rt(&t, RuntimeFn::SeqGet, vec![var(&terms), var(&head)]),
                    call_rt(&is_sequence, RuntimeFn::IsSequence, vec![var(&t)]),
                    if_then(
                        &is_sequence,
                        vec![
                            call_rt(&len, RuntimeFn::SeqLen, vec![var(&t)]),
                            assign(&long_enough, length_test),
                            if_then(&long_enough, fold),
                        ],
                    ),
                ],
            ),
            Stmt::Return(var(&results)),
        ])
    }

    /// Keep frontier entries whose two symbols are bound to equal terms.
    fn check_step(&mut self, check: &ConstraintCheck, m1: &Symbol, h1: &Symbol, next: &Symbol) -> Vec<Stmt> {
        let (equal, pair) = (self.ctx.fresh_temp("eq"), self.ctx.fresh_temp("p"));
        vec![
            call_rt(
                &equal,
                RuntimeFn::MatchCompare,
                vec![var(m1), symbol_operand(&check.left), symbol_operand(&check.right)],
            ),
            if_then(
                &equal,
                vec![
                    call_rt(&pair, RuntimeFn::MakePair, vec![var(m1), var(h1)]),
                    effect(RuntimeFn::ListAppend, vec![var(next), var(&pair)]),
                ],
            ),
        ]
    }

    // ── Repetition ──────────────────────────────────────────────────

    fn repeat_body(&mut self, inner: &Pattern, mode: RepeatMode) -> Result<Vec<Stmt>, Diagnostic> {
        let (terms, head, tail, m) = (param(TERMS), param(HEAD), param(TAIL), param(ENV));
        let matcher = self.matcher(inner)?;
        let bound = inner.bound_symbols();
        let m0 = self.ctx.fresh_temp("m");

        let mut body = vec![call_rt(&m0, RuntimeFn::MatchCopy, vec![var(&m)])];
        for symbol in &bound {
            body.push(effect(
                RuntimeFn::MatchIncreaseDepth,
                vec![var(&m0), symbol_operand(symbol)],
            ));
        }

        let finished = match mode {
            RepeatMode::NonDeterministic => self.explore_all(&mut body, &matcher, &m0, &terms, &head, &tail),
            RepeatMode::Deterministic => self.explore_greedy(&mut body, &matcher, &m0, &terms, &head, &tail),
        };

        let out = self.ctx.fresh_temp("out");
        let (m1, h1, m2, pair) = (
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("p"),
        );
        let mut close = vec![call_rt(&m2, RuntimeFn::MatchCopy, vec![var(&m1)])];
        for symbol in &bound {
            close.push(effect(
                RuntimeFn::MatchDecreaseDepth,
                vec![var(&m2), symbol_operand(symbol)],
            ));
        }
        close.push(call_rt(&pair, RuntimeFn::MakePair, vec![var(&m2), var(&h1)]));
        close.push(effect(RuntimeFn::ListAppend, vec![var(&out), var(&pair)]));

        body.push(call_rt(&out, RuntimeFn::NewList, vec![]));
        body.push(Stmt::ForEach {
            targets: vec![m1, h1],
            iterable: finished,
            body: close,
        });
        body.push(Stmt::Return(var(&out)));
        Ok(body)
    }

    /// Breadth-first over every repetition count; returns the list of
    /// every state reached, zero repetitions included.
    fn explore_all(
        &mut self,
        body: &mut Vec<Stmt>,
        matcher: &Symbol,
        m0: &Symbol,
        terms: &Symbol,
        head: &Symbol,
        tail: &Symbol,
    ) -> Symbol {
        let (queue, start, index, going) = (
            self.ctx.fresh_temp("queue"),
            self.ctx.fresh_temp("p"),
            self.ctx.fresh_temp("i"),
            self.ctx.fresh_temp("going"),
        );
        let (len, more, item, m1, h1, found) = (
            self.ctx.fresh_temp("n"),
            self.ctx.fresh_temp("more"),
            self.ctx.fresh_temp("item"),
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("rs"),
        );
        body.extend([
            call_rt(&queue, RuntimeFn::NewList, vec![]),
            call_rt(&start, RuntimeFn::MakePair, vec![var(m0), var(head)]),
            effect(RuntimeFn::ListAppend, vec![var(&queue), var(&start)]),
            assign(&index, Expr::Operand(Operand::int(0))),
            assign(&going, Expr::Operand(Operand::bool(true))),
            Stmt::While {
                condition: going.clone(),
                body: vec![
                    call_rt(&len, RuntimeFn::ListLen, vec![var(&queue)]),
                    assign(&more, Expr::binary(BinaryOp::Lt, &index, &len)),
                    Stmt::If {
                        condition: var(&more),
                        then_body: vec![
                            call_rt(&item, RuntimeFn::ListGet, vec![var(&queue), var(&index)]),
                            assign(&m1, Expr::Field { base: item.clone(), index: 0 }),
                            assign(&h1, Expr::Field { base: item, index: 1 }),
                            assign(&index, Expr::binary(BinaryOp::Add, &index, Operand::int(1))),
                            assign(
                                &found,
                                Expr::call(matcher, vec![var(terms), var(&h1), var(tail), var(&m1)]),
                            ),
                            effect(RuntimeFn::ListExtend, vec![var(&queue), var(&found)]),
                        ],
                        else_body: vec![assign(&going, Expr::Operand(Operand::bool(false)))],
                    },
                ],
            },
        ]);
        queue
    }

    /// Repeat the inner matcher while it succeeds; returns the last
    /// non-empty frontier.
    fn explore_greedy(
        &mut self,
        body: &mut Vec<Stmt>,
        matcher: &Symbol,
        m0: &Symbol,
        terms: &Symbol,
        head: &Symbol,
        tail: &Symbol,
    ) -> Symbol {
        let (frontier, start, going) = (
            self.ctx.fresh_temp("frontier"),
            self.ctx.fresh_temp("p"),
            self.ctx.fresh_temp("going"),
        );
        let (next, m1, h1, found, len, advanced) = (
            self.ctx.fresh_temp("next"),
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("rs"),
            self.ctx.fresh_temp("n"),
            self.ctx.fresh_temp("more"),
        );
        body.extend([
            call_rt(&frontier, RuntimeFn::NewList, vec![]),
            call_rt(&start, RuntimeFn::MakePair, vec![var(m0), var(head)]),
            effect(RuntimeFn::ListAppend, vec![var(&frontier), var(&start)]),
            assign(&going, Expr::Operand(Operand::bool(true))),
            Stmt::While {
                condition: going.clone(),
                body: vec![
                    call_rt(&next, RuntimeFn::NewList, vec![]),
                    Stmt::ForEach {
                        targets: vec![m1.clone(), h1.clone()],
                        iterable: frontier.clone(),
                        body: vec![
                            assign(
                                &found,
                                Expr::call(matcher, vec![var(terms), var(&h1), var(tail), var(&m1)]),
                            ),
                            effect(RuntimeFn::ListExtend, vec![var(&next), var(&found)]),
                        ],
                    },
                    call_rt(&len, RuntimeFn::ListLen, vec![var(&next)]),
                    assign(&advanced, Expr::binary(BinaryOp::Gt, &len, Operand::int(0))),
                    Stmt::If {
                        condition: var(&advanced),
                        then_body: vec![assign(&frontier, Expr::Operand(var(&next)))],
                        else_body: vec![assign(&going, Expr::Operand(Operand::bool(false)))],
                    },
                ],
            },
        ]);
        frontier
    }

    // ── Context search ──────────────────────────────────────────────

    fn in_hole_body(
        &mut self,
        context: &Pattern,
        contents: &Pattern,
        checks: &[ConstraintCheck],
    ) -> Result<Vec<Stmt>, Diagnostic> {
        let (terms, head, tail, m) = (param(TERMS), param(HEAD), param(TAIL), param(ENV));
        let context_matcher = self.matcher(context)?;
        let contents_matcher = self.matcher(contents)?;
        let hole = self.ctx.literal(&Term::Hole);

        let results = self.ctx.fresh_temp("results");
        let in_range = self.ctx.fresh_temp("c");
        let t = self.ctx.fresh_temp("t");
        let candidates = self.ctx.fresh_temp("subterms");
        let (sub, path) = (self.ctx.fresh_temp("sub"), self.ctx.fresh_temp("path"));
        let (wrapped_sub, e0, inner, count, any) = (
            self.ctx.fresh_temp("w"),
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("rs"),
            self.ctx.fresh_temp("n"),
            self.ctx.fresh_temp("ok"),
        );
        let (holed, wrapped_ctx, e1, outer) = (
            self.ctx.fresh_temp("holed"),
            self.ctx.fresh_temp("w"),
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("rs"),
        );
        let (mc, hc, mp, hp, merged, h2, pair) = (
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("m"),
            self.ctx.fresh_temp("h"),
            self.ctx.fresh_temp("p"),
        );

        let mut accept = vec![
            call_rt(&pair, RuntimeFn::MakePair, vec![var(&merged), var(&h2)]),
            effect(RuntimeFn::ListAppend, vec![var(&results), var(&pair)]),
        ];
        for check in checks.iter().rev() {
            let equal = self.ctx.fresh_temp("eq");
            accept = vec![
                call_rt(
                    &equal,
                    RuntimeFn::MatchCompare,
                    vec![var(&merged), symbol_operand(&check.left), symbol_operand(&check.right)],
                ),
                if_then(&equal, accept),
            ];
        }

        let mut combine = vec![
            call_rt(&merged, RuntimeFn::MatchCopy, vec![var(&m)]),
            effect(RuntimeFn::MatchMerge, vec![var(&merged), var(&mc)]),
            effect(RuntimeFn::MatchMerge, vec![var(&merged), var(&mp)]),
        ];
        combine.extend(accept);

        let per_candidate = vec![
            call_rt(&wrapped_sub, RuntimeFn::WrapTerm, vec![var(&sub)]),
            call_rt(&e0, RuntimeFn::NewMatch, vec![]),
            assign(
                &inner,
                Expr::call(
                    &contents_matcher,
                    vec![var(&wrapped_sub), Operand::int(0), Operand::int(1), var(&e0)],
                ),
            ),
            call_rt(&count, RuntimeFn::ListLen, vec![var(&inner)]),
            assign(&any, Expr::binary(BinaryOp::Gt, &count, Operand::int(0))),
            if_then(
                &any,
                vec![
                    call_rt(&holed, RuntimeFn::ReplaceAtPath, vec![var(&t), var(&path), var(&hole)]),
                    call_rt(&wrapped_ctx, RuntimeFn::WrapTerm, vec![var(&holed)]),
                    call_rt(&e1, RuntimeFn::NewMatch, vec![]),
                    assign(
                        &outer,
                        Expr::call(
                            &context_matcher,
                            vec![var(&wrapped_ctx), Operand::int(0), Operand::int(1), var(&e1)],
                        ),
                    ),
                    Stmt::ForEach {
                        targets: vec![mc, hc],
                        iterable: outer,
                        body: vec![Stmt::ForEach {
                            targets: vec![mp, hp],
                            iterable: inner,
                            body: combine,
                        }],
                    },
                ],
            ),
        ];

        Ok(vec![
            call_rt(&results, RuntimeFn::NewList, vec![]),
            assign(&in_range, Expr::binary(BinaryOp::Lt, &head, &tail)),
            if_then(
                &in_range,
                vec![
                    call_rt(&t, RuntimeFn::SeqGet, vec![var(&terms), var(&head)]),
                    assign(&h2, Expr::binary(BinaryOp::Add, &head, Operand::int(1))),
                    call_rt(&candidates, RuntimeFn::SubtermPaths, vec![var(&t)]),
                    Stmt::ForEach {
                        targets: vec![sub, path],
                        iterable: candidates,
                        body: per_candidate,
                    },
                ],
            ),
            Stmt::Return(var(&results)),
        ])
    }
}

fn kind_test(kind: BuiltInKind) -> RuntimeFn {
    match kind {
        BuiltInKind::Number => RuntimeFn::IsNumber,
        BuiltInKind::Integer => RuntimeFn::IsInteger,
        BuiltInKind::Natural => RuntimeFn::IsNatural,
        BuiltInKind::Float => RuntimeFn::IsFloat,
        BuiltInKind::String => RuntimeFn::IsString,
        BuiltInKind::Boolean => RuntimeFn::IsBoolean,
        BuiltInKind::Hole => RuntimeFn::IsHole,
        BuiltInKind::VariableNotOtherwiseMentioned | BuiltInKind::VariableExcept => {
            RuntimeFn::IsVariable
        }
    }
}

#[cfg(test)]
mod tests;
