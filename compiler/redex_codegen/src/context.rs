//! Compilation state shared by every generator.
//!
//! One `CompilationContext` lives for one compilation run. It owns the
//! output module under construction, the memo tables that make each
//! distinct pattern compile to exactly one function, and the counters for
//! fresh names.

use redex_ir::code::{Expr, Lit, Operand, RuntimeFn, Stmt};
use redex_ir::{Pattern, Symbol, Term};
use rustc_hash::FxHashMap;

/// Knobs for one compilation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Emit `print` statements for `redex-match` forms.
    pub emit_prints: bool,
}

/// Mutable tables threaded through code generation.
pub struct CompilationContext {
    pub options: CompileOptions,
    /// Module-level constants, emitted before any function.
    hoisted: Vec<Stmt>,
    functions: Vec<Stmt>,
    literals: FxHashMap<Term, Symbol>,
    /// `(language, pattern) -> matcher`.
    pub(crate) matchers: FxHashMap<(Symbol, Pattern), Symbol>,
    /// `(language, non-terminal) -> is-a predicate`.
    pub(crate) predicates: FxHashMap<(Symbol, Symbol), Symbol>,
    /// `language -> constant holding its mentioned variables`.
    pub(crate) mentioned: FxHashMap<Symbol, Symbol>,
    name_counter: usize,
    temp_counter: usize,
}

impl CompilationContext {
    pub fn new(options: CompileOptions) -> Self {
        CompilationContext {
            options,
            hoisted: Vec::new(),
            functions: Vec::new(),
            literals: FxHashMap::default(),
            matchers: FxHashMap::default(),
            predicates: FxHashMap::default(),
            mentioned: FxHashMap::default(),
            name_counter: 0,
            temp_counter: 0,
        }
    }

    /// A fresh top-level function name: `{kind}_{mangled}_{n}`.
    pub fn fresh_function(&mut self, kind: &str, hint: &str) -> Symbol {
        let n = self.name_counter;
        self.name_counter += 1;
        let hint = mangle(hint);
        if hint.is_empty() {
            Symbol::from(format!("{kind}_{n}"))
        } else {
            Symbol::from(format!("{kind}_{hint}_{n}"))
        }
    }

    /// A fresh local variable name.
    pub fn fresh_temp(&mut self, hint: &str) -> Symbol {
        let n = self.temp_counter;
        self.temp_counter += 1;
        Symbol::from(format!("{hint}{n}"))
    }

    /// Constant holding `term`, parsed once at module load.
    pub fn literal(&mut self, term: &Term) -> Symbol {
        if let Some(name) = self.literals.get(term) {
            return name.clone();
        }
        let name = Symbol::from(format!("lit{}", self.literals.len()));
        self.hoisted.push(Stmt::Assign {
            target: name.clone(),
            value: Expr::runtime(RuntimeFn::ReadTerm, vec![Operand::str(&term.to_string())]),
        });
        self.literals.insert(term.clone(), name.clone());
        name
    }

    pub fn push_function(&mut self, name: Symbol, params: Vec<Symbol>, body: Vec<Stmt>) {
        tracing::trace!(function = %name, statements = body.len(), "function emitted");
        self.functions.push(Stmt::FunctionDef { name, params, body });
    }

    /// Hoisted constants followed by functions.
    pub fn into_statements(self) -> Vec<Stmt> {
        let mut body = self.hoisted;
        body.extend(self.functions);
        body
    }
}

/// Map a Redex name onto identifier characters.
pub fn mangle(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

// ── Statement helpers ───────────────────────────────────────────────

pub(crate) fn assign(target: &Symbol, value: Expr) -> Stmt {
    Stmt::Assign {
        target: target.clone(),
        value,
    }
}

pub(crate) fn call_rt(target: &Symbol, function: RuntimeFn, args: Vec<Operand>) -> Stmt {
    assign(target, Expr::runtime(function, args))
}

pub(crate) fn effect(function: RuntimeFn, args: Vec<Operand>) -> Stmt {
    Stmt::Expr(Expr::runtime(function, args))
}

pub(crate) fn if_then(condition: &Symbol, then_body: Vec<Stmt>) -> Stmt {
    Stmt::If {
        condition: Operand::var(condition),
        then_body,
        else_body: Vec::new(),
    }
}

pub(crate) fn symbol_operand(symbol: &Symbol) -> Operand {
    Operand::Lit(Lit::Str(symbol.as_str().into()))
}

pub(crate) fn var(name: &Symbol) -> Operand {
    Operand::var(name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mangling_keeps_identifier_characters() {
        assert_eq!(mangle("e_1"), "e_1");
        assert_eq!(mangle("->"), "__");
        assert_eq!(mangle("λ-calc"), "__calc");
    }

    #[test]
    fn literals_are_hoisted_once() {
        let mut ctx = CompilationContext::new(CompileOptions::default());
        let a = ctx.literal(&Term::Integer(1));
        let b = ctx.literal(&Term::Integer(1));
        let c = ctx.literal(&Term::Hole);
        assert_eq!(a, b);
        assert_ne!(a, c);
        let statements = ctx.into_statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].to_string(), "lit1 = read_term(\"hole\")\n");
    }

    #[test]
    fn function_names_are_unique() {
        let mut ctx = CompilationContext::new(CompileOptions::default());
        assert_eq!(ctx.fresh_function("match_literal", "+").as_str(), "match_literal___0");
        assert_eq!(ctx.fresh_function("isa", "Arith_e").as_str(), "isa_Arith_e_1");
        assert_eq!(ctx.fresh_function("matches", "").as_str(), "matches_2");
    }
}
