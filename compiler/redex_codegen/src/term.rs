//! Term-construction code generation.
//!
//! An annotated template compiles to `def term_k(m) -> term`. Every pattern
//! variable the template reads is fetched from `m` once at entry; inside a
//! template ellipsis the drivers are rebound to the current element, so
//! each iteration only sees its own slice.

use redex_diagnostic::Diagnostic;
use redex_ir::code::{Expr, Operand, RuntimeFn, Stmt};
use redex_ir::{InsertMode, Symbol};
use redex_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use crate::annotate::Annotated;
use crate::context::{call_rt, effect, symbol_operand, var, CompilationContext};

/// Pattern variable to the local currently holding its value.
type Scope = FxHashMap<Symbol, Symbol>;

/// Compile `template` into a construction function; returns its name.
///
/// `metafunctions` maps each metafunction to its generated function.
pub fn compile_template(
    ctx: &mut CompilationContext,
    metafunctions: &FxHashMap<Symbol, Symbol>,
    template: &Annotated,
) -> Result<Symbol, Diagnostic> {
    let name = ctx.fresh_function("term", "");
    let m = Symbol::new("m");
    let mut gen = TermGen { ctx, metafunctions };

    let mut body = Vec::new();
    let mut scope = Scope::default();
    let mut used = Vec::new();
    collect_vars(template, &mut used);
    for symbol in used {
        let local = gen.ctx.fresh_temp("v");
        body.push(call_rt(&local, RuntimeFn::MatchGet, vec![var(&m), symbol_operand(&symbol)]));
        scope.insert(symbol, local);
    }
    let result = gen.build(template, &scope, &mut body)?;
    body.push(Stmt::Return(var(&result)));
    gen.ctx.push_function(name.clone(), vec![m], body);
    Ok(name)
}

struct TermGen<'a> {
    ctx: &'a mut CompilationContext,
    metafunctions: &'a FxHashMap<Symbol, Symbol>,
}

impl TermGen<'_> {
    /// Emit statements into `out` building `template`; returns the local
    /// holding the term.
    fn build(&mut self, template: &Annotated, scope: &Scope, out: &mut Vec<Stmt>) -> Result<Symbol, Diagnostic> {
        ensure_sufficient_stack(|| match template {
            Annotated::Literal(term) => Ok(self.ctx.literal(term)),
            Annotated::Var { symbol, .. } => scope.get(symbol).cloned().ok_or_else(|| {
                Diagnostic::internal(format!("template variable `{symbol}` has no value in scope"))
            }),
            Annotated::Sequence(items) => self.sequence(items, scope, out),
            Annotated::Repeat { .. } => {
                let items = self.items(std::slice::from_ref(template), scope, out)?;
                let result = self.ctx.fresh_temp("t");
                out.push(call_rt(&result, RuntimeFn::MakeSequence, vec![var(&items)]));
                Ok(result)
            }
            Annotated::InHole { context, contents } => {
                let context = self.build(context, scope, out)?;
                let contents = self.build(contents, scope, out)?;
                let result = self.ctx.fresh_temp("t");
                out.push(call_rt(&result, RuntimeFn::Plug, vec![var(&context), var(&contents)]));
                Ok(result)
            }
            Annotated::Metafunction { function, args } => {
                let Some(target) = self.metafunctions.get(function).cloned() else {
                    return Err(Diagnostic::internal(format!("unknown metafunction `{function}`")));
                };
                let argument = self.sequence(args, scope, out)?;
                let result = self.ctx.fresh_temp("t");
                out.push(Stmt::Assign {
                    target: result.clone(),
                    value: Expr::call(&target, vec![var(&argument)]),
                });
                Ok(result)
            }
            Annotated::Foreign { function, args, .. } => {
                let mut operands = Vec::with_capacity(args.len());
                for arg in args {
                    operands.push(var(&self.build(arg, scope, out)?));
                }
                let result = self.ctx.fresh_temp("t");
                out.push(Stmt::Assign {
                    target: result.clone(),
                    value: Expr::call(function, operands),
                });
                Ok(result)
            }
        })
    }

    fn sequence(&mut self, items: &[Annotated], scope: &Scope, out: &mut Vec<Stmt>) -> Result<Symbol, Diagnostic> {
        let list = self.items(items, scope, out)?;
        let result = self.ctx.fresh_temp("t");
        out.push(call_rt(&result, RuntimeFn::MakeSequence, vec![var(&list)]));
        Ok(result)
    }

    /// A list of the terms `items` contribute to an enclosing sequence.
    fn items(&mut self, items: &[Annotated], scope: &Scope, out: &mut Vec<Stmt>) -> Result<Symbol, Diagnostic> {
        let list = self.ctx.fresh_temp("items");
        out.push(call_rt(&list, RuntimeFn::NewList, vec![]));
        for item in items {
            match item {
                Annotated::Repeat { inner, drivers } => {
                    let repeated = self.repeat(inner, drivers, scope, out)?;
                    out.push(effect(RuntimeFn::ListExtend, vec![var(&list), var(&repeated)]));
                }
                Annotated::Foreign {
                    mode: InsertMode::Extend,
                    ..
                } => {
                    let spliced = self.build(item, scope, out)?;
                    let children = self.ctx.fresh_temp("children");
                    out.push(call_rt(&children, RuntimeFn::SeqChildren, vec![var(&spliced)]));
                    out.push(effect(RuntimeFn::ListExtend, vec![var(&list), var(&children)]));
                }
                _ => {
                    let term = self.build(item, scope, out)?;
                    out.push(effect(RuntimeFn::ListAppend, vec![var(&list), var(&term)]));
                }
            }
        }
        Ok(list)
    }

    /// Loop over the drivers in lockstep; returns the list of constructed terms.
    fn repeat(
        &mut self,
        inner: &Annotated,
        drivers: &[Symbol],
        scope: &Scope,
        out: &mut Vec<Stmt>,
    ) -> Result<Symbol, Diagnostic> {
        let mut sources = Vec::with_capacity(drivers.len());
        for driver in drivers {
            let Some(local) = scope.get(driver) else {
                return Err(Diagnostic::internal(format!("ellipsis driver `{driver}` is not in scope")));
            };
            sources.push((driver.clone(), local.clone()));
        }
        let Some((_, first)) = sources.first() else {
            return Err(Diagnostic::internal("template ellipsis without drivers"));
        };

        let results = self.ctx.fresh_temp("items");
        let count = self.ctx.fresh_temp("n");
        out.push(call_rt(&results, RuntimeFn::NewList, vec![]));
        out.push(call_rt(&count, RuntimeFn::SeqLen, vec![var(first)]));
        for (_, local) in sources.iter().skip(1) {
            out.push(Stmt::Expr(Expr::runtime(
                RuntimeFn::CheckEllipsisCounts,
                vec![var(local), var(&count)],
            )));
        }

        let index = self.ctx.fresh_temp("i");
        let mut body = Vec::new();
        let mut inner_scope = scope.clone();
        for (driver, local) in &sources {
            let element = self.ctx.fresh_temp("e");
            body.push(call_rt(&element, RuntimeFn::SeqGet, vec![var(local), var(&index)]));
            inner_scope.insert(driver.clone(), element);
        }
        let contributed = self.items(std::slice::from_ref(inner), &inner_scope, &mut body)?;
        body.push(effect(RuntimeFn::ListExtend, vec![var(&results), var(&contributed)]));

        out.push(Stmt::ForRange {
            target: index,
            start: Operand::int(0),
            end: var(&count),
            body,
        });
        Ok(results)
    }
}

/// Every pattern variable read by `template`, in first-use order.
fn collect_vars(template: &Annotated, out: &mut Vec<Symbol>) {
    match template {
        Annotated::Literal(_) => {}
        Annotated::Var { symbol, .. } => {
            if !out.contains(symbol) {
                out.push(symbol.clone());
            }
        }
        Annotated::Repeat { inner, .. } => collect_vars(inner, out),
        Annotated::InHole { context, contents } => {
            collect_vars(context, out);
            collect_vars(contents, out);
        }
        Annotated::Sequence(items)
        | Annotated::Metafunction { args: items, .. }
        | Annotated::Foreign { args: items, .. } => {
            for item in items {
                collect_vars(item, out);
            }
        }
    }
}

#[cfg(test)]
mod tests;
