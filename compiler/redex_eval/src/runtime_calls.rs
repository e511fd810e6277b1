//! Dispatch of [`RuntimeFn`] calls onto `redex_runtime`.

use redex_ir::code::RuntimeFn;
use redex_ir::{Symbol, Term};
use redex_runtime::{terms, MatchEnv};

use crate::errors::{wrong_arg_count, EvalError, EvalResult};
use crate::Value;

/// Run one runtime helper. Arity is checked against [`RuntimeFn::arity`].
pub(crate) fn call_runtime(function: RuntimeFn, args: &[Value]) -> EvalResult<Value> {
    if args.len() != function.arity() {
        return Err(wrong_arg_count(function.name(), function.arity(), args.len()));
    }
    let term = |index: usize| args[index].as_term();
    let symbol = |index: usize| args[index].as_str().map(Symbol::new);

    Ok(match function {
        // ── Terms ──
        RuntimeFn::IsSequence => Value::Bool(matches!(term(0)?, Term::Sequence(_))),
        RuntimeFn::SeqLen => Value::Int(len_to_int(terms::children(term(0)?)?.len())),
        RuntimeFn::SeqGet => terms::child(term(0)?, args[1].as_index()?)?.into(),
        RuntimeFn::WrapTerm => Term::sequence([term(0)?.clone()]).into(),
        RuntimeFn::MakeSequence => {
            let items = args[0]
                .as_list()?
                .borrow()
                .iter()
                .map(|item| item.as_term().cloned())
                .collect::<EvalResult<Vec<_>>>()?;
            Term::sequence(items).into()
        }
        RuntimeFn::SeqChildren => Value::list(
            terms::children(term(0)?)?
                .iter()
                .cloned()
                .map(Value::Term)
                .collect(),
        ),
        RuntimeFn::TermEq => Value::Bool(term(0)? == term(1)?),
        RuntimeFn::IsInteger => Value::Bool(matches!(term(0)?, Term::Integer(_))),
        RuntimeFn::IsNatural => Value::Bool(term(0)?.is_natural()),
        RuntimeFn::IsFloat => Value::Bool(matches!(term(0)?, Term::Float(_))),
        RuntimeFn::IsNumber => Value::Bool(term(0)?.is_number()),
        RuntimeFn::IsString => Value::Bool(matches!(term(0)?, Term::String(_))),
        RuntimeFn::IsBoolean => Value::Bool(matches!(term(0)?, Term::Boolean(_))),
        RuntimeFn::IsHole => Value::Bool(matches!(term(0)?, Term::Hole)),
        RuntimeFn::IsVariable => Value::Bool(matches!(term(0)?, Term::Variable(_))),
        RuntimeFn::SeqContains => Value::Bool(terms::contains(term(0)?, term(1)?)?),
        RuntimeFn::SubtermPaths => Value::list(
            terms::subterm_paths(term(0)?)
                .into_iter()
                .map(|(subterm, path)| Value::pair(subterm.into(), path.into()))
                .collect(),
        ),
        RuntimeFn::ReplaceAtPath => terms::replace_at_path(term(0)?, term(1)?, term(2)?.clone())?.into(),
        RuntimeFn::Plug => terms::plug(term(0)?, term(1)?.clone())?.into(),
        RuntimeFn::ReadTerm => redex_parse::parse_term(args[0].as_str()?)
            .map_err(|diagnostic| EvalError::ReadTerm(diagnostic.message))?
            .into(),
        RuntimeFn::TermToString => Value::str(&term(0)?.to_string()),

        // ── Binding environments ──
        RuntimeFn::NewMatch => Value::env(MatchEnv::new()),
        RuntimeFn::MatchCopy => Value::env(args[0].as_env()?.borrow().clone()),
        RuntimeFn::MatchAdd => {
            args[0].as_env()?.borrow_mut().add(&symbol(1)?, term(2)?.clone());
            Value::None
        }
        RuntimeFn::MatchIncreaseDepth => {
            args[0].as_env()?.borrow_mut().increase_depth(&symbol(1)?);
            Value::None
        }
        RuntimeFn::MatchDecreaseDepth => {
            args[0].as_env()?.borrow_mut().decrease_depth(&symbol(1)?);
            Value::None
        }
        RuntimeFn::MatchGet => args[0].as_env()?.borrow().get(&symbol(1)?).into(),
        RuntimeFn::MatchRemove => {
            args[0].as_env()?.borrow_mut().remove(&symbol(1)?);
            Value::None
        }
        RuntimeFn::MatchCompare => {
            Value::Bool(args[0].as_env()?.borrow().compare(&symbol(1)?, &symbol(2)?))
        }
        RuntimeFn::MatchMerge => {
            let other = args[1].as_env()?.borrow().clone();
            args[0].as_env()?.borrow_mut().merge(&other);
            Value::None
        }
        RuntimeFn::MatchSetsEqual => {
            Value::Bool(terms::match_sets_equal(&args[0].to_envs()?, &args[1].to_envs()?))
        }
        RuntimeFn::MatchesToString => Value::str(&terms::matches_to_string(&args[0].to_envs()?)),

        // ── Lists ──
        RuntimeFn::NewList => Value::list(Vec::new()),
        RuntimeFn::ListAppend => {
            args[0].as_list()?.borrow_mut().push(args[1].clone());
            Value::None
        }
        RuntimeFn::ListExtend => {
            let extra = args[1].as_list()?.borrow().clone();
            args[0].as_list()?.borrow_mut().extend(extra);
            Value::None
        }
        RuntimeFn::ListLen => Value::Int(len_to_int(args[0].as_list()?.borrow().len())),
        RuntimeFn::ListGet => {
            let index = args[1].as_index()?;
            let items = args[0].as_list()?.borrow();
            items.get(index).cloned().ok_or(EvalError::Runtime(
                redex_runtime::RuntimeError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                },
            ))?
        }
        RuntimeFn::MakePair => Value::pair(args[0].clone(), args[1].clone()),
        RuntimeFn::TermSetsEqual => {
            Value::Bool(terms::term_sets_equal(&args[0].to_terms()?, &args[1].to_terms()?))
        }
        RuntimeFn::TermsToString => Value::str(&terms::terms_to_string(&args[0].to_terms()?)),
        RuntimeFn::CheckEllipsisCounts => {
            terms::check_ellipsis_counts(term(0)?, args[1].as_index()?)?;
            Value::None
        }
    })
}

fn len_to_int(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}
