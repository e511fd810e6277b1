//! Shared helpers for the end-to-end tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use redex_eval::{silent_handler, Interpreter, InterpreterConfig, Value};
use redexc::{compile_source, CompileOptions, Compiled};

/// Arithmetic with an evaluation-context non-terminal.
pub const ARITH: &str = "
(define-language Arith
  (e ::= (+ e e) n)
  (n ::= number)
  (E ::= hole (+ E e) (+ e E)))
";

/// One binding environment, as sorted `(symbol, term)` text pairs.
pub type Bindings = Vec<(String, String)>;

pub fn quiet() -> InterpreterConfig {
    InterpreterConfig {
        print: silent_handler(),
        ..InterpreterConfig::default()
    }
}

/// Compile `ARITH` followed by `rest`.
pub fn compile(rest: &str) -> Compiled {
    let source = format!("{ARITH}{rest}");
    match compile_source(&source, &CompileOptions::default()) {
        Ok(compiled) => compiled,
        Err(diagnostic) => panic!("compile failed: {diagnostic:?}\n{source}"),
    }
}

/// A compiled program loaded into an interpreter.
pub struct Session {
    pub compiled: Compiled,
    pub interpreter: Interpreter,
}

impl Session {
    pub fn new(rest: &str) -> Session {
        Session::with_config(rest, quiet())
    }

    pub fn with_config(rest: &str, config: InterpreterConfig) -> Session {
        let compiled = compile(rest);
        let interpreter = compiled.interpreter(config).unwrap();
        Session {
            compiled,
            interpreter,
        }
    }

    /// Call the `index`th entry point.
    pub fn entry(&mut self, index: usize) -> redex_eval::EvalResult<Value> {
        let function = self.compiled.entries()[index].function.clone();
        self.interpreter.call(function.as_str(), Vec::new())
    }

    /// Run a `redex-match` entry and return its matches, sorted.
    pub fn matches(&mut self, index: usize) -> Vec<Bindings> {
        let value = self.entry(index).unwrap();
        bindings_of(&value)
    }
}

/// Sorted bindings of every match environment in a result list.
pub fn bindings_of(value: &Value) -> Vec<Bindings> {
    let mut out: Vec<Bindings> = value
        .to_envs()
        .unwrap()
        .iter()
        .map(|env| {
            env.to_bindings()
                .into_iter()
                .map(|(symbol, term)| (symbol.to_string(), term.to_string()))
                .collect()
        })
        .collect();
    out.sort();
    out
}

/// Build a `Bindings` from string pairs.
pub fn binds(pairs: &[(&str, &str)]) -> Bindings {
    let mut out: Bindings = pairs
        .iter()
        .map(|(symbol, term)| ((*symbol).to_owned(), (*term).to_owned()))
        .collect();
    out.sort();
    out
}
