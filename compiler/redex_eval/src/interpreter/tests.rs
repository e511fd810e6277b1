#![allow(clippy::unwrap_used, reason = "tests unwrap for brevity")]

use pretty_assertions::assert_eq;
use redex_ir::code::RuntimeFn;

use super::*;
use crate::print_handler::buffer_handler;

fn sym(name: &str) -> Symbol {
    Symbol::new(name)
}

fn var(name: &str) -> Operand {
    Operand::var(&sym(name))
}

fn assign(target: &str, value: Expr) -> Stmt {
    Stmt::Assign {
        target: sym(target),
        value,
    }
}

fn function(name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
    Stmt::FunctionDef {
        name: sym(name),
        params: params.iter().map(|p| sym(p)).collect(),
        body,
    }
}

fn module(body: Vec<Stmt>) -> Module {
    Module {
        foreign_sources: Vec::new(),
        body,
    }
}

#[test]
fn hoisted_constants_are_visible_in_functions() {
    let module = module(vec![
        assign("lit0", Expr::runtime(RuntimeFn::ReadTerm, vec![Operand::str("(+ 1 hole)")])),
        function("get", &[], vec![Stmt::Return(var("lit0"))]),
    ]);
    let mut interpreter = Interpreter::new(&module).unwrap();
    let value = interpreter.call("get", Vec::new()).unwrap();
    assert_eq!(
        value.as_term().unwrap(),
        &Term::sequence([Term::variable("+"), Term::Integer(1), Term::Hole])
    );
}

#[test]
fn raise_carries_the_concatenated_message() {
    let module = module(vec![function(
        "fail",
        &["t"],
        vec![
            assign("s", Expr::runtime(RuntimeFn::TermToString, vec![var("t")])),
            assign("msg", Expr::binary(BinaryOp::Add, Operand::str("bad: "), &sym("s"))),
            Stmt::Raise(var("msg")),
        ],
    )]);
    let mut interpreter = Interpreter::new(&module).unwrap();
    let error = interpreter.call_on_term("fail", Term::Integer(7)).unwrap_err();
    assert_eq!(error, EvalError::Raised("bad: 7".to_owned()));
}

#[test]
fn loops_and_lists() {
    // Sum 0..5 by appending to a list and reading its length.
    let module = module(vec![function(
        "count",
        &[],
        vec![
            assign("out", Expr::runtime(RuntimeFn::NewList, vec![])),
            Stmt::ForRange {
                target: sym("i"),
                start: Operand::int(0),
                end: Operand::int(5),
                body: vec![Stmt::Expr(Expr::runtime(RuntimeFn::ListAppend, vec![var("out"), var("i")]))],
            },
            assign("going", Expr::Operand(Operand::bool(true))),
            Stmt::While {
                condition: sym("going"),
                body: vec![
                    Stmt::Expr(Expr::runtime(RuntimeFn::ListAppend, vec![var("out"), Operand::int(9)])),
                    Stmt::Break,
                ],
            },
            assign("n", Expr::runtime(RuntimeFn::ListLen, vec![var("out")])),
            Stmt::Return(var("n")),
        ],
    )]);
    let mut interpreter = Interpreter::new(&module).unwrap();
    assert_eq!(interpreter.call("count", Vec::new()).unwrap().as_int().unwrap(), 6);
}

#[test]
fn pairs_destructure_in_loops() {
    let module = module(vec![function(
        "firsts",
        &["t"],
        vec![
            assign("paths", Expr::runtime(RuntimeFn::SubtermPaths, vec![var("t")])),
            assign("out", Expr::runtime(RuntimeFn::NewList, vec![])),
            Stmt::ForEach {
                targets: vec![sym("sub"), sym("path")],
                iterable: sym("paths"),
                body: vec![Stmt::Expr(Expr::runtime(RuntimeFn::ListAppend, vec![var("out"), var("path")]))],
            },
            Stmt::Return(var("out")),
        ],
    )]);
    let mut interpreter = Interpreter::new(&module).unwrap();
    let paths = interpreter
        .call_on_term("firsts", Term::sequence([Term::Integer(1)]))
        .unwrap()
        .to_terms()
        .unwrap();
    assert_eq!(paths, vec![Term::empty_sequence(), Term::sequence([Term::Integer(0)])]);
}

#[test]
fn foreign_functions_are_called_with_terms() {
    let module = module(vec![function(
        "wrap",
        &["t"],
        vec![
            assign("r", Expr::call(&sym("box"), vec![var("t")])),
            Stmt::Return(var("r")),
        ],
    )]);
    let mut foreign = ForeignRegistry::new();
    foreign.register("box", |args| Ok(Term::sequence(args.iter().cloned())));
    let config = InterpreterConfig {
        foreign,
        ..InterpreterConfig::default()
    };
    let mut interpreter = Interpreter::with_config(&module, config).unwrap();
    let value = interpreter.call_on_term("wrap", Term::Integer(2)).unwrap();
    assert_eq!(value.as_term().unwrap(), &Term::sequence([Term::Integer(2)]));
    assert_eq!(interpreter.stats().count("box"), 1);
}

#[test]
fn unknown_functions_are_errors() {
    let mut interpreter = Interpreter::new(&module(Vec::new())).unwrap();
    let error = interpreter.call("nope", Vec::new()).unwrap_err();
    assert_eq!(error, EvalError::UnknownFunction("nope".to_owned()));
}

#[test]
fn runaway_recursion_hits_the_limit() {
    let module = module(vec![function(
        "forever",
        &[],
        vec![
            assign("r", Expr::call(&sym("forever"), vec![])),
            Stmt::Return(var("r")),
        ],
    )]);
    let config = InterpreterConfig {
        max_depth: Some(50),
        print: buffer_handler(),
        ..InterpreterConfig::default()
    };
    let mut interpreter = Interpreter::with_config(&module, config).unwrap();
    assert!(matches!(
        interpreter.call("forever", Vec::new()),
        Err(EvalError::StackOverflow(50))
    ));
    assert_eq!(interpreter.stats().count("forever"), 51);
}

#[test]
fn prints_go_to_the_handler() {
    let module = module(vec![function("hello", &[], vec![Stmt::Print(Operand::str("hi"))])]);
    let config = InterpreterConfig {
        print: buffer_handler(),
        ..InterpreterConfig::default()
    };
    let mut interpreter = Interpreter::with_config(&module, config).unwrap();
    interpreter.call("hello", Vec::new()).unwrap();
    assert_eq!(interpreter.output(), "hi\n");
}

#[test]
fn arity_is_checked() {
    let module = module(vec![function("id", &["x"], vec![Stmt::Return(var("x"))])]);
    let mut interpreter = Interpreter::new(&module).unwrap();
    let error = interpreter.call("id", Vec::new()).unwrap_err();
    assert_eq!(error.to_string(), "`id` takes 1 argument(s), got 0");
}

#[test]
fn runtime_errors_propagate() {
    let module = module(vec![function(
        "plug",
        &["t"],
        vec![
            assign("r", Expr::runtime(RuntimeFn::Plug, vec![var("t"), var("t")])),
            Stmt::Return(var("r")),
        ],
    )]);
    let mut interpreter = Interpreter::new(&module).unwrap();
    let error = interpreter.call_on_term("plug", Term::Integer(1)).unwrap_err();
    assert!(matches!(error, EvalError::Runtime(redex_runtime::RuntimeError::NoHole { .. })));
}
